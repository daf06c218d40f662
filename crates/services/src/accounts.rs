//! Sign-up, credential checks, bearer tokens and account removal.
//!
//! The core treats identity as opaque beyond id and username; this service
//! is the bridge between the auth ports and [`Requester`].

use std::sync::{Arc, OnceLock};

use domains::{
    validation, DomainError, Identity, NewUser, PasswordHasher, Requester, Result, TokenPair,
    TokenService, User, UserRepository,
};
use tracing::{debug, info, instrument, warn};

use crate::policy::require_authenticated;
use crate::Repositories;

const BAD_CREDENTIALS: &str = "no active account found with the given credentials";

/// Hashed once and verified against when the username is unknown.
const DUMMY_PASSWORD: &str = "yatube-unknown-user";

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    dummy_hash: OnceLock<String>,
}

impl AccountService {
    pub fn new(repos: &Repositories, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users: repos.users.clone(), hasher, tokens, dummy_hash: OnceLock::new() }
    }

    fn dummy_hash(&self) -> Option<&str> {
        if let Some(hash) = self.dummy_hash.get() {
            return Some(hash);
        }
        match self.hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(self.dummy_hash.get_or_init(|| hash)),
            Err(err) => {
                warn!(error = %err, "could not prepare the dummy password hash");
                None
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User> {
        validation::username(username)?;
        validation::password(password)?;
        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .create(NewUser { username: username.to_string(), password_hash, is_staff: false })
            .await?;
        info!(user_id = user.id, "account created");
        Ok(user)
    }

    /// Checks a username/password pair. Every failure looks the same, and an
    /// unknown username still pays for one password verification.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let accepted = match self.users.find_by_username(username).await? {
            Some(user) => self.hasher.verify(password, &user.password_hash).then_some(user),
            None => {
                if let Some(hash) = self.dummy_hash() {
                    // The outcome is irrelevant; only the work counts.
                    let _ = self.hasher.verify(password, hash);
                }
                None
            }
        };
        accepted.ok_or_else(|| {
            warn!("failed login attempt");
            DomainError::Unauthorized(BAD_CREDENTIALS.into())
        })
    }

    /// Authenticates and issues an access/refresh pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self.authenticate(username, password).await?;
        self.tokens.issue(&user)
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        self.tokens.refresh(refresh_token)
    }

    /// Maps an access token to a requester. Invalid tokens and tokens of
    /// deleted users resolve to the anonymous requester.
    pub async fn resolve(&self, access_token: Option<&str>) -> Result<Requester> {
        let Some(token) = access_token else {
            return Ok(Requester::Anonymous);
        };
        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "ignoring invalid access token");
                return Ok(Requester::Anonymous);
            }
        };
        Ok(match self.users.find_by_id(claims.user_id).await? {
            Some(user) => Requester::User(Identity::from(&user)),
            None => Requester::Anonymous,
        })
    }

    /// Deletes the requester's account together with everything they authored.
    #[instrument(skip(self, requester))]
    pub async fn delete_account(&self, requester: &Requester) -> Result<()> {
        let me = require_authenticated(requester, "delete the account")?;
        self.users.delete(me.id).await?;
        info!(user_id = me.id, "account deleted");
        Ok(())
    }
}
