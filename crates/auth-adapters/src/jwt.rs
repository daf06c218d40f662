//! HS256 JSON Web Tokens.
//!
//! Access tokens are short-lived and authorize requests; refresh tokens
//! only mint new access tokens. The `typ` claim keeps them apart.

use chrono::{Duration, Utc};
use domains::{DomainError, Result, TokenClaims, TokenPair, TokenService, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: i64,
    username: String,
    typ: String,
    jti: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    fn sign(&self, user_id: i64, username: &str, typ: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            typ: typ.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| DomainError::Internal(format!("token signing failed: {err}")))
    }

    fn decode_typed(&self, token: &str, typ: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|err| {
            debug!(error = %err, "token rejected");
            DomainError::Unauthorized("token is invalid or expired".into())
        })?;
        if data.claims.typ != typ {
            return Err(DomainError::Unauthorized(format!("expected an {typ} token")));
        }
        Ok(data.claims)
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.sign(user.id, &user.username, ACCESS, self.access_ttl)?,
            refresh: self.sign(user.id, &user.username, REFRESH, self.refresh_ttl)?,
        })
    }

    fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.decode_typed(refresh_token, REFRESH)?;
        self.sign(claims.sub, &claims.username, ACCESS, self.access_ttl)
    }

    fn verify(&self, access_token: &str) -> Result<TokenClaims> {
        let claims = self.decode_typed(access_token, ACCESS)?;
        Ok(TokenClaims { user_id: claims.sub, username: claims.username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(access_ttl: Duration) -> JwtTokenService {
        JwtTokenService::new(&JwtConfig {
            secret: SecretString::from("test-secret-test-secret-test-secret".to_string()),
            access_ttl,
            refresh_ttl: Duration::days(1),
        })
    }

    fn leo() -> User {
        User {
            id: 42,
            username: "leo".into(),
            password_hash: String::new(),
            is_staff: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trips_the_identity() {
        let svc = service(Duration::minutes(5));
        let pair = svc.issue(&leo()).unwrap();
        let claims = svc.verify(&pair.access).unwrap();
        assert_eq!(claims, TokenClaims { user_id: 42, username: "leo".into() });
    }

    #[test]
    fn refresh_token_cannot_authorize_requests() {
        let svc = service(Duration::minutes(5));
        let pair = svc.issue(&leo()).unwrap();
        assert!(matches!(svc.verify(&pair.refresh), Err(DomainError::Unauthorized(_))));
        assert!(svc.refresh(&pair.access).is_err());
        let fresh = svc.refresh(&pair.refresh).unwrap();
        assert_eq!(svc.verify(&fresh).unwrap().user_id, 42);
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = service(Duration::minutes(-10)).issue(&leo()).unwrap();
        assert!(service(Duration::minutes(5)).verify(&expired.access).is_err());

        let other = JwtTokenService::new(&JwtConfig {
            secret: SecretString::from("another-secret-another-secret-xx".to_string()),
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::days(1),
        });
        let foreign = other.issue(&leo()).unwrap();
        assert!(service(Duration::minutes(5)).verify(&foreign.access).is_err());
    }
}
