//! # seed
//!
//! Creates a staff account and a few starter groups in the configured
//! Postgres database. Safe to run repeatedly: existing rows are left alone.
//!
//! Usage: `seed <admin-username>` with the password in `YATUBE_SEED_PASSWORD`.

use anyhow::{bail, Context};
use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::{DomainError, GroupRepository, NewGroup, NewUser, PasswordHasher, UserRepository};
use secrecy::ExposeSecret;
use storage_adapters::PgStore;
use tracing::info;

const GROUPS: &[(&str, &str, &str)] = &[
    ("News", "news", "Announcements and site news"),
    ("Cats", "cats", "Everything about cats"),
    ("Books", "books", "What are you reading?"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let Some(username) = std::env::args().nth(1) else {
        bail!("usage: seed <admin-username>  (password in YATUBE_SEED_PASSWORD)");
    };
    let password = std::env::var("YATUBE_SEED_PASSWORD").context("YATUBE_SEED_PASSWORD is not set")?;
    domains::validation::username(&username)?;
    domains::validation::password(&password)?;

    let settings = Settings::load()?;
    let store = PgStore::connect(settings.database.url.expose_secret(), 2).await?;
    store.migrate().await?;

    if UserRepository::find_by_username(&store, &username).await?.is_some() {
        info!(%username, "staff user already exists");
    } else {
        let password_hash = Argon2Hasher::new().hash(&password)?;
        let user = UserRepository::create(&store, NewUser { username, password_hash, is_staff: true }).await?;
        info!(user_id = user.id, "staff user created");
    }

    for (title, slug, description) in GROUPS {
        let group = NewGroup { title: title.to_string(), slug: slug.to_string(), description: description.to_string() };
        match GroupRepository::create(&store, group).await {
            Ok(group) => info!(slug = %group.slug, "group created"),
            Err(DomainError::Conflict(_)) => info!(%slug, "group already exists"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
