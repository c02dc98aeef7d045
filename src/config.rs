use std::path::PathBuf;

use anyhow::Context;

/// Environment-provided configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    /// Map provider key, exposed to the restaurant detail page when present.
    pub map_api_key: Option<String>,
    /// Master account seeded at startup. Moderation routes are gated on the
    /// master role, so the first master cannot be minted through them.
    pub master_seed: Option<MasterSeed>,
}

/// Credentials for the startup-seeded master account, taken from
/// `MASTER_USERNAME` / `MASTER_EMAIL` / `MASTER_PASSWORD`.
#[derive(Clone, Debug)]
pub struct MasterSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();

        let database_url = dotenv::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match dotenv::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a number")?,
            Err(_) => 3000,
        };
        let upload_dir = dotenv::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let map_api_key = dotenv::var("MAP_API_KEY").ok();

        let master_seed = match (
            dotenv::var("MASTER_USERNAME"),
            dotenv::var("MASTER_EMAIL"),
            dotenv::var("MASTER_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => {
                Some(MasterSeed { username, email, password })
            }
            _ => None,
        };

        Ok(Config { database_url, port, upload_dir, map_api_key, master_seed })
    }
}
