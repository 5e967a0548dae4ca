use std::time::Duration;
use std::{env, path::PathBuf};

const DEMO_USERNAME: &str = "lecturer";
const DEMO_PASSWORD: &str = "Password@123";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub data_dir: PathBuf,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub lecturer_username: String,
    pub lecturer_password: String,
    pub session_ttl: Duration,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Self {
        let lecturer_username = env::var("LECTURER_USERNAME").ok();
        let lecturer_password = env::var("LECTURER_PASSWORD").ok();
        if lecturer_username.is_none() || lecturer_password.is_none() {
            tracing::warn!(target: "auth", "LECTURER_USERNAME/LECTURER_PASSWORD not set, using demo credentials");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/loars.db?mode=rwc".into()),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".into())),
            port: parse_or("PORT", 8081),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 200 * 1024 * 1024),
            lecturer_username: lecturer_username.unwrap_or_else(|| DEMO_USERNAME.into()),
            lecturer_password: lecturer_password.unwrap_or_else(|| DEMO_PASSWORD.into()),
            session_ttl: Duration::from_secs(parse_or(
                "SESSION_TTL_SECS",
                crate::auth::DEFAULT_SESSION_TTL.as_secs(),
            )),
        }
    }

    /// Config rooted at `data_dir` with demo credentials; used by tests and
    /// local tooling that do not go through the environment.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            data_dir: data_dir.into(),
            port: 8081,
            max_upload_bytes: 200 * 1024 * 1024,
            lecturer_username: DEMO_USERNAME.into(),
            lecturer_password: DEMO_PASSWORD.into(),
            session_ttl: crate::auth::DEFAULT_SESSION_TTL,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
