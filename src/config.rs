use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub user_id: Option<String>,
}

impl AppConfig {
    /// Reads `APP_DATA_PATH`, `PORT` and `APP_USER_ID`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let user_id = lookup("APP_USER_ID")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            data_dir,
            port,
            user_id,
        }
    }
}
