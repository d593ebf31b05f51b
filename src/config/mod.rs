use std::time::Duration;

use crate::errors::{BulletinError, BulletinResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHANNEL: &str = "announcements";

#[derive(Debug, Clone)]
pub struct NotebrookConfig {
    pub url: String,
    pub token: String,
    pub channel: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub timeout: Duration,
    pub db_path: String,
    pub log_level: String,
    /// None when NOTEBROOK_URL/NOTEBROOK_TOKEN are not both set
    pub notebrook: Option<NotebrookConfig>,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> BulletinResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let default_db = exe_dir
            .map(|d| d.join("bulletin.db").to_string_lossy().into_owned())
            .unwrap_or_else(|| "./bulletin.db".to_string());

        Self::from_lookup(|key| std::env::var(key).ok(), default_db)
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, default_db_path: String) -> BulletinResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("BULLETIN_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BulletinError::MissingEnvVar("BULLETIN_ENDPOINT".to_string()))?;

        url::Url::parse(endpoint.trim())
            .map_err(|e| BulletinError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let timeout_secs = match lookup("BULLETIN_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                BulletinError::Config(format!("BULLETIN_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(BulletinError::Config(
                "BULLETIN_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let db_path = lookup("BULLETIN_DB_PATH").unwrap_or(default_db_path);
        let log_level = lookup("BULLETIN_LOG").unwrap_or_else(|| "info".to_string());

        let notebrook = match (lookup("NOTEBROOK_URL"), lookup("NOTEBROOK_TOKEN")) {
            (Some(url), Some(token)) => Some(NotebrookConfig {
                url,
                token,
                channel: lookup("NOTEBROOK_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            }),
            (Some(_), None) => {
                return Err(BulletinError::MissingEnvVar("NOTEBROOK_TOKEN".to_string()))
            }
            (None, Some(_)) => {
                return Err(BulletinError::MissingEnvVar("NOTEBROOK_URL".to_string()))
            }
            (None, None) => None,
        };

        Ok(Self {
            endpoint: endpoint.trim().to_string(),
            timeout: Duration::from_secs(timeout_secs),
            db_path,
            log_level,
            notebrook,
        })
    }
}
