// settings
use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use url::Url;

const DEFAULT_DB_NAME: &str = "songs";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SEED_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/songs.json");

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Missing document store address in the {0} variable")]
    Missing(&'static str),

    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("invalid store address {0:?}")]
    InvalidAddress(String),
}

/// Store connection parameters. The connection URL is assembled and
/// validated once, when the settings are loaded.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub max_connections: u32,
    url: Url,
}

impl DbSettings {
    pub fn new(
        service: String,
        username: Option<String>,
        password: Option<String>,
        port: Option<u16>,
        name: String,
        max_connections: u32,
    ) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::InvalidAddress(service.clone());

        let mut url = Url::parse(&format!("postgres://{}", service)).map_err(|_| invalid())?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid());
        }
        if port.is_some() {
            url.set_port(port).map_err(|_| invalid())?;
        }
        // Credentials only go in when both halves are present.
        if let (Some(user), Some(pass)) = (&username, &password) {
            url.set_username(user).map_err(|_| invalid())?;
            url.set_password(Some(pass)).map_err(|_| invalid())?;
        }
        url.set_path(&format!("/{}", name));

        Ok(Self {
            max_connections,
            url,
        })
    }

    pub fn connection_url(&self) -> &Url {
        &self.url
    }

    /// Connection URL safe to log.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub db: DbSettings,
    pub port: u16,
    pub seed_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service = var("DB_SERVICE").ok_or(SettingsError::Missing("DB_SERVICE"))?;
        let db = DbSettings::new(
            service,
            var("DB_USERNAME"),
            var("DB_PASSWORD"),
            parse_number(&var, "DB_PORT")?,
            var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            parse_number(&var, "DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        )?;

        let settings = Settings {
            db,
            port: parse_number(&var, "PORT")?.unwrap_or(DEFAULT_PORT),
            seed_file: var("SEED_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE)),
        };

        // Log which optional variables are configured (NOT their values!)
        let configured: Vec<&str> = [
            "DB_USERNAME",
            "DB_PASSWORD",
            "DB_PORT",
            "DB_NAME",
            "DB_MAX_CONNECTIONS",
            "PORT",
            "SEED_FILE",
        ]
        .into_iter()
        .filter(|key| var(*key).is_some())
        .collect();
        info!("Settings configured: {:?}", configured);

        Ok(settings)
    }
}

fn parse_number<T, F>(var: &F, key: &'static str) -> Result<Option<T>, SettingsError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidNumber { var: key, value }),
        None => Ok(None),
    }
}
