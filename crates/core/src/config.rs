//! Application settings
//!
//! Loaded from `parkpro.toml` in the platform config directory. Every field
//! is optional; a missing file means defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the settings file inside the config directory
pub const CONFIG_FILE_NAME: &str = "parkpro.toml";

/// Name of the database file inside the data directory
pub const DATABASE_FILE_NAME: &str = "parkpro.db";

/// Default bind address for the booking log server
pub const DEFAULT_BIND: &str = "127.0.0.1:7340";

fn default_check_in() -> String {
    "16:00".to_string()
}

fn default_check_out() -> String {
    "11:00".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Top-level settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database location (defaults to the data directory)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Roster file (defaults to the built-in roster)
    #[serde(default)]
    pub roster_path: Option<PathBuf>,
    /// Default check-in time, `HH:MM`
    #[serde(default = "default_check_in")]
    pub check_in: String,
    /// Default check-out time, `HH:MM`
    #[serde(default = "default_check_out")]
    pub check_out: String,
    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Use a remote booking log instead of the local database
    #[serde(default)]
    pub remote: Option<RemoteSettings>,
    #[serde(default)]
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            roster_path: None,
            check_in: default_check_in(),
            check_out: default_check_out(),
            log_filter: None,
            remote: None,
            server: ServerSettings::default(),
        }
    }
}

/// Remote booking log connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    pub addr: String,
    pub token: String,
    /// Attempts per request before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Delay before the first retry, doubled after each failure
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl RemoteSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.addr
            .parse()
            .map_err(|_| Error::Config(format!("invalid remote address `{}`", self.addr)))
    }
}

/// Booking log server hosted by `parkpro serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub token: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            token: String::new(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|_| Error::Config(format!("invalid bind address `{}`", self.bind)))
    }
}

impl Settings {
    /// Parse settings from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        self.check_in_time()?;
        self.check_out_time()?;
        if let Some(remote) = &self.remote {
            remote.socket_addr()?;
            if remote.retries == 0 {
                return Err(Error::Config("remote.retries must be at least 1".into()));
            }
        }
        self.server.socket_addr()?;
        Ok(())
    }

    pub fn check_in_time(&self) -> Result<NaiveTime> {
        parse_hhmm(&self.check_in)
    }

    pub fn check_out_time(&self) -> Result<NaiveTime> {
        parse_hhmm(&self.check_out)
    }

    /// Database location, defaulting into `data_dir`
    pub fn database_path_in(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE_NAME))
    }
}

/// Parse a `HH:MM` wall-clock time
pub fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| Error::Config(format!("invalid time `{}`, expected HH:MM", value)))
}

/// Platform directories for settings and data
#[derive(Debug, Clone)]
pub struct AppDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppDirs {
    pub fn discover() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "parkpro", "parkpro").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(
            settings.check_in_time().unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        assert_eq!(
            settings.check_out_time().unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap()
        );
        assert!(settings.remote.is_none());
        assert_eq!(settings.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_full_settings() {
        let toml = r#"
database_path = "/var/lib/parkpro/bookings.db"
check_in = "15:30"
log_filter = "parkpro=debug"

[remote]
addr = "10.0.0.5:7340"
token = "secret"

[server]
bind = "0.0.0.0:7340"
token = "secret"
"#;
        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(
            settings.check_in_time().unwrap(),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap()
        );
        let remote = settings.remote.as_ref().unwrap();
        assert_eq!(remote.retries, 3);
        assert_eq!(remote.initial_backoff_ms, 1000);
        assert_eq!(remote.socket_addr().unwrap().port(), 7340);
        assert_eq!(
            settings.database_path_in(Path::new("/tmp")),
            PathBuf::from("/var/lib/parkpro/bookings.db")
        );
    }

    #[test]
    fn test_invalid_time_rejected() {
        assert!(matches!(
            Settings::from_toml("check_out = \"25:99\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_remote_rejected() {
        let toml = "[remote]\naddr = \"nowhere\"\ntoken = \"t\"\n";
        assert!(Settings::from_toml(toml).is_err());

        let toml = "[remote]\naddr = \"127.0.0.1:1\"\ntoken = \"t\"\nretries = 0\n";
        assert!(Settings::from_toml(toml).is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(settings.check_in, "16:00");
        assert_eq!(
            settings.database_path_in(temp.path()),
            temp.path().join(DATABASE_FILE_NAME)
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "check_in = \"14:00\"\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.check_in, "14:00");
    }
}
