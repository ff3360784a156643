//! Application state management

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use parkpro_core::{AppDirs, Database, Directory, Result, Settings};
use parkpro_net::RemoteClient;
use tracing::{debug, info};

use crate::backend::Backend;

/// Settings and directory resolved at startup
pub struct AppState {
    pub settings: Settings,
    pub data_dir: PathBuf,
    pub directory: Directory,
    pub check_in: NaiveTime,
    pub check_out: NaiveTime,
}

impl AppState {
    /// Load settings from the platform config directory
    pub fn new() -> Result<Self> {
        let dirs = AppDirs::discover()?;
        let settings = Settings::load(&dirs.config_file())?;
        Self::from_settings(settings, dirs.data_dir)
    }

    pub fn from_settings(settings: Settings, data_dir: PathBuf) -> Result<Self> {
        let directory = match &settings.roster_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading roster");
                Directory::load(path)?
            }
            None => Directory::builtin()?,
        };
        let check_in = settings.check_in_time()?;
        let check_out = settings.check_out_time()?;

        Ok(Self {
            settings,
            data_dir,
            directory,
            check_in,
            check_out,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.settings.database_path_in(&self.data_dir)
    }

    /// Open the local database with the current roster stored in it
    pub fn open_database(&self) -> Result<Database> {
        open_database_at(&self.database_path(), &self.directory)
    }

    /// The remote log when one is configured, the local database otherwise
    pub fn backend(&self) -> parkpro_net::Result<Backend> {
        match &self.settings.remote {
            Some(remote) => {
                let client = RemoteClient::from_settings(remote)?;
                info!(addr = %client.addr(), "Using remote booking log");
                Ok(Backend::Remote(client))
            }
            None => Ok(Backend::Local(self.open_database()?)),
        }
    }
}

fn open_database_at(path: &Path, directory: &Directory) -> Result<Database> {
    let db = Database::open(path)?;
    db.replace_directory(directory)?;
    Ok(db)
}
