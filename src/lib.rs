pub mod analytics;
pub mod db;
pub mod export;
pub mod history;
pub mod models;
pub mod payload;
pub mod settings;
mod utils;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use db::Database;
pub use history::HistoryController;
pub use settings::SettingsStore;

const DB_FILE: &str = "qrtrail.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// Everything the front end needs, wired against one data directory.
pub struct App {
    pub db: Database,
    pub history: HistoryController,
    pub settings: SettingsStore,
}

impl App {
    pub fn init(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let db = Database::new(data_dir.join(DB_FILE))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let history = HistoryController::new(db.clone());

        Ok(Self {
            db,
            history,
            settings,
        })
    }
}
