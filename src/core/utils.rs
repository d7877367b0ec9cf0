use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;

const DEFAULT_DIR_NAME: &str = ".balance_core";
const DATABASE_DIR: &str = "database";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.balance_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BALANCE_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding ledger databases under `base`.
pub fn database_dir_in(base: &Path) -> PathBuf {
    base.join(DATABASE_DIR)
}

pub fn config_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

/// Creates `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<(), LedgerError> {
    fs::create_dir_all(path)?;
    Ok(())
}
