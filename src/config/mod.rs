use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, config_dir_in, config_file_in, database_dir_in, ensure_dir},
    currency::LocaleConfig,
    errors::LedgerError,
};

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// File name of the ledger database inside the data directory.
    pub database: String,
    pub assets_category: String,
    pub liabilities_category: String,
    /// Create the assets and liabilities roots when the database is empty.
    pub seed_default_roots: bool,
    pub locale: LocaleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "ledger.db".into(),
            assets_category: "Assets".into(),
            liabilities_category: "Liabilities".into(),
            seed_default_roots: true,
            locale: LocaleConfig::default(),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
    database_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        ensure_dir(&config_dir_in(&base))?;
        Ok(Self {
            path: config_file_in(&base),
            database_dir: database_dir_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the configured database lives in.
    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    pub fn database_path(&self, config: &Config) -> PathBuf {
        self.database_dir.join(&config.database)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
        assert_eq!(
            manager.database_path(&Config::default()),
            temp.path().join("database").join("ledger.db")
        );
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            database: "household.db".into(),
            seed_default_roots: false,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"assets_category":"Holdings"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.assets_category, "Holdings");
        assert_eq!(config.liabilities_category, "Liabilities");
        assert_eq!(config.locale.precision, 2);
    }
}
