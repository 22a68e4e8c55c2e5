use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use shred_core::day::DayBoundary;

/// Overrides the data directory (portable installs, tests).
pub const DATA_DIR_ENV: &str = "SHRED_DATA_DIR";
const CONFIG_FILE: &str = "config.json";

/// User-editable settings persisted as `config.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hour (0-23) at which a new day starts. 0 is calendar midnight.
    pub day_rollover_hour: u32,
    /// Database file name, relative to the data directory.
    pub db_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            day_rollover_hour: 0,
            db_file: "shred.db".into(),
        }
    }
}

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(resolve_data_dir()?)
    }

    pub fn load_from(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let path = data_dir.join(CONFIG_FILE);
        let settings = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        } else {
            Settings::default()
        };
        // Reject a hand-edited hour before anything uses it.
        DayBoundary::new(settings.day_rollover_hour)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let db_path = data_dir.join(&settings.db_file);
        Ok(Config {
            data_dir,
            db_path,
            settings,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn boundary(&self) -> Result<DayBoundary> {
        DayBoundary::new(self.settings.day_rollover_hour)
    }

    pub fn set_rollover_hour(&mut self, hour: u32) -> Result<()> {
        DayBoundary::new(hour)?;
        self.settings.day_rollover_hour = hour;
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(&self.settings)?;
        write_atomic(&path, &json)
    }
}

fn resolve_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let proj_dirs =
        ProjectDirs::from("", "", "shred").context("Could not determine home directory")?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.db_path, dir.path().join("shred.db"));
        assert_eq!(config.boundary().unwrap(), DayBoundary::MIDNIGHT);
    }

    #[test]
    fn test_set_rollover_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().to_path_buf()).unwrap();
        config.set_rollover_hour(6).unwrap();

        let reloaded = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.settings.day_rollover_hour, 6);
        assert_eq!(reloaded.boundary().unwrap().rollover_hour(), 6);
    }

    #[test]
    fn test_set_rollover_rejects_bad_hour() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert!(config.set_rollover_hour(24).is_err());
        assert!(!config.config_path().exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "db_file": "alt.db" }"#).unwrap();
        let config = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.settings.day_rollover_hour, 0);
        assert_eq!(config.db_path, dir.path().join("alt.db"));
    }

    #[test]
    fn test_invalid_hour_in_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "day_rollover_hour": 30 }"#).unwrap();
        assert!(Config::load_from(dir.path().to_path_buf()).is_err());
    }
}
