use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides the database location, mostly for scripts and tests.
pub const DB_ENV_VAR: &str = "MACROLOG_DB";

pub struct Config {
    pub db_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "macrolog").context("Could not determine home directory")?;

        let mut config = Self::from_data_dir(proj_dirs.data_dir())?;
        if let Some(path) = std::env::var_os(DB_ENV_VAR).filter(|p| !p.is_empty()) {
            config.db_path = PathBuf::from(path);
            tracing::debug!("Using database from {DB_ENV_VAR}: {}", config.db_path.display());
        }
        Ok(config)
    }

    pub fn from_data_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("macrolog.db"),
            backup_dir: data_dir.join("backups"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("nested").join("macrolog");
        let config = Config::from_data_dir(&data_dir).unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(config.db_path, data_dir.join("macrolog.db"));
        assert_eq!(config.backup_dir, data_dir.join("backups"));
        // Backups are created lazily
        assert!(!config.backup_dir.exists());
    }
}
