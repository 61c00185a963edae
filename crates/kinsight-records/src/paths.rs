//! Path resolution for the kinsight data directory

use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "KINSIGHT_HOME";

/// Resolves standard paths for the database and config files
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve from `$KINSIGHT_HOME`, falling back to the platform data directory
    pub fn new() -> std::io::Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(home)));
        }

        let base = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "data directory not found")
        })?;
        Ok(Self::with_root(base.join("kinsight")))
    }

    pub fn with_root(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Get kinsight.db path
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("kinsight.db")
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Get the JSONL log of rejected records
    pub fn rejects_file(&self) -> PathBuf {
        self.data_dir.join("rejected.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_override() {
        let temp = tempfile::TempDir::new().unwrap();
        std::env::set_var(HOME_ENV, temp.path());
        let paths = Paths::new().unwrap();
        std::env::remove_var(HOME_ENV);

        assert_eq!(paths.data_dir, temp.path());
        assert_eq!(paths.database_file(), temp.path().join("kinsight.db"));
    }

    #[test]
    #[serial]
    fn test_default_location() {
        std::env::remove_var(HOME_ENV);
        if let Ok(paths) = Paths::new() {
            assert!(paths.data_dir.ends_with("kinsight"));
        }
    }

    #[test]
    fn test_file_names() {
        let paths = Paths::with_root(PathBuf::from("/tmp/kinsight-test"));
        assert!(paths.config_file().ends_with("config.json"));
        assert!(paths.rejects_file().ends_with("rejected.jsonl"));
    }
}
