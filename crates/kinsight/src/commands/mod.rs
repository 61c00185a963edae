pub mod forget;
pub mod ingest;
pub mod init;
pub mod query;
pub mod report;
pub mod version;

use anyhow::Context;
use kinsight_core::{Pipeline, PipelineConfig};
use kinsight_records::Paths;
use kinsight_store::SqliteStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read the config file, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    if !path.exists() {
        return Ok(PipelineConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    PipelineConfig::from_json(&content)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn database_path(paths: &Paths, db: Option<&Path>) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| paths.database_file())
}

pub fn open_pipeline(paths: &Paths, db: Option<&Path>) -> anyhow::Result<Pipeline<SqliteStore>> {
    let config = load_config(&paths.config_file())?;
    let db_path = database_path(paths, db);
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    Ok(Pipeline::with_config(store, config))
}

/// Pretty JSON on stdout, or a note on stderr when there is nothing stored
pub fn print_json<T: Serialize>(value: Option<&T>, missing: &str) -> anyhow::Result<()> {
    match value {
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => eprintln!("{missing}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = load_config(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_load_config_partial_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"top_topics_limit": 3}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.top_topics_limit, 3);
        assert_eq!(config.highlight_limit, 4);
    }

    #[test]
    fn test_load_config_invalid_file_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_database_path_override() {
        let paths = Paths::with_root(PathBuf::from("/data/kinsight"));
        assert_eq!(
            database_path(&paths, None),
            PathBuf::from("/data/kinsight/kinsight.db")
        );
        assert_eq!(
            database_path(&paths, Some(Path::new("/tmp/other.db"))),
            PathBuf::from("/tmp/other.db")
        );
    }
}
