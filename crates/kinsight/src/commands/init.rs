use kinsight_core::PipelineConfig;
use kinsight_records::Paths;
use std::path::Path;

pub fn run(db: Option<&Path>) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    std::fs::create_dir_all(&paths.data_dir)?;

    let config_path = paths.config_file();
    if write_default_config(&config_path)? {
        println!("✓ Wrote default config to {}", config_path.display());
    } else {
        println!("Config already present at {}", config_path.display());
    }

    // Opening creates the schema
    super::open_pipeline(&paths, db)?;
    println!("✓ Database ready");
    Ok(())
}

/// Returns false when a config file already exists
fn write_default_config(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let json = serde_json::to_string_pretty(&PipelineConfig::default())?;
    kinsight_records::atomic_write(path, json.as_bytes())?;
    Ok(true)
}
