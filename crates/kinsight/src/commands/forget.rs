use kinsight_records::Paths;
use std::path::Path;

pub fn run(db: Option<&Path>, child_id: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let mut pipeline = super::open_pipeline(&paths, db)?;
    let removed = pipeline.forget_child(child_id)?;
    println!("Removed {removed} conversations and all insights for {child_id}");
    Ok(())
}
