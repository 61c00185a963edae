use anyhow::Context;
use kinsight_core::{InsightStore, Pipeline};
use kinsight_records::{append_jsonl, read_records, InputRecord, Origin, Paths};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn run(
    db: Option<&Path>,
    file: Option<&Path>,
    dir: Option<&Path>,
    child: Option<&str>,
) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let rejects = paths.rejects_file();

    let files: Vec<PathBuf> = match (file, dir) {
        (Some(f), _) => vec![f.to_path_buf()],
        (None, Some(d)) => {
            let mut files = discover_record_files(d)
                .with_context(|| format!("failed to scan {}", d.display()))?;
            files.retain(|f| f != &rejects && f != &paths.config_file());
            if files.is_empty() {
                println!("No record files found in {}", d.display());
                return Ok(());
            }
            println!("Discovered {} record files", files.len());
            files
        }
        (None, None) => anyhow::bail!("either --file or --dir is required"),
    };

    let mut pipeline = super::open_pipeline(&paths, db)?;
    let mut total_ingested = 0;
    let mut total_rejected = 0;

    for path in &files {
        let lines = read_records(path).with_context(|| format!("failed to read {}", path.display()))?;
        let (mut records, unreadable) = split_lines(lines);
        if let Some(child_id) = child {
            for (_, record) in &mut records {
                fill_child_id(record, child_id);
            }
        }

        let outcome = ingest_all(&mut pipeline, &records, &unreadable, &rejects)?;
        println!(
            "Ingested {} conversations from {}",
            outcome.ingested,
            path.display()
        );
        if !outcome.errors.is_empty() {
            println!(
                "Rejected {} records (logged to {})",
                outcome.errors.len(),
                rejects.display()
            );
            for error in &outcome.errors {
                println!("  {error}");
            }
        }
        total_ingested += outcome.ingested;
        total_rejected += outcome.errors.len();
    }

    if files.len() > 1 {
        println!(
            "Total: {total_ingested} ingested, {total_rejected} rejected across {} files",
            files.len()
        );
    }
    Ok(())
}

#[derive(Debug, Default)]
struct FileOutcome {
    ingested: usize,
    /// "{origin}: {message}", in file order
    errors: Vec<String>,
}

/// Ingest every readable record and log each rejected or unreadable one to `rejects`
fn ingest_all<S: InsightStore>(
    pipeline: &mut Pipeline<S>,
    records: &[(Origin, Value)],
    unreadable: &[(Origin, String)],
    rejects: &Path,
) -> anyhow::Result<FileOutcome> {
    let mut outcome = FileOutcome::default();
    let mut failures: Vec<(Origin, String, Option<&Value>)> = unreadable
        .iter()
        .map(|(origin, error)| (*origin, error.clone(), None))
        .collect();

    for (origin, record) in records {
        match pipeline.ingest(record) {
            Ok(_) => outcome.ingested += 1,
            Err(e) => failures.push((*origin, e.to_string(), Some(record))),
        }
    }
    failures.sort_by_key(|(origin, _, _)| *origin);

    for (origin, error, record) in failures {
        let message = format!("{origin}: {error}");
        let entry = match record {
            Some(record) => json!({ "error": message, "record": record }),
            None => {
                warn!(%origin, %error, "unreadable record");
                json!({ "error": message })
            }
        };
        append_jsonl(rejects, &entry)?;
        outcome.errors.push(message);
    }
    Ok(outcome)
}

fn split_lines(lines: Vec<InputRecord>) -> (Vec<(Origin, Value)>, Vec<(Origin, String)>) {
    let mut records = Vec::new();
    let mut unreadable = Vec::new();
    for InputRecord { origin, line } in lines {
        match line {
            Ok(value) => records.push((origin, value)),
            Err(e) => unreadable.push((origin, e)),
        }
    }
    (records, unreadable)
}

/// Set `childId` on objects where it is absent, null or blank
fn fill_child_id(record: &mut Value, child_id: &str) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    let missing = match obj.get("childId") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        obj.insert("childId".to_string(), Value::String(child_id.to_string()));
    }
}

/// Every *.json and *.jsonl file under `dir`, sorted by path
fn discover_record_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json" | "jsonl")
            ) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
