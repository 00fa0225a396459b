//! Index provisioning and dataset loading.
//!
//! `refrain init` creates the song index with a bilingual mapping: the
//! `title`, `artist`, and `lyrics` text fields are standard-analyzed with a
//! Thai-analyzed `.th` sub-field each, so one boost weight covers both
//! languages at query time. `refrain load` streams an NDJSON dataset into
//! the index in chunks, cleaning the scraped `year` field (string or
//! single-element list → integer) and dropping junk columns along the way.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::backend::ElasticBackend;
use crate::config::Config;

/// Documents per `_bulk` request.
const BULK_CHUNK_SIZE: usize = 2000;

/// Scraper leftovers that must not reach the index.
const JUNK_FIELDS: &[&str] = &[
    "lyrics_clean",
    "lyrics_clean.keyword",
    "features.keyword",
    "year.keyword",
];

/// Index settings and mappings for the song corpus.
pub fn index_mapping() -> Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    "thai_analyzer": { "type": "thai" },
                    "english_analyzer": { "type": "standard" }
                }
            }
        },
        "mappings": {
            "properties": {
                "title": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "th": { "type": "text", "analyzer": "thai_analyzer" },
                        "raw": { "type": "keyword" }
                    }
                },
                "artist": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "th": { "type": "text", "analyzer": "thai_analyzer" },
                        "raw": { "type": "keyword" }
                    }
                },
                "lyrics": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "th": { "type": "text", "analyzer": "thai_analyzer" }
                    }
                },
                "views": { "type": "integer" },
                "album": { "type": "text" },
                "duration": { "type": "keyword" },
                "year": { "type": "integer" }
            }
        }
    })
}

/// Create the index if it does not exist. Idempotent.
pub async fn run_init(config: &Config) -> Result<()> {
    let backend = ElasticBackend::new(&config.backend)?;
    backend.ping().await?;

    let index = &config.backend.index;
    if backend.index_exists(index).await? {
        println!("Index '{}' already exists. Skipping creation.", index);
        return Ok(());
    }

    backend.create_index(index, &index_mapping()).await?;
    println!("Index '{}' created.", index);
    Ok(())
}

/// Bulk-load an NDJSON dataset file into the index.
///
/// The file is streamed line by line and flushed one batch at a time, so
/// corpora larger than memory load fine.
pub async fn run_load(
    config: &Config,
    path: &Path,
    limit: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let backend = if dry_run {
        None
    } else {
        let backend = ElasticBackend::new(&config.backend)?;
        backend.ping().await?;
        Some(backend)
    };

    let mut batch: Vec<Value> = Vec::with_capacity(BULK_CHUNK_SIZE);
    let mut total = 0usize;
    let mut batches = 0usize;
    let mut uploaded = 0usize;
    let mut failed = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut doc: Value = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON on line {}", line_no + 1))?;
        clean_song(&mut doc);
        batch.push(doc);
        total += 1;

        if batch.len() >= BULK_CHUNK_SIZE {
            if let Some(backend) = &backend {
                let chunk_failed = backend.bulk(&config.backend.index, &batch).await?;
                failed += chunk_failed;
                uploaded += batch.len() - chunk_failed;
                println!("  uploaded {} documents...", uploaded);
            }
            batches += 1;
            batch.clear();
        }

        if limit.is_some_and(|limit| total >= limit) {
            break;
        }
    }

    if !batch.is_empty() {
        if let Some(backend) = &backend {
            let chunk_failed = backend.bulk(&config.backend.index, &batch).await?;
            failed += chunk_failed;
            uploaded += batch.len() - chunk_failed;
        }
        batches += 1;
    }

    if dry_run {
        println!(
            "Dry run: {} documents would be uploaded in {} batches.",
            total, batches
        );
        return Ok(());
    }

    println!("Upload complete: {} documents indexed.", uploaded);
    if failed > 0 {
        eprintln!("Warning: {} documents were rejected by the backend.", failed);
    }
    Ok(())
}

/// Normalize a scraped song document in place.
///
/// `year` arrives as an integer, a numeric string, or a single-element
/// list of either; anything unparseable becomes absent. Junk scraper
/// columns are dropped.
fn clean_song(doc: &mut Value) {
    if let Some(obj) = doc.as_object_mut() {
        if let Some(year) = obj.get("year") {
            match parse_year(year) {
                Some(y) => {
                    obj.insert("year".to_string(), json!(y));
                }
                None => {
                    obj.remove("year");
                }
            }
        }
        for junk in JUNK_FIELDS {
            obj.remove(*junk);
        }
    }
}

fn parse_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(items) => items.first().and_then(parse_year),
        _ => None,
    }
}
