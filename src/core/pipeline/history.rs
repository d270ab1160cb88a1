//! Generation History
//!
//! Appends one record per finished run to `generation_log.json` in the
//! history directory, next to the finished videos.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::CoreResult;

/// Log file name inside the history directory
pub const LOG_FILE: &str = "generation_log.json";

/// One completed (or failed) generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub topic: String,
    pub output_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

impl GenerationRecord {
    pub fn completed(topic: &str, output_path: &Path) -> Self {
        Self {
            topic: topic.to_string(),
            output_path: output_path.to_path_buf(),
            timestamp: Utc::now(),
            status: "completed".to_string(),
        }
    }
}

/// Loads all records from the history directory (empty when none exist).
pub fn load_records(history_dir: &Path) -> CoreResult<Vec<GenerationRecord>> {
    let path = history_dir.join(LOG_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Appends a record to the log, creating it on first use.
pub fn append_record(history_dir: &Path, record: GenerationRecord) -> CoreResult<()> {
    fs::create_dir_all(history_dir)?;
    let mut records = load_records(history_dir)?;
    records.push(record);

    let path = history_dir.join(LOG_FILE);
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(&records)?.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
