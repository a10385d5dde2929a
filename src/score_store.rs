use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoreStoreError;

const STORE_VERSION: u8 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScoreStoreFile<'a> {
    version: u8,
    records: &'a [ScoreRecord],
}

#[derive(Clone, Debug, Deserialize)]
struct ScoreStoreFileRaw {
    version: u8,
    records: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreBoard {
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
    pub entries: Vec<ScoreRecord>,
}

/// Flat JSON file of score records kept in append order.
#[derive(Clone, Debug)]
pub struct ScoreStore {
    file_path: PathBuf,
}

impl ScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Every readable record in append order. A missing, empty or corrupt
    /// store reads as no records.
    pub fn load(&self) -> Vec<ScoreRecord> {
        load_records(&self.file_path)
    }

    /// Loads the current list, appends one record and rewrites the file.
    pub fn append_score_record(&self, name: &str, score: u64) -> Result<(), ScoreStoreError> {
        let mut records = self.load();
        records.push(ScoreRecord {
            name: name.to_string(),
            score,
        });
        self.save(&records)?;
        tracing::info!(
            path = %self.file_path.display(),
            name,
            score,
            total = records.len(),
            "score recorded"
        );
        Ok(())
    }

    /// Highest scores first; equal scores keep append order.
    pub fn build_board(&self, requested_limit: Option<usize>) -> ScoreBoard {
        let limit = requested_limit.unwrap_or(10).clamp(1, 100);
        let mut entries = self.load();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        ScoreBoard {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entries,
        }
    }

    fn save(&self, records: &[ScoreRecord]) -> Result<(), ScoreStoreError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ScoreStoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let payload = ScoreStoreFile {
            version: STORE_VERSION,
            records,
        };
        let text =
            serde_json::to_string_pretty(&payload).map_err(|source| ScoreStoreError::Encode {
                path: self.file_path.clone(),
                source,
            })?;
        fs::write(&self.file_path, text).map_err(|source| ScoreStoreError::Io {
            path: self.file_path.clone(),
            source,
        })
    }
}

fn load_records(path: &Path) -> Vec<ScoreRecord> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "failed to read score store: {error}");
            }
            return Vec::new();
        }
    };
    if text.trim().is_empty() {
        return Vec::new();
    }

    let parsed = match serde_json::from_str::<ScoreStoreFileRaw>(&text) {
        Ok(value) if value.version == STORE_VERSION => value,
        Ok(value) => {
            tracing::warn!(
                path = %path.display(),
                version = value.version,
                "unsupported score store version"
            );
            return Vec::new();
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), "failed to parse score store: {error}");
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(parsed.records.len());
    for (index, raw_value) in parsed.records.into_iter().enumerate() {
        match serde_json::from_value::<ScoreRecord>(raw_value) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    "skipping unreadable score record: {error}"
                );
            }
        }
    }
    records
}
