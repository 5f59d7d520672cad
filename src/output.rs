//! Batch exporters: JSON Lines and a single JSON document.
//!
//! Both writers run once, after generation has finished, from the
//! coordinating task. Files are written to a `.tmp` sibling and renamed into
//! place so a reader never sees a half-written export.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::batch::Document;
use crate::intent::Intent;

/// Errors from the exporters.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Creating, writing or renaming the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The format name is not recognised.
    #[error("unknown output format '{0}', expected 'jsonl' or 'json'")]
    UnknownFormat(String),
}

/// Export layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Jsonl,
    /// One pretty-printed JSON document with export metadata.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jsonl => "jsonl",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "json" => Ok(Self::Json),
            other => Err(OutputError::UnknownFormat(other.to_owned())),
        }
    }
}

/// One exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLine {
    /// Sequence identifier, e.g. `prompt_0001`.
    pub id: String,
    /// Document intent.
    pub intent: Intent,
    /// Whitespace-normalised text.
    pub text: String,
}

impl From<&Document> for ExportLine {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            intent: doc.intent,
            text: normalize_whitespace(&doc.text),
        }
    }
}

/// Whole-batch JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    /// RFC 3339 timestamp of the export.
    pub export_date: String,
    /// Number of documents in `prompts`.
    pub total_prompts: usize,
    /// Exported documents.
    pub prompts: Vec<ExportLine>,
}

/// Collapse every run of whitespace (newlines and tabs included) into a
/// single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Write `docs` in the requested format.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or any filesystem step fails.
pub fn write(path: &Path, format: OutputFormat, docs: &[Document]) -> Result<(), OutputError> {
    match format {
        OutputFormat::Jsonl => write_jsonl(path, docs),
        OutputFormat::Json => write_json(path, docs),
    }
}

/// Write one `{"id", "intent", "text"}` object per line.
///
/// Documents with empty text after normalisation are skipped, so every line
/// written carries text.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or any filesystem step fails.
pub fn write_jsonl(path: &Path, docs: &[Document]) -> Result<(), OutputError> {
    let mut buf = Vec::new();
    let mut written = 0usize;
    for line in docs.iter().map(ExportLine::from) {
        if line.text.is_empty() {
            continue;
        }
        serde_json::to_writer(&mut buf, &line)?;
        buf.push(b'\n');
        written = written.saturating_add(1);
    }
    write_atomic(path, &buf)?;
    info!(path = %path.display(), documents = written, "jsonl export written");
    Ok(())
}

/// Write one pretty-printed `{"export_date", "total_prompts", "prompts"}`
/// document.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or any filesystem step fails.
pub fn write_json(path: &Path, docs: &[Document]) -> Result<(), OutputError> {
    let prompts: Vec<ExportLine> = docs
        .iter()
        .map(ExportLine::from)
        .filter(|line| !line.text.is_empty())
        .collect();
    let export = JsonExport {
        export_date: chrono::Local::now().to_rfc3339(),
        total_prompts: prompts.len(),
        prompts,
    };
    let json = serde_json::to_string_pretty(&export)?;
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), documents = export.total_prompts, "json export written");
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("export"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| OutputError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let tmp_path = tmp_sibling(path);
    let mut file = std::fs::File::create(&tmp_path).map_err(io_err(&tmp_path))?;
    file.write_all(contents).map_err(io_err(&tmp_path))?;
    file.sync_all().map_err(io_err(&tmp_path))?;
    drop(file);

    std::fs::rename(&tmp_path, path).map_err(io_err(path))
}
