//! Document loader for the scraped documentation corpus.
//!
//! The corpus is a JSON array of sections:
//!
//! ```json
//! [{"section": "Tickets", "content": ["text", {"table": [["a", "b"]]}]}]
//! ```
//!
//! Each plain string becomes one chunk; each table becomes one chunk whose
//! rows are joined by newlines and whose cells are joined by `" | "`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::AssistantError;

pub const TABLE_CELL_DELIMITER: &str = " | ";

const UNKNOWN_SECTION: &str = "Unknown";

/// Smallest retrievable unit of documentation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Heading the text was scraped from.
    pub section: String,
    pub content: String,
}

impl Chunk {
    pub fn new(section: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            content: content.into(),
        }
    }

    /// The first `max_chars` characters of the content.
    pub fn preview(&self, max_chars: usize) -> String {
        self.content.chars().take(max_chars).collect()
    }
}

/// Reads and parses a corpus file.
pub fn load_file(path: &Path) -> Result<Vec<Chunk>, AssistantError> {
    let raw = fs::read_to_string(path).map_err(|source| AssistantError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let corpus: Value = serde_json::from_str(&raw)
        .map_err(|e| AssistantError::corpus(format!("invalid JSON: {e}")))?;

    let chunks = load(&corpus)?;
    tracing::info!("Loaded {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

/// Flattens a parsed corpus into chunks, in document order.
pub fn load(corpus: &Value) -> Result<Vec<Chunk>, AssistantError> {
    let sections = corpus
        .as_array()
        .ok_or_else(|| AssistantError::corpus("top-level value must be an array of sections"))?;

    let mut chunks = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        let section_obj = section.as_object().ok_or_else(|| {
            AssistantError::corpus(format!("section {index} is not an object"))
        })?;

        let title = section_obj
            .get("section")
            .and_then(|t| t.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_SECTION);

        let items = section_obj
            .get("content")
            .ok_or_else(|| {
                AssistantError::corpus(format!("section {index} ({title}) has no content field"))
            })?
            .as_array()
            .ok_or_else(|| {
                AssistantError::corpus(format!("section {index} ({title}) content is not an array"))
            })?;

        for item in items {
            match chunk_text(item) {
                Some(text) => chunks.push(Chunk::new(title, text)),
                None => {
                    tracing::debug!("Skipping empty or unsupported item in section {}", title);
                }
            }
        }
    }

    Ok(chunks)
}

fn chunk_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(text) => text.clone(),
        Value::Object(obj) => {
            let rows = obj.get("table")?.as_array()?;
            if !has_non_empty_cell(rows) {
                return None;
            }
            table_text(rows)
        }
        _ => {
            tracing::warn!("Unsupported content item: {}", item);
            return None;
        }
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn table_text(rows: &[Value]) -> String {
    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(cell_text)
                        .collect::<Vec<_>>()
                        .join(TABLE_CELL_DELIMITER)
                })
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_non_empty_cell(rows: &[Value]) -> bool {
    rows.iter()
        .filter_map(|row| row.as_array())
        .flatten()
        .any(|cell| !cell_text(cell).trim().is_empty())
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
