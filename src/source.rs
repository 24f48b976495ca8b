// src/source.rs

//! Loads the ordered base palette from a file.
//!
//! Two formats are accepted:
//! - `.json`: an array whose entries are packed integers (`8368696`) or
//!   strings (`"#7FB238"`, `"0x7FB238"`, `"8368696"`).
//! - anything else: plain text, one color per line. Blank lines and lines
//!   starting with `//` or `;` are skipped, and a trailing `// comment` after
//!   a color is ignored.
//!
//! Entry order is preserved; it becomes the base index of every variant.

use log::{debug, info};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::color::{rgb_from_u64, ParseColorError, Rgb};

#[derive(Debug)]
pub enum PaletteError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    /// A bad entry; `position` is the 1-based array entry or line number.
    InvalidEntry {
        position: usize,
        source: ParseColorError,
    },
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::Io { path, source } => {
                write!(f, "failed to read palette {}: {}", path.display(), source)
            }
            PaletteError::Json(e) => write!(f, "malformed JSON palette: {}", e),
            PaletteError::InvalidEntry { position, source } => {
                write!(f, "palette entry {}: {}", position, source)
            }
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::Io { source, .. } => Some(source),
            PaletteError::Json(e) => Some(e),
            PaletteError::InvalidEntry { source, .. } => Some(source),
        }
    }
}

fn color_from_json(entry: &Value) -> Result<Rgb, ParseColorError> {
    match entry {
        Value::String(text) => text.parse(),
        // Negative and fractional numbers have no `u64` form.
        Value::Number(n) => match n.as_u64() {
            Some(value) => rgb_from_u64(value),
            None => Err(ParseColorError::InvalidDigits(n.to_string())),
        },
        other => Err(ParseColorError::InvalidDigits(other.to_string())),
    }
}

/// Parses a JSON array of colors.
pub fn parse_json(text: &str) -> Result<Vec<Rgb>, PaletteError> {
    let entries: Vec<Value> = serde_json::from_str(text).map_err(PaletteError::Json)?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            color_from_json(entry).map_err(|source| PaletteError::InvalidEntry {
                position: i + 1,
                source,
            })
        })
        .collect()
}

/// Parses the line-oriented text format.
pub fn parse_text(text: &str) -> Result<Vec<Rgb>, PaletteError> {
    let mut colors = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let value = line.split("//").next().unwrap_or("").trim();
        if value.is_empty() || value.starts_with(';') {
            continue;
        }
        let color = value.parse().map_err(|source| PaletteError::InvalidEntry {
            position: i + 1,
            source,
        })?;
        colors.push(color);
    }
    Ok(colors)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Reads and parses the palette at `path`, choosing the format by extension.
pub fn load(path: &Path) -> Result<Vec<Rgb>, PaletteError> {
    let text = fs::read_to_string(path).map_err(|source| PaletteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let colors = if is_json(path) {
        debug!("Parsing {} as JSON", path.display());
        parse_json(&text)?
    } else {
        debug!("Parsing {} as line-oriented text", path.display());
        parse_text(&text)?
    };
    info!("Loaded {} base colors from {}", colors.len(), path.display());
    Ok(colors)
}
