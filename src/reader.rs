//! Line-level I/O for BC3 files.
//!
//! BC3 files are single-byte text (Latin-1 / Windows-1252 in practice).
//! Reading never fails on content: bytes are decoded with replacement and
//! split into lines. Writing encodes back to the same single-byte charset.

use crate::constants::tags;
use crate::error::{Bc3Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Record stream a line belongs to, from its 2-character tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    Concept,
    Text,
    Decomposition,
    Measurement,
    Other,
}

impl RecordTag {
    /// Classify a line by its leading tag
    pub fn of(line: &str) -> Self {
        match line.get(..2) {
            Some(tags::CONCEPT) => RecordTag::Concept,
            Some(tags::TEXT) => RecordTag::Text,
            Some(tags::DECOMPOSITION) => RecordTag::Decomposition,
            Some(tags::MEASUREMENT) => RecordTag::Measurement,
            _ => RecordTag::Other,
        }
    }
}

/// Decode single-byte BC3 content into text
pub fn decode(bytes: &[u8]) -> String {
    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        debug!("Replaced undecodable bytes while decoding BC3 content");
    }
    decoded.into_owned()
}

/// Encode text back to the single-byte BC3 charset
pub fn encode(text: &str) -> Vec<u8> {
    let (encoded, _, had_unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    if had_unmappable {
        warn!("Some characters could not be represented in the single-byte charset");
    }
    encoded.into_owned()
}

/// Read a BC3 file as a sequence of lines without terminators
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Bc3Error::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)?;
    let lines: Vec<String> = decode(&bytes).lines().map(str::to_string).collect();

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Write lines to a BC3 file, creating parent directories as needed
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Bc3Error::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut content = lines.join("\n");
    content.push('\n');

    fs::write(path, encode(&content)).map_err(|source| Bc3Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(())
}
