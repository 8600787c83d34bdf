//! Input discovery and loading.
//!
//! Turns command-line paths into `(name, text)` pairs. Plain `.csv` and
//! `.txt` files become one pair each; a `.zip` bundle becomes one pair per
//! `.csv` / `.txt` entry. Directories are walked recursively.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use analyzer_core::error::{AnalyzerError, Result};
use tracing::{debug, warn};

// ── Input kinds ───────────────────────────────────────────────────────────────

/// How a path on disk is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A single delimited or line-oriented text export.
    Text,
    /// A ZIP bundle of text exports.
    Archive,
}

impl InputKind {
    /// Kind implied by the file extension, or `None` for unsupported files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(InputKind::Text),
            "zip" => Some(InputKind::Archive),
            _ => None,
        }
    }
}

/// `true` for archive entry names the analyzer reads.
pub fn is_text_entry(name: &str) -> bool {
    name.ends_with(".csv") || name.ends_with(".txt")
}

/// A named text blob ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name, or the entry path inside an archive.
    pub name: String,
    pub text: String,
}

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Display name for a path: its final component, or the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Expand `path` into the supported input files it names, sorted by path.
///
/// A file must have a supported extension; a directory is walked
/// recursively and unsupported files inside it are skipped.
pub fn find_input_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(AnalyzerError::InputNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return match InputKind::from_path(path) {
            Some(_) => Ok(vec![path.to_path_buf()]),
            None => Err(AnalyzerError::UnsupportedInput(path.to_path_buf())),
        };
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && InputKind::from_path(entry.path()).is_some()
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();

    if files.is_empty() {
        warn!("No .csv, .txt or .zip files found in {}", path.display());
    } else {
        debug!("Found {} input files in {}", files.len(), path.display());
    }
    Ok(files)
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Turn the raw contents of the file at `path` into named text blobs.
///
/// A text export yields one blob named after the file; an archive yields
/// one blob per text entry (see [`read_archive_entries`]).
pub fn sources_from_bytes(path: &Path, kind: InputKind, bytes: &[u8]) -> Result<Vec<SourceFile>> {
    match kind {
        InputKind::Text => Ok(vec![SourceFile {
            name: display_name(path),
            text: decode_text(bytes),
        }]),
        InputKind::Archive => read_archive_entries(bytes),
    }
}

/// Extract every `.csv` / `.txt` entry from an in-memory ZIP bundle.
///
/// Directory entries and other file types are ignored. Entries are returned
/// in archive order. A corrupt archive or unreadable entry fails the whole
/// bundle.
pub fn read_archive_entries(bytes: &[u8]) -> Result<Vec<SourceFile>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AnalyzerError::Archive(e.to_string()))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| AnalyzerError::Archive(format!("entry {i}: {e}")))?;

        if file.is_dir() || !is_text_entry(file.name()) {
            debug!("Skipping archive entry {}", file.name());
            continue;
        }

        let name = file.name().to_string();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| AnalyzerError::Archive(format!("{name}: {e}")))?;

        entries.push(SourceFile {
            name,
            text: decode_text(&buf),
        });
    }

    debug!("Extracted {} text entries from archive", entries.len());
    Ok(entries)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
