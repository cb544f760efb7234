//! Source loading.
//!
//! The resolver reaches storage only through the `SourceLoader` trait:
//! `read` fetches one URI in a named character set, `expand` turns a
//! wildcard pattern into concrete URIs (`*` matches immediate children,
//! `**` matches recursively), and `resolve` interprets a URI relative to
//! the including file. `FsLoader` is the production implementation;
//! `MemoryLoader` backs tests and embedded use.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path};

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::constants::compile_time::lexical::MAX_SOURCE_SIZE;
use crate::logging::codes::{self, Code};

const SUPPORTED_CHARSETS: [&str; 4] = ["utf-8", "utf8", "us-ascii", "ascii"];

// ===== Errors =====

/// Load failures. Each one is terminal for the unit that requested the
/// source, never for the whole run.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Source not found: '{uri}'.")]
    NotFound { uri: String },

    #[error("Source not readable: '{uri}' ({detail}).")]
    NotReadable { uri: String, detail: String },

    #[error("Source is empty: '{uri}'.")]
    EmptySource { uri: String },

    #[error("Unsupported character set '{charset}'.")]
    UnsupportedCharset { charset: String },

    #[error("Source exceeds {limit} bytes: '{uri}'.")]
    TooLarge { uri: String, limit: usize },

    #[error("Invalid include pattern '{pattern}'.")]
    InvalidPattern { pattern: String },
}

impl LoaderError {
    pub fn not_found(uri: &str) -> Self {
        Self::NotFound {
            uri: uri.to_string(),
        }
    }

    pub fn not_readable(uri: &str, detail: &str) -> Self {
        Self::NotReadable {
            uri: uri.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn empty_source(uri: &str) -> Self {
        Self::EmptySource {
            uri: uri.to_string(),
        }
    }

    pub fn unsupported_charset(charset: &str) -> Self {
        Self::UnsupportedCharset {
            charset: charset.to_string(),
        }
    }

    pub fn too_large(uri: &str) -> Self {
        Self::TooLarge {
            uri: uri.to_string(),
            limit: MAX_SOURCE_SIZE,
        }
    }

    pub fn invalid_pattern(pattern: &str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::NotFound { .. } => codes::loading::SOURCE_NOT_FOUND,
            Self::NotReadable { .. } => codes::loading::SOURCE_NOT_READABLE,
            Self::EmptySource { .. } => codes::loading::EMPTY_SOURCE,
            Self::UnsupportedCharset { .. } => codes::loading::UNSUPPORTED_CHARSET,
            Self::TooLarge { .. } => codes::loading::SOURCE_TOO_LARGE,
            Self::InvalidPattern { .. } => codes::loading::INVALID_PATTERN,
        }
    }
}

// ===== Loader Contract =====

pub trait SourceLoader: Send + Sync {
    /// Fetch one concrete URI decoded with the given character set
    fn read(&self, uri: &str, charset: &str) -> Result<String, LoaderError>;

    /// Expand a wildcard pattern into concrete URIs. Non-wildcard input
    /// passes through unchanged; a pattern matching nothing yields an
    /// empty list, not an error.
    fn expand(&self, pattern: &str) -> Result<Vec<String>, LoaderError>;

    /// Interpret a URI relative to the including file
    fn resolve(&self, base: &str, uri: &str) -> String;
}

// ===== File-System Loader =====

#[derive(Debug, Default)]
pub struct FsLoader;

impl FsLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceLoader for FsLoader {
    fn read(&self, uri: &str, charset: &str) -> Result<String, LoaderError> {
        if !charset_supported(charset) {
            return Err(LoaderError::unsupported_charset(charset));
        }

        let metadata = std::fs::metadata(uri).map_err(|error| io_error(uri, error))?;
        // SECURITY: check the size before reading the file into memory.
        if metadata.len() > MAX_SOURCE_SIZE as u64 {
            return Err(LoaderError::too_large(uri));
        }

        let bytes = std::fs::read(uri).map_err(|error| io_error(uri, error))?;
        let source = decode(uri, charset, bytes)?;
        if source.trim().is_empty() {
            return Err(LoaderError::empty_source(uri));
        }

        crate::log_debug!("Source loaded",
            "uri" => uri,
            "bytes" => source.len()
        );
        Ok(source)
    }

    fn expand(&self, pattern: &str) -> Result<Vec<String>, LoaderError> {
        if !pattern.contains('*') {
            return Ok(vec![pattern.to_string()]);
        }

        let regex = wildcard_regex(pattern)?;
        let base = fixed_prefix(pattern);
        let mut matches = Vec::new();
        for entry in WalkDir::new(&base)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_string_lossy();
            let path = path.strip_prefix("./").unwrap_or(&path);
            if regex.is_match(path) {
                matches.push(path.to_string());
            }
        }
        matches.sort();

        crate::log_debug!("Pattern expanded",
            "pattern" => pattern,
            "matches" => matches.len()
        );
        Ok(matches)
    }

    fn resolve(&self, base: &str, uri: &str) -> String {
        resolve_relative(base, uri)
    }
}

// ===== In-Memory Loader =====

/// URI to source map, mostly for tests and embedded callers
#[derive(Debug, Default)]
pub struct MemoryLoader {
    sources: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, uri: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(uri, source);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(uri.into(), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn read(&self, uri: &str, charset: &str) -> Result<String, LoaderError> {
        if !charset_supported(charset) {
            return Err(LoaderError::unsupported_charset(charset));
        }
        let source = self
            .sources
            .get(uri)
            .ok_or_else(|| LoaderError::not_found(uri))?;
        if source.trim().is_empty() {
            return Err(LoaderError::empty_source(uri));
        }
        Ok(source.clone())
    }

    fn expand(&self, pattern: &str) -> Result<Vec<String>, LoaderError> {
        if !pattern.contains('*') {
            return Ok(vec![pattern.to_string()]);
        }
        let regex = wildcard_regex(pattern)?;
        Ok(self
            .sources
            .keys()
            .filter(|uri| regex.is_match(uri))
            .cloned()
            .collect())
    }

    fn resolve(&self, base: &str, uri: &str) -> String {
        resolve_relative(base, uri)
    }
}

// ===== Shared Helpers =====

fn charset_supported(charset: &str) -> bool {
    SUPPORTED_CHARSETS
        .iter()
        .any(|supported| charset.eq_ignore_ascii_case(supported))
}

fn ascii_only(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("us-ascii") || charset.eq_ignore_ascii_case("ascii")
}

fn io_error(uri: &str, error: io::Error) -> LoaderError {
    if error.kind() == io::ErrorKind::NotFound {
        LoaderError::not_found(uri)
    } else {
        LoaderError::not_readable(uri, &error.to_string())
    }
}

fn decode(uri: &str, charset: &str, bytes: Vec<u8>) -> Result<String, LoaderError> {
    if ascii_only(charset) && !bytes.is_ascii() {
        return Err(LoaderError::not_readable(uri, "non-ASCII byte in source"));
    }
    let text =
        String::from_utf8(bytes).map_err(|_| LoaderError::not_readable(uri, "invalid UTF-8"))?;
    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        return Ok(stripped.to_string());
    }
    Ok(text)
}

/// Translate a wildcard pattern: `*` stops at path separators, `**`
/// crosses them.
fn wildcard_regex(pattern: &str) -> Result<Regex, LoaderError> {
    if pattern.trim().is_empty() {
        return Err(LoaderError::invalid_pattern(pattern));
    }
    let translated = regex::escape(pattern)
        .replace(r"\*\*", "\u{0}")
        .replace(r"\*", "[^/]*")
        .replace('\u{0}', ".*");
    Regex::new(&format!("^{translated}$")).map_err(|_| LoaderError::invalid_pattern(pattern))
}

/// Directory to start a wildcard walk from: everything before the first
/// `*`, cut back to the last separator.
fn fixed_prefix(pattern: &str) -> String {
    let head = &pattern[..pattern.find('*').unwrap_or(pattern.len())];
    match head.rfind('/') {
        Some(index) => head[..=index].to_string(),
        None => ".".to_string(),
    }
}

fn resolve_relative(base: &str, uri: &str) -> String {
    if base.is_empty() || Path::new(uri).is_absolute() {
        return uri.to_string();
    }
    let parent = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&parent.join(uri))
}

fn normalize_path(path: &Path) -> String {
    let mut root = "";
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir => root = "/",
            Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => match parts.last().map(String::as_str) {
                Some("..") | None => parts.push("..".to_string()),
                Some(_) => {
                    parts.pop();
                }
            },
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    format!("{root}{}", parts.join("/"))
}
