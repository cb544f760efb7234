//! One loaded source file.

use crate::loader::{LoaderError, SourceLoader};
use crate::logging::codes;

/// A source file exactly as loaded, before any lexing. A load failure
/// makes the unit terminal: it still appears in the diagnostics report
/// but contributes no tokens, commands, or includes.
#[derive(Debug)]
pub struct SourceUnit {
    pub uri: String,
    pub charset: String,
    pub raw_code: String,
    pub load_error: Option<LoaderError>,
}

impl SourceUnit {
    /// Load a URI through the given loader, capturing any failure
    pub fn load(loader: &dyn SourceLoader, uri: &str, charset: &str) -> Self {
        match loader.read(uri, charset) {
            Ok(raw_code) => {
                crate::log_success!(codes::success::UNIT_LOADED, "Source loaded",
                    "uri" => uri,
                    "bytes" => raw_code.len()
                );
                Self {
                    uri: uri.to_string(),
                    charset: charset.to_string(),
                    raw_code,
                    load_error: None,
                }
            }
            Err(error) => {
                crate::log_error!(error.error_code(), "Source load failed",
                    "uri" => uri,
                    "detail" => error
                );
                Self {
                    uri: uri.to_string(),
                    charset: charset.to_string(),
                    raw_code: String::new(),
                    load_error: Some(error),
                }
            }
        }
    }

    /// Wrap already-in-memory source, as for embedded input
    pub fn from_text(uri: &str, raw_code: &str) -> Self {
        Self {
            uri: uri.to_string(),
            charset: "utf-8".to_string(),
            raw_code: raw_code.to_string(),
            load_error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.load_error.is_some()
    }
}
