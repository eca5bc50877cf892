//! # Effect Subsystem Error Types
//!
//! All errors that can leave the effect subsystem.
//!
//! Capacity exhaustion is not an error: a refused spawn is a normal
//! outcome and is reported as `None`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the effect subsystem.
#[derive(Error, Debug)]
pub enum FxError {
    /// A configuration table contained a malformed token or value.
    ///
    /// Aborts the current table only.
    #[error("unable to parse '{table}' at line {line}: {message}")]
    ConfigParse {
        /// Name of the table being parsed.
        table: String,
        /// 1-based line of the offending token.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A required animation could not be loaded.
    #[error("could not load {kind} '{asset}'")]
    AssetLoad {
        /// Asset name as written in the table.
        asset: String,
        /// What kind of asset it was.
        kind: &'static str,
    },

    /// Runtime settings could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a table or settings file failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for effect subsystem operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_table_and_line() {
        let err = FxError::ConfigParse {
            table: "effects-fx.tbm".to_string(),
            line: 12,
            message: "expected '$Name:'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unable to parse 'effects-fx.tbm' at line 12: expected '$Name:'"
        );
    }
}
