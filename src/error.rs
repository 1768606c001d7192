use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for `convhist` operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Raised when a log file or output directory cannot be accessed.
    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        /// Path of the file or directory involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when a recognised field is not followed by a valid floating-point literal.
    #[error("line {line}: field `{field}` does not hold a number (found `{text}`)")]
    InvalidNumber {
        /// 1-based line number inside the log.
        line: usize,
        /// Marker of the offending field, e.g. `rhs=`.
        field: &'static str,
        /// Text found where the number was expected.
        text: String,
    },

    /// Raised when a line announces a sample but lacks the field that carries it.
    #[error("line {line}: expected field `{field}` is missing")]
    MissingField { line: usize, field: &'static str },

    /// Raised when a residual ratio is requested before any `rhs=` value is in scope.
    #[error("line {line}: residual reached before any `rhs=` value was logged")]
    MissingRhs { line: usize },

    /// Raised when a sample or terminator appears while no chapter is open.
    #[error("line {line}: `{marker}` found outside of an open chapter")]
    NoOpenChapter { line: usize, marker: &'static str },

    /// Wraps a parse failure with the log file it occurred in.
    #[error("in `{}`: {source}", path.display())]
    Parse {
        /// Log file being parsed.
        path: PathBuf,
        #[source]
        source: Box<HistoryError>,
    },

    /// Raised when a dataset is too short for the requested figure layout.
    #[error("solver `{solver}` provides {available} chapters but the layout needs {required}")]
    MissingChapter {
        solver: String,
        required: usize,
        available: usize,
    },

    /// Raised when the plotting backend fails.
    #[error("rendering failed: {0}")]
    Render(String),
}

impl HistoryError {
    /// Helper to wrap an I/O failure together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Helper for bubbling up backend errors from the plotting layer.
    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }

    /// Attaches the log file to a parse failure. I/O errors already name their path.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io { .. } | Self::Parse { .. } => self,
            other => Self::Parse {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure, with any file context stripped.
    pub fn root(&self) -> &HistoryError {
        match self {
            Self::Parse { source, .. } => source.root(),
            other => other,
        }
    }

    /// Line number the error refers to, if it stems from log parsing.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { source, .. } => source.line(),
            Self::InvalidNumber { line, .. }
            | Self::MissingField { line, .. }
            | Self::MissingRhs { line }
            | Self::NoOpenChapter { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, HistoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_context_wraps_parse_errors_only() {
        let err = HistoryError::MissingRhs { line: 4 }.in_file("reports/icc.log");
        assert_eq!(err.line(), Some(4));
        assert!(matches!(err.root(), HistoryError::MissingRhs { line: 4 }));
        let message = err.to_string();
        assert!(message.contains("reports/icc.log"));
        assert!(message.contains("line 4"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = HistoryError::io("a.log", io).in_file("b.log");
        assert!(matches!(err, HistoryError::Io { .. }));
    }
}
