use std::path::PathBuf;

use thiserror::Error;

/// Why a single trace line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("unrecognized operation '{0}'")]
    UnknownOperation(String),
    /// `position` is the 1-based token index on the line.
    #[error("missing {field} (token {position})")]
    MissingField { field: &'static str, position: usize },
    #[error("invalid {field} '{token}' (token {position})")]
    InvalidField {
        field: &'static str,
        position: usize,
        token: String,
    },
}

/// Fatal setup errors.  Any of these aborts loading before replay starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trace {} does not exist", .path.display())]
    TraceNotFound { path: PathBuf },

    #[error("trace {} cannot be read: {source}", .path.display())]
    TraceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trace {} line {line}: unrecognized operation '{token}'", .path.display())]
    UnknownOperation {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("trace {} line {line}: {source}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: LineError,
    },

    #[error("invalid memory organization: {field} = {value} must be a non-zero power of two")]
    InvalidOrganization { field: &'static str, value: u64 },

    #[error("memory organization needs {bits} address bits, at most {max} fit a flat address")]
    OrganizationTooWide { bits: u32, max: u32 },
}

impl ConfigError {
    pub(crate) fn from_line(path: PathBuf, line: usize, err: LineError) -> Self {
        match err {
            LineError::UnknownOperation(token) => Self::UnknownOperation { path, line, token },
            source => Self::MalformedLine { path, line, source },
        }
    }

    /// Trace file the error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::TraceNotFound { path }
            | Self::TraceUnreadable { path, .. }
            | Self::UnknownOperation { path, .. }
            | Self::MalformedLine { path, .. } => Some(path),
            Self::InvalidOrganization { .. } | Self::OrganizationTooWide { .. } => None,
        }
    }
}
