use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Coarse classification used when reporting errors to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed replacement map or destination path.
    Configuration,
    /// A single column value could not be decoded.
    Decode,
    /// A backing table could not be subscribed or disconnected.
    Source,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid destination path `{path}`: {reason}")]
    InvalidDestination { path: String, reason: String },

    #[error("column replacement map references unknown table `{table}`")]
    UnknownTable { table: String },

    #[error("failed to decode column `{column}`: {reason}")]
    Decode { column: String, reason: String },

    #[error("table `{table}` source error: {reason}")]
    Source { table: String, reason: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ChartError {
    pub(crate) fn destination(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(column: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            column: column.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn source(table: &str, reason: impl Into<String>) -> Self {
        Self::Source {
            table: table.to_owned(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDestination { .. } | Self::UnknownTable { .. } | Self::InvalidData(_) => {
                ErrorKind::Configuration
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Source { .. } => ErrorKind::Source,
        }
    }
}
