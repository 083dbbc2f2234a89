//! Error types surfaced by the library.

use thiserror::Error;

/// Failures of the archive reader
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a valid ZIP file")]
    NotAnArchive,

    #[error("malformed {0}")]
    Malformed(&'static str),

    #[error("truncated archive structure")]
    Truncated(#[from] std::io::Error),

    #[error("central directory at {offset}+{size} lies outside a {archive_size} byte archive")]
    DirectoryOutOfBounds {
        offset: u64,
        size: u64,
        archive_size: u64,
    },

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("unsupported compression method {method} for {path}")]
    UnsupportedCompression { path: String, method: u16 },

    #[error("corrupt data in {path}")]
    Corrupt {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive data")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ArchiveError {
    pub(crate) fn read(err: anyhow::Error) -> Self {
        Self::Read(err.into())
    }
}

/// A presentation could not be loaded for analysis
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {label}")]
    Open {
        label: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot parse {label}")]
    Parse {
        label: String,
        #[source]
        source: ArchiveError,
    },
}

impl LoadError {
    /// The one message shown to the user for any load failure.
    pub const USER_MESSAGE: &'static str = "Error parsing file. Ensure it is a valid .pptx";
}

/// Content for a preview could not be produced
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no presentation is loaded")]
    NoSession,

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
