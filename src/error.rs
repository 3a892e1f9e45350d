//! Error types for the docfill library.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage at which a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unpacking the source container.
    Expand,
    /// Reading the main document part.
    ReadPart,
    /// Parsing the document markup.
    Parse,
    /// Serializing the patched markup.
    Serialize,
    /// Writing the main document part back.
    WritePart,
    /// Building the output container.
    Repackage,
    /// Asking the collaborator for replacement values.
    Collect,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Expand => "expand",
            Stage::ReadPart => "read part",
            Stage::Parse => "parse",
            Stage::Serialize => "serialize",
            Stage::WritePart => "write part",
            Stage::Repackage => "repackage",
            Stage::Collect => "collect replacements",
        };
        f.write_str(name)
    }
}

/// Coarse error taxonomy used by callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing input container or missing required part.
    NotFound,
    /// The markup could not be parsed.
    MalformedMarkup,
    /// Any filesystem read/write or archive error.
    IoFailure,
}

/// Errors that can occur while extracting or patching a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container, or a part inside it, does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error reading or writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    Archive(String),

    /// The part is not well-formed XML.
    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    /// A session stage failed.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::MalformedMarkup(_) => ErrorKind::MalformedMarkup,
            Error::Io(_) | Error::Archive(_) => ErrorKind::IoFailure,
            Error::Stage { source, .. } => source.kind(),
        }
    }

    /// The stage this error was raised in, if it came out of a session.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn at(self, stage: Stage) -> Self {
        match self {
            err @ Error::Stage { .. } => err,
            err => Error::Stage {
                stage,
                source: Box::new(err),
            },
        }
    }
}

/// Attach a pipeline stage to a fallible result.
pub(crate) trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.at(stage))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}
