//! Session configuration.

use std::path::PathBuf;

use crate::part::DOCUMENT_PART;
use crate::xml::DEFAULT_INDENT;

/// Compression applied to entries of the output container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Deflate every entry
    #[default]
    Deflated,
    /// Store entries uncompressed
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Options for a document-edit session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Part holding the main document content
    pub document_part: String,

    /// Directory to expand the container into. `None` allocates a temporary
    /// directory that is removed when the session ends; a given directory is
    /// left on disk.
    pub workdir: Option<PathBuf>,

    /// Spaces per nesting level when serializing the patched part
    pub indent: usize,

    /// Compression of the output container
    pub compression: Compression,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            document_part: DOCUMENT_PART.to_string(),
            workdir: None,
            indent: DEFAULT_INDENT,
            compression: Compression::Deflated,
        }
    }
}

impl SessionOptions {
    /// Create new session options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main document part.
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.document_part = part.into();
        self
    }

    /// Expand into a caller-owned directory that is kept afterwards.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Set the serializer indentation, capped at 8 spaces.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.min(8);
        self
    }

    /// Set output compression.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}
