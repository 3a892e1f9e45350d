//! # docfill
//!
//! Fill in highlighted fields of Word documents.
//!
//! Template authors mark the spans someone has to complete with a shading
//! fill. This library finds those spans, takes replacement text for them and
//! writes a new `.docx` with every other part copied unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! // List the highlighted fields
//! let fields = docfill::extract_fields("template.docx")?;
//! println!("{:?}", fields);
//!
//! // Fill them in and write a new document
//! let mut values = HashMap::new();
//! values.insert("Client Name".to_string(), "Acme Corp".to_string());
//! docfill::fill("template.docx", "filled.docx", &values)?;
//! # Ok::<(), docfill::Error>(())
//! ```
//!
//! ## Sessions
//!
//! ```no_run
//! use docfill::{Session, SessionOptions};
//!
//! let mut session = Session::open("template.docx", SessionOptions::default())?;
//! for run in session.runs() {
//!     println!("{} {}", run.id, run.text);
//! }
//! session.save("copy.docx")?;
//! # Ok::<(), docfill::Error>(())
//! ```
//!
//! The lower-level pieces ([`archive`], [`part`], [`xml`], [`docx`]) can be
//! used on their own.

pub mod archive;
pub mod docx;
pub mod error;
pub mod options;
pub mod outline;
pub mod part;
pub mod session;
pub mod xml;

// Re-exports
pub use docx::{HighlightedRun, RunId};
pub use error::{Error, ErrorKind, Result, Stage};
pub use options::{Compression, SessionOptions};
pub use outline::OutlineEntry;
pub use session::{ReplacementSource, Session};

use std::collections::HashMap;
use std::path::Path;

/// List the distinct highlighted fields of a document.
///
/// # Example
///
/// ```no_run
/// let fields = docfill::extract_fields("template.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub fn extract_fields(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let session = Session::open(path, SessionOptions::default())?;
    Ok(session.fields())
}

/// Replace highlighted fields and write the result to `output`.
///
/// Returns the number of runs changed.
pub fn fill(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    replacements: &HashMap<String, String>,
) -> Result<usize> {
    fill_with_options(input, output, replacements, SessionOptions::default())
}

/// Like [`fill`], with explicit session options.
pub fn fill_with_options(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    replacements: &HashMap<String, String>,
    options: SessionOptions,
) -> Result<usize> {
    let mut session = Session::open(input, options)?;
    let patched = session.apply(replacements);
    session.save(output)?;
    Ok(patched)
}
