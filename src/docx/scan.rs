//! Extracting highlighted fields.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{field_text, runs};
use crate::xml::Element;

/// Position of a highlighted run among all highlighted runs with text, in
/// document order. Stable as long as the tree is not modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub usize);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One highlighted run and its trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedRun {
    pub id: RunId,
    pub text: String,
}

/// Every highlighted run with non-empty text, duplicates included.
pub fn highlighted_runs(root: &Element) -> Vec<HighlightedRun> {
    runs(root)
        .filter_map(field_text)
        .enumerate()
        .map(|(index, text)| HighlightedRun {
            id: RunId(index),
            text,
        })
        .collect()
}

/// Distinct highlighted fragments in first-seen document order.
///
/// ```
/// use docfill::xml::Document;
///
/// let doc = Document::parse(br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p>
///   <w:r><w:rPr><w:shd w:fill="FFFF00"/></w:rPr><w:t> Client Name </w:t></w:r>
///   <w:r><w:t>Invoice</w:t></w:r>
/// </w:p></w:body></w:document>"#)?;
/// assert_eq!(docfill::docx::highlighted_fields(&doc.root), ["Client Name"]);
/// # Ok::<(), docfill::Error>(())
/// ```
pub fn highlighted_fields(root: &Element) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for text in runs(root).filter_map(field_text) {
        if !fields.contains(&text) {
            debug!("highlighted field: {}", text);
            fields.push(text);
        }
    }
    fields
}
