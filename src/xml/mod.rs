//! Namespace-aware markup tree.
//!
//! Parts are parsed into an owned [`Document`] whose elements are identified
//! by (namespace URI, local name). Prefixes and namespace declarations are
//! kept only so the tree can be written back the way it was read.
//!
//! ```
//! use docfill::xml::{Document, W_NS};
//!
//! let doc = Document::parse(br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#)?;
//! assert!(doc.root.child(W_NS, "body").is_some());
//! let bytes = doc.serialize()?;
//! assert_eq!(Document::parse(&bytes)?, doc);
//! # Ok::<(), docfill::Error>(())
//! ```

mod encoding;
mod reader;
mod tree;
mod writer;

pub use encoding::decode_xml_bytes;
pub use reader::parse;
pub use tree::{Attribute, Descendants, Document, Element, NamespaceDecl, Node, QName};
pub use writer::{serialize, DEFAULT_INDENT};

use crate::error::Result;

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Namespace permanently bound to the `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parse part bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        parse(bytes)
    }

    /// Serialize with the default indentation.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self, DEFAULT_INDENT)
    }

    /// Serialize with `indent` spaces per level (0 for no pretty-printing).
    pub fn serialize_with_indent(&self, indent: usize) -> Result<Vec<u8>> {
        serialize(self, indent)
    }
}
