//! Pretty-printing serializer for element trees.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{Document, Element, Node};
use crate::error::Result;

/// Default indentation width in spaces.
pub const DEFAULT_INDENT: usize = 2;

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

/// Escape an attribute value. Tab, line feed and carriage return become
/// character references.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

/// Escape character data. A literal `\r` would be read back as `\n`.
fn escape_text(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains('\r') {
        return escaped;
    }
    Cow::Owned(escaped.replace('\r', "&#13;"))
}

fn push_attribute(start: &mut BytesStart<'_>, key: &str, value: &str) {
    let value = escape_attribute(value);
    start.push_attribute((key.as_bytes(), value.as_bytes()));
}

fn write_misc(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
        }
        Node::ProcessingInstruction(pi) => {
            writer.write_event(Event::PI(BytesPI::new(pi.as_str())))?
        }
        _ => {}
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let name = qualified(element.prefix.as_deref(), &element.name.local);
    let mut start = BytesStart::new(name.as_str());

    for decl in &element.namespaces {
        let key = match &decl.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        push_attribute(&mut start, &key, &decl.uri);
    }
    for attr in element.attributes() {
        let key = qualified(attr.prefix.as_deref(), &attr.name.local);
        push_attribute(&mut start, &key, &attr.value);
    }

    let children: Vec<&Node> = element.significant_children().collect();
    if children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in children {
        match child {
            Node::Element(el) => write_element(writer, el)?,
            Node::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?
            }
            misc => write_misc(writer, misc)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

/// Serialize a document as indented UTF-8 with an XML declaration.
///
/// Text inside elements without child elements is written verbatim; only
/// whitespace between elements is generated.
pub fn serialize(document: &Document, indent: usize) -> Result<Vec<u8>> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };

    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        document.standalone.as_deref(),
    )))?;
    if indent == 0 {
        writer.get_mut().push(b'\n');
    }
    for node in &document.prolog {
        write_misc(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;
    for node in &document.epilog {
        write_misc(&mut writer, node)?;
    }

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}
