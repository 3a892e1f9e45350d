//! Build an element tree from XML bytes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;

use super::encoding::decode_xml_bytes;
use super::tree::{Attribute, Document, Element, NamespaceDecl, Node, QName};
use super::XML_NS;
use crate::error::{Error, Result};

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedMarkup(msg.into())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| malformed(e.to_string()))
}

/// Turn a resolution result into an owned namespace URI.
///
/// The `xml` prefix is always bound, even if the reader does not know it.
fn namespace_of(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => utf8(ns.as_ref()).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NS.to_string())),
        ResolveResult::Unknown(prefix) => Err(malformed(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn start_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element> {
    let name = start.name();
    let mut element = Element::new(QName {
        namespace,
        local: utf8(name.local_name().as_ref())?,
    });
    element.prefix = name.prefix().map(|p| utf8(p.as_ref())).transpose()?;

    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();

        if let Some(binding) = attr.key.as_namespace_binding() {
            let prefix = match binding {
                PrefixDeclaration::Default => None,
                PrefixDeclaration::Named(prefix) => Some(utf8(prefix)?),
            };
            element.namespaces.push(NamespaceDecl { prefix, uri: value });
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        let name = QName {
            namespace: namespace_of(resolved)?,
            local: utf8(local.as_ref())?,
        };
        if element
            .attribute(name.namespace.as_deref(), &name.local)
            .is_some()
        {
            return Err(malformed(format!("duplicate attribute {}", name)));
        }
        element.set_attribute(Attribute {
            name,
            prefix: attr.key.prefix().map(|p| utf8(p.as_ref())).transpose()?,
            value,
        });
    }

    Ok(element)
}

/// Place a finished element under its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(malformed("more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> Result<()> {
    let Some(parent) = stack.last_mut() else {
        if text.chars().all(char::is_whitespace) {
            return Ok(());
        }
        return Err(malformed("text outside the root element"));
    };
    // CDATA sections split text into several events.
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(&text);
    } else {
        parent.children.push(Node::Text(text));
    }
    Ok(())
}

/// Comments and processing instructions go to the open element, or around
/// the root when no element is open.
fn push_misc(
    stack: &mut [Element],
    after_root: bool,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
    node: Node,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if after_root => epilog.push(node),
        None => prolog.push(node),
    }
}

/// Parse XML bytes into a [`Document`].
pub fn parse(bytes: &[u8]) -> Result<Document> {
    let xml = decode_xml_bytes(bytes)?;
    let mut reader = NsReader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut standalone = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(resolved)?;

        match event {
            Event::Decl(decl) => {
                if let Some(value) = decl.standalone() {
                    let value = value.map_err(|e| malformed(e.to_string()))?;
                    standalone = Some(utf8(&value)?);
                }
            }
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(malformed("more than one root element"));
                }
                stack.push(start_element(&reader, &start, namespace)?);
            }
            Event::Empty(start) => {
                let element = start_element(&reader, &start, namespace)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("closing tag without an open element"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| malformed(e.to_string()))?
                    .into_owned();
                push_text(&mut stack, text)?;
            }
            Event::CData(data) => {
                push_text(&mut stack, utf8(&data.into_inner())?)?;
            }
            Event::Comment(comment) => {
                let node = Node::Comment(utf8(&comment.into_inner())?);
                push_misc(&mut stack, root.is_some(), &mut prolog, &mut epilog, node);
            }
            Event::PI(pi) => {
                let node = Node::ProcessingInstruction(utf8(&pi)?);
                push_misc(&mut stack, root.is_some(), &mut prolog, &mut epilog, node);
            }
            Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element {}", open.name)));
    }
    let root = root.ok_or_else(|| malformed("no root element"))?;

    Ok(Document {
        standalone,
        prolog,
        root,
        epilog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::W_NS;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r>
        <w:rPr><w:shd w:val="clear" w:color="auto" w:fill="FFFF00"/></w:rPr>
        <w:t xml:space="preserve"> Client &amp; Name </w:t>
      </w:r>
    </w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let doc = parse(DOC.as_bytes()).unwrap();
        assert_eq!(doc.standalone.as_deref(), Some("yes"));
        assert!(doc.root.name.is(W_NS, "document"));
        assert_eq!(doc.root.prefix.as_deref(), Some("w"));
        assert_eq!(doc.root.namespaces.len(), 1);

        let shd = doc.root.find(W_NS, "shd").unwrap();
        assert_eq!(shd.attribute(Some(W_NS), "fill"), Some("FFFF00"));
        assert_eq!(shd.attribute(None, "fill"), None);

        let t = doc.root.find(W_NS, "t").unwrap();
        assert_eq!(t.attribute(Some(XML_NS), "space"), Some("preserve"));
        assert_eq!(t.text_content(), " Client & Name ");
    }

    #[test]
    fn test_prefix_is_not_identity() {
        let other = DOC.replace("w:", "word:").replace("xmlns:w=", "xmlns:word=");
        let a = parse(DOC.as_bytes()).unwrap();
        let b = parse(other.as_bytes()).unwrap();
        assert_eq!(b.root.prefix.as_deref(), Some("word"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_nodes_around_root() {
        let doc = parse(
            br#"<?xml version="1.0"?><?mso-application progid="Word.Document"?><a><!--in--></a><!--tail-->"#,
        )
        .unwrap();
        assert_eq!(
            doc.prolog,
            [Node::ProcessingInstruction(
                r#"mso-application progid="Word.Document""#.to_string()
            )]
        );
        assert_eq!(doc.root.children, [Node::Comment("in".to_string())]);
        assert_eq!(doc.epilog, [Node::Comment("tail".to_string())]);
    }

    #[test]
    fn test_cdata_merges_with_text() {
        let doc = parse(b"<a>one <![CDATA[<two>]]> three</a>").unwrap();
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.text_content(), "one <two> three");
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in [
            "<a><b></a>",
            "<a>",
            "",
            "<a/><b/>",
            "<x:a/>",
            "<a p='1' p='2'/>",
            "<a xmlns:x='u' xmlns:y='u' x:p='1' y:p='2'/>",
            "<a/>trailing",
            "<a>&undefined;</a>",
        ] {
            let result = parse(bad.as_bytes());
            assert!(
                matches!(result, Err(Error::MalformedMarkup(_))),
                "expected MalformedMarkup for {:?}, got {:?}",
                bad,
                result
            );
        }
    }
}
