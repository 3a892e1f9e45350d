//! Numbered text outline of a document, for asking an external text
//! generator which spans look like fillable fields.

use std::collections::HashMap;
use std::fmt::Write as _;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::xml::{Element, Node, W_NS};

/// One numbered element with text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// 1-based position of the element in document order, counting the root,
    /// every element without text, and comments and processing instructions.
    pub index: usize,
    /// Trimmed text of the element and everything below it.
    pub text: String,
}

/// Number `el` and its subtree in pre-order. Comments and processing
/// instructions take a number too, but are never reported.
fn number<'a>(el: &'a Element, next: &mut usize, out: &mut Vec<(usize, &'a Element)>) {
    *next += 1;
    out.push((*next, el));
    for node in &el.children {
        match node {
            Node::Element(child) => number(child, next, out),
            Node::Comment(_) | Node::ProcessingInstruction(_) => *next += 1,
            Node::Text(_) => {}
        }
    }
}

fn number_mut<F>(el: &mut Element, next: &mut usize, f: &mut F)
where
    F: FnMut(usize, &mut Element),
{
    *next += 1;
    f(*next, el);
    for node in el.children.iter_mut() {
        match node {
            Node::Element(child) => number_mut(child, next, f),
            Node::Comment(_) | Node::ProcessingInstruction(_) => *next += 1,
            Node::Text(_) => {}
        }
    }
}

/// Every element with non-empty text, numbered in document order.
///
/// Parents repeat the text of their children, so the list reads from the
/// whole document down to single runs. Comment text is not element text.
pub fn outline(root: &Element) -> Vec<OutlineEntry> {
    let mut numbered = Vec::new();
    number(root, &mut 0, &mut numbered);
    numbered
        .into_iter()
        .filter_map(|(index, el)| {
            let text = el.text_content();
            let text = text.trim();
            (!text.is_empty()).then(|| OutlineEntry {
                index,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Render an outline as a prompt asking which entries are editable fields.
pub fn suggestion_prompt(entries: &[OutlineEntry]) -> String {
    let mut prompt = String::from("These are the elements found in the Word document:\n");
    for entry in entries {
        let _ = writeln!(prompt, "{}. {}", entry.index, entry.text);
    }
    prompt.push_str(
        "\nList the fields of this document that are likely meant to be edited, \
         one per line, using the numbers above.\n",
    );
    prompt
}

/// Set every `w:t` inside each selected element (the element itself
/// included) to the chosen text. Keys are outline indices; blank values are
/// skipped. Returns the number of text elements changed.
pub fn apply_outline_replacements(root: &mut Element, replacements: &HashMap<usize, String>) -> usize {
    let mut patched = 0;
    number_mut(root, &mut 0, &mut |index, el: &mut Element| {
        let Some(value) = replacements.get(&index).filter(|v| !v.trim().is_empty()) else {
            return;
        };
        el.walk_mut(&mut |node: &mut Element| {
            if node.name.is(W_NS, "t") {
                node.set_text(value.as_str());
                patched += 1;
            }
        });
        debug!("outline entry {} set to '{}'", index, value);
    });
    patched
}
