//! Highlighted fields in WordprocessingML documents.
//!
//! A field is a run (`w:r`) whose run properties carry a shading fill,
//! the way template authors mark the spans someone has to fill in:
//!
//! ```xml
//! <w:r>
//!   <w:rPr><w:shd w:val="clear" w:color="auto" w:fill="FFFF00"/></w:rPr>
//!   <w:t>Client Name</w:t>
//! </w:r>
//! ```

mod patch;
mod scan;

pub use patch::{apply_replacements, apply_run_replacements};
pub use scan::{highlighted_fields, highlighted_runs, HighlightedRun, RunId};

use crate::xml::{Element, Node, W_NS};

/// Fill values that mean "no visible highlight".
pub const NO_FILL: [&str; 2] = ["auto", "clear"];

/// Whether a `w:fill` value marks a highlighted run.
pub fn is_highlight_fill(fill: Option<&str>) -> bool {
    match fill {
        Some(value) => !value.is_empty() && !NO_FILL.contains(&value),
        None => false,
    }
}

/// The `w:fill` of the first `w:shd` under a `w:rPr` of this run.
fn shading_fill(run: &Element) -> Option<&str> {
    run.descendants()
        .filter(|el| el.name.is(W_NS, "rPr"))
        .find_map(|rpr| rpr.child(W_NS, "shd"))
        .and_then(|shd| shd.attribute(Some(W_NS), "fill"))
}

/// Trimmed text of a highlighted run, `None` if the run is not highlighted
/// or has no text.
pub(crate) fn field_text(run: &Element) -> Option<String> {
    if !is_highlight_fill(shading_fill(run)) {
        return None;
    }
    let text = run.find(W_NS, "t")?.text_content();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_run(el: &Element) -> bool {
    el.name.is(W_NS, "r")
}

/// Runs below `root` in document order.
pub(crate) fn runs(root: &Element) -> impl Iterator<Item = &Element> {
    root.descendants().filter(|el| is_run(el))
}

/// Visit every run below `root` in document order, mutably.
pub(crate) fn for_each_run_mut<F>(root: &mut Element, f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in root.children.iter_mut() {
        if let Node::Element(child) = node {
            if is_run(child) {
                f(child);
            }
            for_each_run_mut(child, f);
        }
    }
}
