//! Writing replacement text into highlighted runs.

use std::collections::HashMap;

use log::debug;

use super::{field_text, for_each_run_mut, RunId};
use crate::xml::{Element, W_NS};

/// Values made only of whitespace never replace a field.
fn usable(value: &str) -> bool {
    !value.trim().is_empty()
}

fn replace_run_text(run: &mut Element, value: &str) -> bool {
    match run.find_mut(W_NS, "t") {
        Some(t) => {
            t.set_text(value);
            true
        }
        None => false,
    }
}

/// Replace the text of every highlighted run whose trimmed text is a key of
/// `replacements`. Returns the number of runs changed.
///
/// All runs sharing the same text get the same value. Values are written as
/// given, without trimming, and are not themselves looked up again.
pub fn apply_replacements(root: &mut Element, replacements: &HashMap<String, String>) -> usize {
    if replacements.is_empty() {
        return 0;
    }
    let mut patched = 0;
    for_each_run_mut(root, &mut |run: &mut Element| {
        let Some(original) = field_text(run) else {
            return;
        };
        let Some(value) = replacements.get(&original).filter(|v| usable(v)) else {
            return;
        };
        if replace_run_text(run, value) {
            debug!("replaced '{}' with '{}'", original, value);
            patched += 1;
        }
    });
    patched
}

/// Replace highlighted runs by position rather than by text, so two fields
/// that happen to share the same text can be filled independently.
///
/// Ids are the ones reported by [`highlighted_runs`](super::highlighted_runs)
/// for the unmodified tree.
pub fn apply_run_replacements(root: &mut Element, replacements: &HashMap<RunId, String>) -> usize {
    let mut next = 0;
    let mut patched = 0;
    for_each_run_mut(root, &mut |run: &mut Element| {
        let Some(original) = field_text(run) else {
            return;
        };
        let id = RunId(next);
        next += 1;
        let Some(value) = replacements.get(&id).filter(|v| usable(v)) else {
            return;
        };
        if replace_run_text(run, value) {
            debug!("replaced run {} '{}' with '{}'", id, original, value);
            patched += 1;
        }
    });
    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fixtures::{document, run};
    use crate::docx::{highlighted_fields, highlighted_runs};
    use crate::xml::Document;

    fn parse(body: &str) -> Document {
        Document::parse(document(body).as_bytes()).unwrap()
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.root
            .descendants()
            .filter(|el| el.name.is(W_NS, "t"))
            .map(|t| t.text_content())
            .collect()
    }

    #[test]
    fn test_empty_map_changes_nothing() {
        let mut doc = parse(&[run("Client Name", Some("FFFF00")), run("Invoice", None)].concat());
        let before = doc.serialize().unwrap();
        assert_eq!(apply_replacements(&mut doc.root, &HashMap::new()), 0);
        assert_eq!(doc.serialize().unwrap(), before);
    }

    #[test]
    fn test_only_matching_runs_change() {
        let mut doc = parse(
            &[
                run(" Client Name ", Some("FFFF00")),
                run("Client Name", None),
                run("Date", Some("FFFF00")),
                run("Client Name", Some("00FFFF")),
            ]
            .concat(),
        );
        let original = doc.clone();
        let patched = apply_replacements(
            &mut doc.root,
            &map(&[("Client Name", "Acme Corp"), ("Unrelated", "zzz")]),
        );

        assert_eq!(patched, 2);
        assert_eq!(
            texts(&doc),
            ["Acme Corp", "Client Name", "Date", "Acme Corp"]
        );
        // Formatting is untouched.
        let shd_before: Vec<_> = original.root.descendants().filter(|e| e.name.is(W_NS, "shd")).cloned().collect();
        let shd_after: Vec<_> = doc.root.descendants().filter(|e| e.name.is(W_NS, "shd")).cloned().collect();
        assert_eq!(shd_before, shd_after);
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let mut doc = parse(&[run("Name", Some("FFFF00")), run("Date", Some("FFFF00"))].concat());
        let patched = apply_replacements(&mut doc.root, &map(&[("Name", ""), ("Date", "  \t")]));
        assert_eq!(patched, 0);
        assert_eq!(texts(&doc), ["Name", "Date"]);
    }

    #[test]
    fn test_value_written_untrimmed() {
        let mut doc = parse(&run("Name", Some("FFFF00")));
        apply_replacements(&mut doc.root, &map(&[("Name", " Ada Lovelace ")]));
        assert_eq!(texts(&doc), [" Ada Lovelace "]);
    }

    #[test]
    fn test_no_recursive_substitution() {
        let mut doc = parse(&[run("A", Some("FFFF00")), run("B", Some("FFFF00"))].concat());
        let replacements = map(&[("A", "B"), ("B", "C")]);
        apply_replacements(&mut doc.root, &replacements);
        assert_eq!(texts(&doc), ["B", "C"]);

        // A second pass continues the chain; that is the documented limit.
        apply_replacements(&mut doc.root, &replacements);
        assert_eq!(texts(&doc), ["C", "C"]);
    }

    #[test]
    fn test_reapplying_is_idempotent_without_chains() {
        let mut doc = parse(&run("Client Name", Some("FFFF00")));
        let replacements = map(&[("Client Name", "Acme Corp")]);
        apply_replacements(&mut doc.root, &replacements);
        let once = doc.serialize().unwrap();
        assert_eq!(apply_replacements(&mut doc.root, &replacements), 0);
        assert_eq!(doc.serialize().unwrap(), once);
        assert_eq!(highlighted_fields(&doc.root), ["Acme Corp"]);
    }

    #[test]
    fn test_positional_replacement_splits_duplicates() {
        let mut doc = parse(
            &[
                run("Name", Some("FFFF00")),
                run("Invoice", None),
                run("Name", Some("FFFF00")),
            ]
            .concat(),
        );
        let ids: Vec<_> = highlighted_runs(&doc.root).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, [RunId(0), RunId(1)]);

        let replacements: HashMap<_, _> = [(RunId(1), "Grace".to_string())].into_iter().collect();
        assert_eq!(apply_run_replacements(&mut doc.root, &replacements), 1);
        assert_eq!(texts(&doc), ["Name", "Invoice", "Grace"]);
    }
}
