//! Taxonomy path extraction and display-label construction.
//!
//! The reference page is treated as unstructured text: any
//! `snowflake-site:taxonomy/...` run of path characters counts as a path.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use guidegen_shared::{CategoryMap, TaxonomyPath};
use regex::Regex;

/// Matches a taxonomy path anywhere in a document.
static TAXONOMY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"snowflake-site:taxonomy/[A-Za-z0-9/\-_.]+").expect("taxonomy regex")
});

/// Collect every distinct taxonomy path mentioned in `text`.
///
/// Trailing `.` and `/` are trimmed so sentence punctuation does not leak into
/// the path.
pub(crate) fn extract_taxonomy_paths(text: &str) -> BTreeSet<TaxonomyPath> {
    TAXONOMY_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', '/']))
        .filter(|p| p.len() > guidegen_shared::TAXONOMY_PREFIX.len())
        .map(TaxonomyPath::new)
        .collect()
}

/// Build the label → path map.
///
/// Paths are visited in sorted order. The label is the last segment, title-cased
/// with hyphens as spaces; a label already taken gets qualified with its parent
/// segment (`"Parent: Label"`), walking further up the path until it is unique.
pub(crate) fn build_category_map(paths: &BTreeSet<TaxonomyPath>) -> CategoryMap {
    let mut by_label: BTreeMap<String, TaxonomyPath> = BTreeMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for path in paths {
        let label = unique_label(path, &seen);
        seen.insert(label.clone());
        by_label.insert(label, path.clone());
    }

    CategoryMap::from_entries(by_label)
}

fn unique_label(path: &TaxonomyPath, seen: &HashSet<String>) -> String {
    let segments = path.segments();
    let Some((tail, parents)) = segments.split_last() else {
        return path.to_string();
    };

    let mut label = display_segment(tail);
    // Skip the `snowflake-site:taxonomy` head when qualifying.
    let mut parents = parents.iter().skip(1).rev();
    while seen.contains(&label) {
        match parents.next() {
            Some(parent) => label = format!("{}: {label}", display_segment(parent)),
            None => return path.to_string(),
        }
    }
    label
}

/// `streams-tasks` → `Streams Tasks`.
fn display_segment(segment: &str) -> String {
    title_case(&segment.replace('-', " "))
}

/// Upper-case the first letter of every word and lower-case the rest, where a
/// word starts after any non-alphabetic character.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
