//! Checks a rendered guide the way the publishing CI does.
//!
//! Rules are an ordered table; every rule runs regardless of the others, so one
//! document can report several issues. Issues are advisory and never stop the
//! pipeline.

use std::fmt;
use std::sync::LazyLock;

use guidegen_shared::{Language, TAXONOMY_PREFIX};
use regex::Regex;
use serde::Serialize;

/// The `language:` header must appear within this many lines.
const LANGUAGE_WINDOW: usize = 50;

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*language:[ \t]*(.+)$").expect("language regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*id:[ \t]*(.+)$").expect("id regex"));
static CATEGORIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*categories:[ \t]*(.+)$").expect("categories regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    Language,
    Id,
    Categories,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

struct Rule {
    kind: IssueKind,
    check: fn(text: &str, expected_id: &str) -> Option<String>,
}

const RULES: &[Rule] = &[
    Rule {
        kind: IssueKind::Language,
        check: check_language,
    },
    Rule {
        kind: IssueKind::Id,
        check: check_id,
    },
    Rule {
        kind: IssueKind::Categories,
        check: check_categories,
    },
];

/// Run every rule against `text`. An empty result means the document passes.
pub fn validate(text: &str, expected_id: &str) -> Vec<ValidationIssue> {
    RULES
        .iter()
        .filter_map(|rule| {
            (rule.check)(text, expected_id).map(|message| ValidationIssue {
                kind: rule.kind,
                message,
            })
        })
        .collect()
}

/// Trimmed value of the first line matching `re`, or empty.
fn header_value(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn check_language(text: &str, _expected_id: &str) -> Option<String> {
    let head: Vec<&str> = text.lines().take(LANGUAGE_WINDOW).collect();
    let head = head.join("\n");

    let value = header_value(&LANGUAGE_RE, &head);
    let value = value.trim_matches(|c| c == '\'' || c == '"');

    match Language::from_code(value) {
        Some(_) => None,
        None => Some(format!(
            "language must be one of {} and in first {LANGUAGE_WINDOW} lines (found \"{value}\")",
            Language::allowed_codes()
        )),
    }
}

fn check_id(text: &str, expected_id: &str) -> Option<String> {
    let found = header_value(&ID_RE, text);
    (found != expected_id.trim()).then(|| {
        format!("id must match folder/file name \"{expected_id}\" (found \"{found}\")")
    })
}

fn check_categories(text: &str, _expected_id: &str) -> Option<String> {
    let line = header_value(&CATEGORIES_RE, text);
    if line.is_empty() {
        return Some("categories must be set (comma-separated taxonomy paths)".to_string());
    }

    let paths: Vec<&str> = line
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if paths.is_empty() || paths.iter().any(|p| !p.starts_with(TAXONOMY_PREFIX)) {
        return Some(format!(
            "categories must be comma-separated taxonomy paths (e.g., {TAXONOMY_PREFIX}solution-center/certification/quickstart)"
        ));
    }
    None
}
