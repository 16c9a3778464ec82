//! `<img>` → Markdown image rewriting.
//!
//! Form inputs often carry pasted HTML images; the published guide format wants
//! Markdown images instead. Everything other than `<img ... src=...>` is left
//! exactly as written.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A whole `<img ...>` tag (optionally self-closing).
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("img tag regex"));

/// A quoted `alt` or `src` attribute inside a tag.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)(alt|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attr regex")
});

/// Rewrite `<img alt="A" src="S">` as `![A](S)` and `<img src="S">` as `![](S)`.
///
/// Attribute order is irrelevant. Tags without a non-empty `src` are kept.
pub fn convert_img_tags(text: &str) -> Cow<'_, str> {
    IMG_TAG_RE.replace_all(text, |caps: &Captures| {
        let tag = &caps[0];
        let mut alt = None;
        let mut src = None;

        for attr in ATTR_RE.captures_iter(tag) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if attr[1].eq_ignore_ascii_case("src") {
                src.get_or_insert(value);
            } else {
                alt.get_or_insert(value);
            }
        }

        match src {
            Some(src) if !src.is_empty() => format!("![{}]({src})", alt.unwrap_or_default()),
            _ => tag.to_string(),
        }
    })
}
