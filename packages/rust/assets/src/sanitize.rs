//! Asset filename normalization.
//!
//! Convention: lowercase, underscores become hyphens, and only `[a-z0-9.-]`
//! survives. The name is always reduced to its base name first so an upload
//! can never address anything outside the assets directory.

use std::collections::HashSet;

/// Normalize a client-supplied filename.
///
/// Returns an empty string when nothing usable is left (including names made
/// only of dots, such as `..`). Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .to_lowercase()
        .replace('_', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        String::new()
    } else {
        cleaned
    }
}

/// Pick a name not yet in `used`: `name`, then `stem-2.ext`, `stem-3.ext`, ...
pub(crate) fn disambiguate(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };

    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(sanitize_filename("My_Diagram.PNG"), "my-diagram.png");
        assert_eq!(sanitize_filename("arch diagram (v2).svg"), "archdiagramv2.svg");
    }

    #[test]
    fn strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\shot_1.jpg"), "shot-1.jpg");
        assert_eq!(sanitize_filename("dir/"), "");
    }

    #[test]
    fn dot_only_names_are_empty() {
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("日本.."), "");
        assert_eq!(sanitize_filename("ßß"), "");
    }

    #[test]
    fn keeps_hidden_style_names_with_content() {
        assert_eq!(sanitize_filename(".env"), ".env");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for name in [
            "My_Diagram.PNG",
            "../x/Y_z.tar.gz",
            "ÄÖÜ_file.md",
            "..",
            "a b\tc",
            "--__--",
            "Straße_Ω.PNG",
            "",
        ] {
            let once = sanitize_filename(name);
            assert_eq!(sanitize_filename(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn disambiguate_appends_counter_before_extension() {
        let mut used = HashSet::new();
        assert_eq!(disambiguate("a.png", &used), "a.png");
        used.insert("a.png".to_string());
        assert_eq!(disambiguate("a.png", &used), "a-2.png");
        used.insert("a-2.png".to_string());
        assert_eq!(disambiguate("a.png", &used), "a-3.png");

        used.insert("readme".to_string());
        assert_eq!(disambiguate("readme", &used), "readme-2");
        used.insert(".env".to_string());
        assert_eq!(disambiguate(".env", &used), ".env-2");
    }
}
