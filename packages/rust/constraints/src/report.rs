//! Human-readable reports for constraint violations.

use std::fmt::Write;

use crate::rules::ALTERNATIVES;
use crate::{LineViolation, Violation};

const RULE_WIDE: usize = 70;
const RULE_NARROW: usize = 50;

/// Alternatives for every violated feature family, first occurrence wins.
pub fn alternative_suggestions(violations: &[Violation]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();

    for (keywords, suggestions) in ALTERNATIVES {
        let hit = violations
            .iter()
            .any(|v| keywords.iter().any(|k| v.feature.contains(k)));
        if !hit {
            continue;
        }
        for suggestion in *suggestions {
            if !out.contains(suggestion) {
                out.push(*suggestion);
            }
        }
    }

    out
}

/// Full failure report for an infeasible feature request.
pub fn failure_report(violations: &[Violation], description: &str) -> String {
    let rule = "=".repeat(RULE_WIDE);
    let mut lines: Vec<String> = vec![
        rule.clone(),
        "TEMPLATE GENERATION FAILED: Learning Environment Constraints".into(),
        rule.clone(),
        String::new(),
        format!("REQUESTED FEATURE: {description}"),
        String::new(),
        "DETECTED CONSTRAINT VIOLATIONS:".into(),
    ];
    lines.extend(violations.iter().map(|v| format!("- {}: {}", v.feature, v.reason)));
    lines.push(String::new());

    lines.extend(
        [
            "WHY THIS FAILS:",
            "The Snowflake Learning Environment has restricted privileges that only",
            "allow schema-level operations within a single account. Features requiring",
            "account-level privileges, external integrations, or multiple accounts",
            "cannot be demonstrated meaningfully.",
            "",
        ]
        .map(String::from),
    );

    let alternatives = alternative_suggestions(violations);
    if !alternatives.is_empty() {
        lines.push("SUGGESTED ALTERNATIVE FEATURES:".into());
        lines.extend(alternatives.iter().map(|alt| format!("- {alt}")));
        lines.push(String::new());
    }

    lines.extend(
        [
            "LEARNING RESOURCES:",
            "For production setup of this feature, refer to:",
            "- Snowflake Documentation: https://docs.snowflake.com/",
            "- Snowflake University: https://university.snowflake.com/",
            "- Community Forums: https://community.snowflake.com/",
            "",
            "TEMPLATE DEVELOPMENT GUIDANCE:",
            "Consider creating templates for features that:",
            "- Work within schema-level constraints",
            "- Use only learning environment privileges",
            "- Require no external dependencies",
            "- Can be completed in under 5 minutes",
        ]
        .map(String::from),
    );
    lines.push(rule);

    lines.join("\n")
}

/// Listing of SQL line violations, or a one-line all-clear.
pub fn sql_report(violations: &[LineViolation]) -> String {
    if violations.is_empty() {
        return "No SQL constraint violations detected".to_string();
    }

    let mut out = String::from("SQL CONSTRAINT VIOLATIONS DETECTED:\n");
    out.push_str(&"=".repeat(RULE_NARROW));
    out.push('\n');
    for v in violations {
        let _ = writeln!(out, "Line {}: {}", v.line, v.message);
        let _ = writeln!(out, "  Code: {}", v.content);
        out.push('\n');
    }
    out
}
