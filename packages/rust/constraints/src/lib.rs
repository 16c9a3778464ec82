//! Learning-environment constraint checks.
//!
//! Two independent scans: a free-text feature request checked against the
//! forbidden-feature table, and SQL text checked line by line against the
//! forbidden-statement table. Neither touches the guide pipeline.

mod report;
mod rules;

use guidegen_shared::{GuideError, Result};
use serde::Serialize;
use tracing::debug;

pub use report::{alternative_suggestions, failure_report, sql_report};

/// A forbidden feature matched in a feature request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub feature: &'static str,
    pub reason: &'static str,
    pub pattern: &'static str,
}

/// A forbidden statement matched on one SQL line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineViolation {
    /// 1-based.
    pub line: usize,
    /// The trimmed line.
    pub content: String,
    pub message: &'static str,
}

/// Every feature rule matching `text`, in table order.
pub fn check(text: &str) -> Vec<Violation> {
    rules::FEATURE_RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| Violation {
            feature: rule.feature,
            reason: rule.reason,
            pattern: rule.source,
        })
        .collect()
}

/// Scan SQL line by line. Blank lines and `--` comment lines are skipped; a
/// line matching several rules yields one violation per rule.
pub fn check_sql(sql: &str) -> Vec<LineViolation> {
    let mut violations = Vec::new();

    for (idx, line) in sql.lines().enumerate() {
        let content = line.trim();
        if content.is_empty() || content.starts_with("--") {
            continue;
        }

        for rule in rules::SQL_RULES.iter() {
            if rule.pattern.is_match(content) {
                violations.push(LineViolation {
                    line: idx + 1,
                    content: content.to_string(),
                    message: rule.message,
                });
            }
        }
    }

    debug!(count = violations.len(), "sql scanned");
    violations
}

/// `Ok(())` when the request is feasible, otherwise an error carrying the full
/// failure report.
pub fn check_feature_compatibility(description: &str) -> Result<()> {
    let violations = check(description);
    if violations.is_empty() {
        return Ok(());
    }

    Err(GuideError::ConstraintViolation {
        report: failure_report(&violations, description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(text: &str) -> Vec<&'static str> {
        check(text).into_iter().map(|v| v.feature).collect()
    }

    #[test]
    fn feasible_requests_pass() {
        assert!(check("Build a dashboard with Streamlit and dynamic tables").is_empty());
        assert!(check_feature_compatibility("Time travel queries on a single table").is_ok());
    }

    #[test]
    fn matches_are_case_insensitive_and_ordered() {
        assert_eq!(
            features("Set up DATABASE REPLICATION with failover to another region"),
            vec!["Database Replication", "Failover/Disaster Recovery"]
        );
    }

    #[test]
    fn sharing_pattern_accepts_both_forms() {
        assert_eq!(features("data share with partners"), vec!["Data Sharing"]);
        assert_eq!(features("Data sharing basics"), vec!["Data Sharing"]);
    }

    #[test]
    fn one_phrase_can_hit_several_rules() {
        let found = features("cross-account user management");
        assert_eq!(found, vec!["User Management", "Cross-Account Operations"]);
    }

    #[test]
    fn violation_reports_source_pattern() {
        let v = &check("external stage on S3")[0];
        assert_eq!(v.feature, "External Stages");
        assert_eq!(v.pattern, "external.*stage");
    }

    #[test]
    fn incompatible_request_carries_report() {
        let err = check_feature_compatibility("disaster recovery drill").unwrap_err();
        match err {
            GuideError::ConstraintViolation { report } => {
                assert!(report.contains("REQUESTED FEATURE: disaster recovery drill"));
                assert!(report.contains("- Disaster Recovery: typically requires"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sql_scan_skips_comments_and_blanks() {
        let sql = "\n-- CREATE DATABASE commented_out;\n   \nselect 1;\n  create database demo_db;\nCREATE ROLE analyst;\n";
        let found = check_sql(sql);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line, 5);
        assert_eq!(found[0].content, "create database demo_db;");
        assert_eq!(found[0].message, "CREATE DATABASE operations not allowed");
        assert_eq!(found[1].line, 6);
        assert_eq!(found[1].message, "Role creation not allowed");
    }

    #[test]
    fn sql_replica_and_account_rules() {
        let sql = "CREATE DATABASE db2 AS REPLICA OF org.acct.db1;\nALTER ACCOUNT SET TIMEZONE = 'UTC';";
        let messages: Vec<_> = check_sql(sql).into_iter().map(|v| v.message).collect();
        assert_eq!(
            messages,
            vec![
                "CREATE DATABASE operations not allowed",
                "Cross-account replica creation not allowed",
                "Account parameter changes not allowed",
            ]
        );
    }

    #[test]
    fn violations_serialize() {
        let json = serde_json::to_value(&check_sql("create user bob;")[0]).unwrap();
        assert_eq!(json["line"], 1);
        assert_eq!(json["message"], "User creation not allowed");
    }
}
