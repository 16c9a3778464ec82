//! Forbidden-pattern tables for the learning environment.
//!
//! The learning environment only grants schema-level privileges inside one
//! account. Anything needing account-level rights, external integrations or a
//! second account is listed here.

use std::sync::LazyLock;

use regex::Regex;

/// A feature the learning environment cannot demonstrate.
pub(crate) struct FeatureRule {
    pub source: &'static str,
    pub pattern: Regex,
    pub feature: &'static str,
    pub reason: &'static str,
}

/// A SQL statement shape the learning environment rejects.
pub(crate) struct SqlRule {
    pub pattern: Regex,
    pub message: &'static str,
}

const FEATURES: &[(&str, &str, &str)] = &[
    (r"database.*replication", "Database Replication", "requires account-level privileges and multiple accounts"),
    (r"account.*replication", "Account Replication", "requires account-level privileges and multiple accounts"),
    (r"data.*shar(e|ing)", "Data Sharing", "requires account-level privileges and external accounts"),
    (r"external.*stage", "External Stages", "requires storage integrations not available in learning environment"),
    (r"storage.*integration", "Storage Integration", "requires external cloud storage setup"),
    (r"notification.*integration", "Notification Integration", "requires external service integrations"),
    (r"warehouse.*management", "Warehouse Management", "requires account-level warehouse privileges"),
    (r"role.*management", "Role Management", "requires account-level security privileges"),
    (r"user.*management", "User Management", "requires account-level user administration"),
    (r"account.*parameter", "Account Parameters", "requires account-level configuration privileges"),
    (r"cross.*account", "Cross-Account Operations", "requires multiple Snowflake accounts"),
    (r"multi.*account", "Multi-Account Setup", "requires multiple Snowflake accounts"),
    (r"failover", "Failover/Disaster Recovery", "typically requires cross-account or cross-region setup"),
    (r"disaster.*recovery", "Disaster Recovery", "typically requires cross-account or cross-region setup"),
];

const SQL: &[(&str, &str)] = &[
    (r"CREATE\s+DATABASE\s+\w+", "CREATE DATABASE operations not allowed"),
    (r"DROP\s+DATABASE\s+\w+", "DROP DATABASE operations not allowed"),
    (r"ALTER\s+DATABASE\s+.*ENABLE\s+REPLICATION", "Database replication requires account privileges"),
    (r"AS\s+REPLICA\s+OF\s+\w+\.\w+\.\w+", "Cross-account replica creation not allowed"),
    (r"CREATE\s+WAREHOUSE\s+\w+", "Warehouse creation not allowed"),
    (r"CREATE\s+ROLE\s+\w+", "Role creation not allowed"),
    (r"CREATE\s+USER\s+\w+", "User creation not allowed"),
    (r"CREATE\s+STORAGE\s+INTEGRATION", "Storage integrations not allowed"),
    (r"ALTER\s+ACCOUNT\s+SET", "Account parameter changes not allowed"),
];

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("constraint pattern")
}

pub(crate) static FEATURE_RULES: LazyLock<Vec<FeatureRule>> = LazyLock::new(|| {
    FEATURES
        .iter()
        .map(|&(source, feature, reason)| FeatureRule {
            source,
            pattern: case_insensitive(source),
            feature,
            reason,
        })
        .collect()
});

pub(crate) static SQL_RULES: LazyLock<Vec<SqlRule>> = LazyLock::new(|| {
    SQL.iter()
        .map(|&(pattern, message)| SqlRule {
            pattern: case_insensitive(pattern),
            message,
        })
        .collect()
});

/// Alternatives offered for a violated feature, keyed on words in its name.
pub(crate) const ALTERNATIVES: &[(&[&str], &[&str])] = &[
    (
        &["Replication", "Disaster", "Failover"],
        &[
            "Table cloning for data backup and recovery",
            "Time travel for historical data access",
            "Zero-copy cloning for data protection",
            "Incremental data loading patterns",
        ],
    ),
    (
        &["Sharing"],
        &[
            "Secure views for data access control",
            "Row-level security within schemas",
            "Dynamic data masking techniques",
            "Role-based access patterns",
        ],
    ),
    (
        &["Integration", "External"],
        &[
            "Internal data transformation pipelines",
            "Semi-structured data processing (JSON/XML)",
            "File format handling and parsing",
            "Data quality validation techniques",
        ],
    ),
    (
        &["Management", "Account"],
        &[
            "Query optimization and performance tuning",
            "Advanced SQL techniques and patterns",
            "Data modeling best practices",
            "Monitoring and observability within schemas",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_compile() {
        assert_eq!(FEATURE_RULES.len(), 14);
        assert_eq!(SQL_RULES.len(), 9);
    }
}
