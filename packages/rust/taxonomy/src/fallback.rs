//! Built-in category table, always merged into the resolved map.

/// Quickstart content type; also the category used when no product is chosen.
pub const QUICKSTART: &str = "snowflake-site:taxonomy/solution-center/certification/quickstart";

/// Certified Solution content type.
pub const CERTIFIED_SOLUTION: &str = "snowflake-site:taxonomy/technical/certified-solution";

/// Tag added to featured guides.
pub const FEATURED: &str = "snowflake-site:taxonomy/technical/featured";

/// Known-good product paths. Display labels are derived from the last segment.
pub const FALLBACK_CATEGORIES: &[&str] = &[
    QUICKSTART,
    "snowflake-site:taxonomy/products/snowflake-cortex",
    "snowflake-site:taxonomy/products/snowpark",
    "snowflake-site:taxonomy/products/streamlit-in-snowflake",
    "snowflake-site:taxonomy/products/iceberg-tables",
    "snowflake-site:taxonomy/products/snowpipe-streaming",
    "snowflake-site:taxonomy/products/native-apps",
    "snowflake-site:taxonomy/products/external-tables",
    "snowflake-site:taxonomy/products/external-functions",
    "snowflake-site:taxonomy/products/materialized-views",
    "snowflake-site:taxonomy/products/vector-data-type",
    "snowflake-site:taxonomy/products/query-acceleration",
    "snowflake-site:taxonomy/products/search-optimization",
    "snowflake-site:taxonomy/products/time-travel",
    "snowflake-site:taxonomy/products/streams-tasks",
    "snowflake-site:taxonomy/products/dynamic-tables",
    "snowflake-site:taxonomy/products/snowpark-ml",
    "snowflake-site:taxonomy/products/geo-spatial",
    "snowflake-site:taxonomy/products/data-sharing",
    "snowflake-site:taxonomy/products/data-masking",
    "snowflake-site:taxonomy/products/data-classification",
    "snowflake-site:taxonomy/products/document-ai",
    "snowflake-site:taxonomy/products/alerts",
];

/// Content types selectable for a guide, by display name.
pub const CONTENT_TYPES: &[(&str, &str)] = &[
    ("Quickstart", QUICKSTART),
    ("Certified Solution", CERTIFIED_SOLUTION),
];

/// Look up a content type path by display name (case-insensitive).
pub fn content_type_path(name: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(name.trim()))
        .map(|(_, path)| *path)
}
