//! Core domain types for guides.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GuideError;

/// Prefix every taxonomy path must carry.
pub const TAXONOMY_PREFIX: &str = "snowflake-site:taxonomy/";

// ---------------------------------------------------------------------------
// GuideId
// ---------------------------------------------------------------------------

static GUIDE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("guide id regex"));

/// Slug identifying a guide; used as both folder and file name.
///
/// Only constructible through [`GuideId::parse`], so a value of this type always
/// matches `^[a-z0-9][a-z0-9-]*[a-z0-9]$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuideId(String);

impl GuideId {
    /// Validate and wrap a slug.
    pub fn parse(raw: impl Into<String>) -> Result<Self, GuideError> {
        let raw = raw.into();
        if GUIDE_ID_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(GuideError::InvalidGuideId(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GuideId {
    type Error = GuideError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<GuideId> for String {
    fn from(id: GuideId) -> Self {
        id.0
    }
}

impl std::fmt::Display for GuideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Language / Status
// ---------------------------------------------------------------------------

/// Languages a published guide may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Es,
    It,
    Fr,
    De,
    Ja,
    Ko,
    PtBr,
}

impl Language {
    /// Every allowed language, in canonical order.
    pub const ALL: [Language; 8] = [
        Self::En,
        Self::Es,
        Self::It,
        Self::Fr,
        Self::De,
        Self::Ja,
        Self::Ko,
        Self::PtBr,
    ];

    /// Language code as written in the guide header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::It => "it",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::PtBr => "pt_br",
        }
    }

    /// Case-insensitive lookup by code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(code))
    }

    /// Comma-separated list of allowed codes, for messages.
    pub fn allowed_codes() -> String {
        Self::ALL
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a guide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Published,
    Archived,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Published => f.write_str("Published"),
            Self::Archived => f.write_str("Archived"),
        }
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Canonical category identifier, e.g.
/// `snowflake-site:taxonomy/products/snowpark`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyPath(String);

impl TaxonomyPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty `/`-separated segments (the prefix's `snowflake-site:taxonomy`
    /// counts as the first one).
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl std::fmt::Display for TaxonomyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display label → taxonomy path, resolved once per session and read-only after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: BTreeMap<String, TaxonomyPath>,
}

impl CategoryMap {
    pub fn from_entries(entries: BTreeMap<String, TaxonomyPath>) -> Self {
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<&TaxonomyPath> {
        self.entries.get(label)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaxonomyPath)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Guide records
// ---------------------------------------------------------------------------

/// Header metadata of a guide, rendered as the `key: value` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideMetadata {
    pub author: String,
    pub id: GuideId,
    pub language: Language,
    pub summary: String,
    /// Rendered comma-joined, in order.
    pub categories: Vec<TaxonomyPath>,
    pub environments: String,
    pub status: Status,
    pub feedback_link: String,
    pub fork_repo_link: String,
    pub open_in_link: String,
}

/// One step of the Process section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Step {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// A step with neither title nor content is dropped before rendering.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Free-text body of a guide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideSections {
    pub title: String,
    pub overview: String,
    pub learn: Vec<String>,
    pub need: Vec<String>,
    pub build: String,
    pub steps: Vec<Step>,
    pub conclusion: String,
    /// Each line is a raw URL or `label | URL`.
    pub resources: Vec<String>,
}

/// An asset written next to the guide document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    /// Path relative to the guide directory, e.g. `assets/diagram.png`.
    pub relative_path: String,
    pub byte_size: usize,
}

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name; may contain directory components.
    pub name: String,
    /// MIME type reported by the client, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
