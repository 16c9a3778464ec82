//! Guide input files.
//!
//! A guide is described by one TOML file with `[metadata]`, `[sections]` and
//! `[assets]` tables. This module turns it into the validated records the
//! pipeline consumes. Every input error surfaces here, before anything is
//! written to disk.

use std::path::{Path, PathBuf};

use guidegen_shared::{
    AssetsConfig, CategoryMap, DefaultsConfig, GuideError, GuideId, GuideMetadata, GuideSections,
    Language, Result, Status, Step, TaxonomyPath, UploadedFile,
};
use guidegen_taxonomy::{FEATURED, QUICKSTART, content_type_path};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::pipeline::GuideRequest;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GuideInput {
    pub metadata: MetadataInput,
    #[serde(default)]
    pub sections: SectionsInput,
    #[serde(default)]
    pub assets: AssetsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataInput {
    pub id: String,
    pub author: String,
    pub language: String,
    pub summary: String,
    /// Display labels, resolved through the session's category map.
    pub products: Vec<String>,
    /// Extra taxonomy paths, used verbatim.
    pub categories: Vec<String>,
    pub content_type: String,
    pub featured: bool,
    pub status: Status,
    pub environments: String,
    pub feedback_link: String,
    pub fork_repo_link: String,
    pub open_in_link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SectionsInput {
    pub title: String,
    pub overview: String,
    pub learn: Lines,
    pub need: Lines,
    pub build: String,
    pub steps: Vec<Step>,
    pub conclusion: String,
    pub resources: Lines,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetsInput {
    /// Local paths, relative to the input file.
    pub images: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub urls: Vec<String>,
}

/// A list written either as a TOML array or as one multi-line string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    List(Vec<String>),
    Text(String),
}

impl Default for Lines {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Lines {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(text) => text.lines().map(str::to_string).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl GuideInput {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GuideError::io(path, e))?;
        Self::from_toml_str(&content)
            .map_err(|e| GuideError::parse(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GuideError::parse(e.to_string()))
    }

    /// Validated header metadata. Blank fields take their configured defaults.
    pub fn metadata(&self, categories: &CategoryMap, defaults: &DefaultsConfig) -> Result<GuideMetadata> {
        let m = &self.metadata;
        let id = GuideId::parse(m.id.trim())?;

        let language = match m.language.trim() {
            "" => Language::default(),
            code => Language::from_code(code).ok_or_else(|| {
                GuideError::validation(format!(
                    "unsupported language \"{code}\" (allowed: {})",
                    Language::allowed_codes()
                ))
            })?,
        };

        Ok(GuideMetadata {
            author: or_default(&m.author, &defaults.author),
            id,
            language,
            summary: or_default(&m.summary, &defaults.summary),
            categories: self.category_paths(categories)?,
            environments: or_default(&m.environments, &defaults.environments),
            status: m.status,
            feedback_link: or_default(&m.feedback_link, &defaults.feedback_link),
            fork_repo_link: or_default(&m.fork_repo_link, &defaults.fork_repo_link),
            open_in_link: or_default(&m.open_in_link, &defaults.open_in_link),
        })
    }

    /// Products (or Quickstart), explicit paths, content type, featured tag;
    /// first occurrence wins.
    fn category_paths(&self, map: &CategoryMap) -> Result<Vec<TaxonomyPath>> {
        let m = &self.metadata;
        let mut paths = Vec::new();

        for label in m.products.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            paths.push(lookup_label(map, label)?.clone());
        }
        if paths.is_empty() {
            paths.push(TaxonomyPath::new(QUICKSTART));
        }

        paths.extend(
            m.categories
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(TaxonomyPath::new),
        );

        let content_type = match m.content_type.trim() {
            "" => QUICKSTART,
            name => content_type_path(name).ok_or_else(|| {
                GuideError::validation(format!("unknown content type \"{name}\""))
            })?,
        };
        paths.push(TaxonomyPath::new(content_type));

        if m.featured {
            paths.push(TaxonomyPath::new(FEATURED));
        }

        let mut unique: Vec<TaxonomyPath> = Vec::with_capacity(paths.len());
        for path in paths {
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Ok(unique)
    }

    pub fn sections(&self) -> GuideSections {
        let s = self.sections.clone();
        GuideSections {
            title: s.title,
            overview: s.overview,
            learn: s.learn.into_vec(),
            need: s.need.into_vec(),
            build: s.build,
            steps: s.steps,
            conclusion: s.conclusion,
            resources: s.resources.into_vec(),
        }
    }

    /// Read the listed image and file uploads. Relative paths resolve against
    /// `base_dir`. Unreadable files and files over the configured limit are
    /// logged and left out.
    pub fn load_uploads(
        &self,
        base_dir: &Path,
        limits: &AssetsConfig,
    ) -> (Vec<UploadedFile>, Vec<UploadedFile>) {
        let read_all = |paths: &[PathBuf], max_bytes: usize| -> Vec<UploadedFile> {
            paths
                .iter()
                .filter_map(|p| read_upload(&base_dir.join(p), max_bytes))
                .collect()
        };
        (
            read_all(&self.assets.images, limits.max_image_bytes),
            read_all(&self.assets.files, limits.max_file_bytes),
        )
    }

    /// Everything the pipeline needs, with uploads read relative to `base_dir`.
    pub fn into_request(
        self,
        base_dir: &Path,
        categories: &CategoryMap,
        defaults: &DefaultsConfig,
        limits: &AssetsConfig,
    ) -> Result<GuideRequest> {
        let metadata = self.metadata(categories, defaults)?;
        let sections = self.sections();
        let (images, files) = self.load_uploads(base_dir, limits);

        Ok(GuideRequest {
            metadata,
            sections,
            images,
            files,
            urls: self.assets.urls,
        })
    }
}

fn lookup_label<'a>(map: &'a CategoryMap, label: &str) -> Result<&'a TaxonomyPath> {
    map.get(label)
        .or_else(|| {
            map.iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(label))
                .map(|(_, path)| path)
        })
        .ok_or_else(|| GuideError::UnknownCategory(label.to_string()))
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn read_upload(path: &Path, max_bytes: usize) -> Option<UploadedFile> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping upload: unreadable");
            return None;
        }
    };
    if size > max_bytes as u64 {
        warn!(path = %path.display(), size, limit = max_bytes, "skipping upload: too large");
        return None;
    }

    match std::fs::read(path) {
        Ok(data) => {
            debug!(path = %path.display(), bytes = data.len(), "upload read");
            Some(UploadedFile::new(path.to_string_lossy(), data))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping upload: unreadable");
            None
        }
    }
}
