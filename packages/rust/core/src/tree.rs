//! On-disk layout of a generated guide.
//!
//! ```text
//! <root>/site/sfguides/src/<id>/<id>.md
//! <root>/site/sfguides/src/<id>/assets/...
//! ```

use std::path::{Path, PathBuf};

use guidegen_shared::{GuideError, GuideId, Result};
use tracing::debug;

/// Location of guide sources inside the publishing repository.
pub const GUIDES_SUBDIR: &str = "site/sfguides/src";

/// Paths of one guide under a working root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideTree {
    pub guide_dir: PathBuf,
    pub document: PathBuf,
    pub assets_dir: PathBuf,
}

impl GuideTree {
    pub fn new(root: &Path, id: &GuideId) -> Self {
        let guide_dir = root.join(GUIDES_SUBDIR).join(id.as_str());
        Self {
            document: guide_dir.join(format!("{id}.md")),
            assets_dir: guide_dir.join("assets"),
            guide_dir,
        }
    }

    /// Create the guide directory and write the document.
    pub fn write_document(&self, markdown: &str) -> Result<()> {
        std::fs::create_dir_all(&self.guide_dir).map_err(|e| GuideError::io(&self.guide_dir, e))?;
        std::fs::write(&self.document, markdown).map_err(|e| GuideError::io(&self.document, e))?;
        debug!(path = %self.document.display(), bytes = markdown.len(), "wrote guide document");
        Ok(())
    }
}
