//! End-to-end `generate` pipeline: input → assemble → validate → write → ingest → archive.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use guidegen_assets::AssetIngestor;
use guidegen_shared::{AssetRecord, GuideId, GuideMetadata, GuideSections, Result, UploadedFile};

use crate::tree::GuideTree;
use crate::validator::{self, ValidationIssue};

/// Everything one guide generation needs.
#[derive(Debug, Clone)]
pub struct GuideRequest {
    pub metadata: GuideMetadata,
    pub sections: GuideSections,
    pub images: Vec<UploadedFile>,
    pub files: Vec<UploadedFile>,
    pub urls: Vec<String>,
}

/// Result of [`generate_guide`].
#[derive(Debug)]
pub struct GuideOutput {
    pub guide_id: GuideId,
    /// The rendered document.
    pub markdown: String,
    /// Advisory; a non-empty list does not prevent the archive.
    pub issues: Vec<ValidationIssue>,
    pub assets: Vec<AssetRecord>,
    /// Zip of the working tree, rooted at `site/`.
    pub archive: Vec<u8>,
    pub sha256: String,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once validation has run, with whatever it found.
    fn validated(&self, issues: &[ValidationIssue]);
    /// Called when the pipeline completes.
    fn done(&self, output: &GuideOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn validated(&self, _issues: &[ValidationIssue]) {}
    fn done(&self, _output: &GuideOutput) {}
}

/// Run the full pipeline inside `work_dir`.
///
/// 1. Assemble the markdown document
/// 2. Validate it (issues are reported, never fatal)
/// 3. Write `site/sfguides/src/<id>/<id>.md`
/// 4. Ingest assets next to it
/// 5. Zip `work_dir`
///
/// `work_dir` should be empty; everything under it ends up in the archive.
#[instrument(skip_all, fields(id = %request.metadata.id, work_dir = %work_dir.display()))]
pub async fn generate_guide(
    request: &GuideRequest,
    ingestor: &AssetIngestor,
    work_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<GuideOutput> {
    let start = Instant::now();
    let guide_id = request.metadata.id.clone();

    info!(%guide_id, "starting generate pipeline");

    // --- Phase 1: Assemble ---
    progress.phase("Assembling guide");
    let markdown = guidegen_markdown::assemble(&request.metadata, &request.sections);

    // --- Phase 2: Validate ---
    progress.phase("Validating guide");
    let issues = validator::validate(&markdown, guide_id.as_str());
    for issue in &issues {
        warn!(kind = ?issue.kind, "{issue}");
    }
    progress.validated(&issues);

    // --- Phase 3: Write tree ---
    progress.phase("Writing guide tree");
    let tree = GuideTree::new(work_dir, &guide_id);
    tree.write_document(&markdown)?;

    // --- Phase 4: Assets ---
    progress.phase("Ingesting assets");
    let assets = ingestor
        .ingest(&tree.assets_dir, &request.images, &request.files, &request.urls)
        .await?;

    // --- Phase 5: Archive ---
    progress.phase("Building archive");
    let archive = guidegen_archive::build(work_dir)?;
    let sha256 = guidegen_archive::sha256_hex(&archive);

    let output = GuideOutput {
        guide_id,
        markdown,
        issues,
        assets,
        archive,
        sha256,
        elapsed: start.elapsed(),
    };

    info!(
        issues = output.issues.len(),
        assets = output.assets.len(),
        bytes = output.archive.len(),
        elapsed_ms = output.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );
    progress.done(&output);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    use guidegen_shared::{AssetsConfig, Language, Status, Step, TaxonomyPath};
    use guidegen_taxonomy::QUICKSTART;

    use crate::validator::IssueKind;

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn validated(&self, _issues: &[ValidationIssue]) {}
        fn done(&self, _output: &GuideOutput) {
            self.phases.lock().unwrap().push("done".to_string());
        }
    }

    fn request(categories: Vec<TaxonomyPath>) -> GuideRequest {
        GuideRequest {
            metadata: GuideMetadata {
                author: "Jane Doe".into(),
                id: GuideId::parse("pipeline-test").unwrap(),
                language: Language::En,
                summary: "s".into(),
                categories,
                environments: "web".into(),
                status: Status::Published,
                feedback_link: "f".into(),
                fork_repo_link: "r".into(),
                open_in_link: "o".into(),
            },
            sections: GuideSections {
                title: "Pipeline".into(),
                steps: vec![Step::new("One", "Do it.")],
                ..GuideSections::default()
            },
            images: vec![UploadedFile::new("Arch_Diagram.PNG", b"png".to_vec())],
            files: vec![UploadedFile::new("notes.md", b"# skip".to_vec())],
            urls: vec![],
        }
    }

    fn ingestor() -> AssetIngestor {
        AssetIngestor::new(&AssetsConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn produces_archive_with_guide_layout() {
        let dir = tempfile::tempdir().unwrap();
        let progress = RecordingProgress::default();
        let req = request(vec![TaxonomyPath::new(QUICKSTART)]);

        let output = generate_guide(&req, &ingestor(), dir.path(), &progress)
            .await
            .unwrap();

        assert!(output.issues.is_empty(), "{:?}", output.issues);
        assert_eq!(output.assets.len(), 1);
        assert_eq!(output.assets[0].relative_path, "assets/arch-diagram.png");
        assert_eq!(output.sha256, guidegen_archive::sha256_hex(&output.archive));

        let archive = zip::ZipArchive::new(Cursor::new(output.archive)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "site/sfguides/src/pipeline-test/assets/arch-diagram.png",
                "site/sfguides/src/pipeline-test/pipeline-test.md",
            ]
        );

        let phases = progress.phases.lock().unwrap();
        assert_eq!(phases.first().map(String::as_str), Some("Assembling guide"));
        assert_eq!(phases.last().map(String::as_str), Some("done"));
    }

    #[tokio::test]
    async fn validation_issues_do_not_block_archive() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(vec![TaxonomyPath::new("not-a-taxonomy-path")]);

        let output = generate_guide(&req, &ingestor(), dir.path(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].kind, IssueKind::Categories);
        assert!(!output.archive.is_empty());
    }
}
