//! Guide asset ingestion.
//!
//! Uploaded images, uploaded files and remote URLs all end up as flat files in
//! one `assets/` directory next to the guide document. Every item is gated on
//! type and size independently; a rejected item is logged and skipped, never
//! fatal.

mod fetch;
mod sanitize;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use guidegen_shared::{AssetRecord, AssetsConfig, GuideError, Result, UploadedFile};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use sanitize::sanitize_filename;

const USER_AGENT: &str = concat!("guidegen/", env!("CARGO_PKG_VERSION"));

static IMAGE_CONTENT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)image/(png|jpeg|jpg|gif|svg|webp|bmp|x-icon)").expect("image type regex")
});

static IMAGE_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpg|jpeg|gif|svg|webp|bmp|ico)$").expect("image extension regex")
});

/// Whether an upload qualifies as an image, by reported type or by extension.
pub fn is_image(file: &UploadedFile) -> bool {
    file.content_type
        .as_deref()
        .is_some_and(|ct| IMAGE_CONTENT_TYPE_RE.is_match(ct))
        || IMAGE_EXTENSION_RE.is_match(&file.name)
}

// ---------------------------------------------------------------------------
// AssetIngestor
// ---------------------------------------------------------------------------

/// Classifies, size-gates and writes guide assets.
#[derive(Debug, Clone)]
pub struct AssetIngestor {
    max_image_bytes: usize,
    max_file_bytes: usize,
    fetch_timeout: Duration,
    client: Client,
    /// Permit loopback URL hosts (local mock servers).
    allow_localhost: bool,
}

impl AssetIngestor {
    pub fn new(config: &AssetsConfig) -> Result<Self> {
        let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
        Ok(Self {
            max_image_bytes: config.max_image_bytes,
            max_file_bytes: config.max_file_bytes,
            fetch_timeout,
            client: build_client(fetch_timeout, false)?,
            allow_localhost: false,
        })
    }

    /// Allow URL assets served from loopback addresses, including redirects
    /// to them. Other private ranges stay blocked.
    pub fn allow_localhost(mut self) -> Result<Self> {
        self.client = build_client(self.fetch_timeout, true)?;
        self.allow_localhost = true;
        Ok(self)
    }

    /// Write every acceptable item into `assets_dir`.
    ///
    /// Processing order is images, then other files, then URLs; the returned
    /// records follow the same order and list only what was written. The only
    /// error is failing to create `assets_dir` itself.
    #[instrument(skip_all, fields(
        dir = %assets_dir.display(),
        images = images.len(),
        files = files.len(),
        urls = urls.len(),
    ))]
    pub async fn ingest(
        &self,
        assets_dir: &Path,
        images: &[UploadedFile],
        files: &[UploadedFile],
        urls: &[String],
    ) -> Result<Vec<AssetRecord>> {
        std::fs::create_dir_all(assets_dir).map_err(|e| GuideError::io(assets_dir, e))?;

        let mut sink = AssetSink::new(assets_dir);

        for image in images {
            if !is_image(image) {
                warn!(name = %image.name, "skipping upload: not an image");
                continue;
            }
            if image.data.len() > self.max_image_bytes {
                warn!(
                    name = %image.name,
                    size = image.data.len(),
                    limit = self.max_image_bytes,
                    "skipping image: too large"
                );
                continue;
            }
            sink.write(&image.name, &image.data);
        }

        for file in files {
            if file.data.len() > self.max_file_bytes {
                warn!(
                    name = %file.name,
                    size = file.data.len(),
                    limit = self.max_file_bytes,
                    "skipping file: too large"
                );
                continue;
            }
            if is_markdown(&sanitize_filename(&file.name)) {
                warn!(name = %file.name, "skipping file: markdown uploads are not assets");
                continue;
            }
            sink.write(&file.name, &file.data);
        }

        for raw in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            self.ingest_url(&mut sink, raw).await;
        }

        info!(written = sink.records.len(), "assets ingested");
        Ok(sink.records)
    }

    async fn ingest_url(&self, sink: &mut AssetSink, raw: &str) {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = raw, error = %e, "skipping URL: invalid");
                return;
            }
        };

        if fetch::is_ssrf_target(&url, self.allow_localhost) {
            warn!(%url, "skipping URL: blocked host or scheme");
            return;
        }

        let name = fetch::url_filename(&url).map(sanitize_filename).unwrap_or_default();
        if name.is_empty() {
            warn!(%url, "skipping URL: no usable filename");
            return;
        }
        if is_markdown(&name) {
            warn!(%url, "skipping URL: markdown files are not assets");
            return;
        }

        match fetch::fetch_capped(&self.client, &url, self.max_file_bytes).await {
            Ok(data) => sink.write(&name, &data),
            Err(e) => warn!(%url, error = %e, "skipping URL"),
        }
    }
}

fn build_client(timeout: Duration, allow_loopback: bool) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(fetch::redirect_policy(allow_loopback))
        .timeout(timeout)
        .build()
        .map_err(|e| GuideError::Network(format!("failed to build HTTP client: {e}")))
}

fn is_markdown(sanitized: &str) -> bool {
    sanitized.ends_with(".md")
}

// ---------------------------------------------------------------------------
// AssetSink
// ---------------------------------------------------------------------------

/// Writes files into one directory, never reusing a name within a call.
struct AssetSink {
    dir: PathBuf,
    used: HashSet<String>,
    records: Vec<AssetRecord>,
}

impl AssetSink {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            used: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn write(&mut self, raw_name: &str, data: &[u8]) {
        let sanitized = sanitize_filename(raw_name);
        if sanitized.is_empty() {
            warn!(name = raw_name, "skipping asset: empty filename after sanitizing");
            return;
        }

        let name = sanitize::disambiguate(&sanitized, &self.used);
        if name != sanitized {
            debug!(original = %sanitized, renamed = %name, "asset name collision");
        }

        let path = self.dir.join(&name);
        if let Err(e) = std::fs::write(&path, data) {
            warn!(path = %path.display(), error = %e, "skipping asset: write failed");
            return;
        }

        debug!(name = %name, bytes = data.len(), "asset written");
        self.used.insert(name.clone());
        self.records.push(AssetRecord {
            relative_path: format!("assets/{name}"),
            byte_size: data.len(),
        });
    }
}
