//! Category taxonomy resolution.
//!
//! Guide categories are `snowflake-site:taxonomy/...` paths. The list of valid
//! paths is published on a reference page; we scrape it, merge in a built-in
//! table, and derive human-readable labels. Resolution never fails: any network
//! or parse problem just means the built-in table is all we get.

mod fallback;
mod parser;

use std::collections::BTreeSet;
use std::time::Duration;

use guidegen_shared::{CategoryMap, GuideError, Result, TaxonomyConfig, TaxonomyPath};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

pub use fallback::{
    CERTIFIED_SOLUTION, CONTENT_TYPES, FALLBACK_CATEGORIES, FEATURED, QUICKSTART,
    content_type_path,
};

/// Maximum number of redirects to follow when fetching the reference page.
const MAX_REDIRECTS: usize = 5;

/// The reference page rejects obviously non-browser clients.
const USER_AGENT: &str = "Mozilla/5.0 (Guide-Generator)";

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves the session's [`CategoryMap`].
#[derive(Debug, Clone)]
pub struct TaxonomyResolver {
    source_url: String,
    timeout: Duration,
    offline: bool,
}

impl TaxonomyResolver {
    pub fn new(source_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source_url: source_url.into(),
            timeout,
            offline: false,
        }
    }

    /// Only use the built-in table; no request is made.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Fetch, merge with the built-in table, and label.
    ///
    /// Always returns a non-empty map.
    #[instrument(skip_all, fields(source = %self.source_url, offline = self.offline))]
    pub async fn resolve(&self) -> CategoryMap {
        let mut paths: BTreeSet<TaxonomyPath> = if self.offline {
            BTreeSet::new()
        } else {
            match self.fetch_paths().await {
                Ok(found) => {
                    info!(count = found.len(), "taxonomy paths fetched");
                    found
                }
                Err(e) => {
                    warn!(error = %e, "taxonomy fetch failed, using built-in categories");
                    BTreeSet::new()
                }
            }
        };

        paths.extend(fallback_paths());

        let map = parser::build_category_map(&paths);
        debug!(labels = map.len(), "category map built");
        map
    }

    async fn fetch_paths(&self) -> Result<BTreeSet<TaxonomyPath>> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(self.timeout)
            .build()
            .map_err(|e| GuideError::Network(format!("failed to build HTTP client: {e}")))?;

        let response = client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| GuideError::Network(format!("{}: {e}", self.source_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::Network(format!(
                "{}: HTTP {status}",
                self.source_url
            )));
        }

        let body = response.text().await.map_err(|e| {
            GuideError::Network(format!("{}: failed to read body: {e}", self.source_url))
        })?;

        Ok(parser::extract_taxonomy_paths(&body))
    }
}

impl From<&TaxonomyConfig> for TaxonomyResolver {
    fn from(config: &TaxonomyConfig) -> Self {
        Self::new(&config.source_url, Duration::from_secs(config.timeout_secs))
            .offline(config.offline)
    }
}

/// The built-in category map, with no network involved.
pub fn fallback_map() -> CategoryMap {
    let paths: BTreeSet<TaxonomyPath> = fallback_paths().collect();
    parser::build_category_map(&paths)
}

fn fallback_paths() -> impl Iterator<Item = TaxonomyPath> {
    FALLBACK_CATEGORIES.iter().map(|path| TaxonomyPath::new(*path))
}
