//! Release discovery from the boost.org version history page.
//!
//! The history page lists releases newest first. Each release starts with an
//! anchor reading `Version X.Y.Z` that links to its release page, followed by
//! assorted links, one of which reads `Download` when the release still has
//! downloadable sources:
//!
//! ```text
//! <a href="/users/history/version_1_60_0.html">Version 1.60.0</a>
//! ... <a href="https://sourceforge.net/...">Download</a>
//! <a href="/users/history/version_1_59_0.html">Version 1.59.0</a>
//! ```
//!
//! The catalog is stateless: every query refetches the index. Callers that
//! need a stable view take a [`CatalogSnapshot`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use boostup_schema::{ARCHIVE_EXTENSION, MIN_VERSION, Version};
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::{ProvisionError, Result};
use crate::io::fetch::Fetch;

/// Default location of the release history page.
pub const DEFAULT_INDEX_URL: &str = "https://www.boost.org/users/history/";

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("static selector"));

static VERSION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Version\s+([0-9.]+)$").expect("static regex"));

/// Text marking a release as downloadable.
const DOWNLOAD_LABEL: &str = "Download";

/// Parse an absolute URL.
pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ProvisionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn join_url(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|e| ProvisionError::InvalidUrl {
        url: href.to_string(),
        reason: e.to_string(),
    })
}

/// One `<a>` element: trimmed text content and raw `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Concatenated, trimmed text of the element.
    pub text: String,
    /// The `href` attribute, if any.
    pub href: Option<String>,
}

/// All anchors of an HTML document, in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR)
        .map(|a| Anchor {
            text: a.text().collect::<String>().trim().to_string(),
            href: a.value().attr("href").map(str::to_string),
        })
        .collect()
}

/// A `Version X.Y.Z` anchor and whether a `Download` anchor followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReleaseGroup<'a> {
    label: &'a str,
    href: Option<&'a str>,
    downloadable: bool,
}

enum ScanState<'a> {
    SeekingVersion,
    InRelease(ReleaseGroup<'a>),
}

fn version_label(text: &str) -> Option<&str> {
    VERSION_LABEL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Group anchors into releases.
///
/// Anchors before the first version label are ignored. Returns `None` when
/// the document has no version labels at all.
fn release_groups(anchors: &[Anchor]) -> Option<Vec<ReleaseGroup<'_>>> {
    let mut groups = Vec::new();
    let mut state = ScanState::SeekingVersion;

    for anchor in anchors {
        let opened = version_label(&anchor.text).map(|label| ReleaseGroup {
            label,
            href: anchor.href.as_deref(),
            downloadable: false,
        });

        state = match (state, opened) {
            (ScanState::SeekingVersion, None) => ScanState::SeekingVersion,
            (ScanState::SeekingVersion, Some(next)) => ScanState::InRelease(next),
            (ScanState::InRelease(group), Some(next)) => {
                groups.push(group);
                ScanState::InRelease(next)
            }
            (ScanState::InRelease(mut group), None) => {
                if anchor.text == DOWNLOAD_LABEL {
                    group.downloadable = true;
                }
                ScanState::InRelease(group)
            }
        };
    }

    if let ScanState::InRelease(group) = state {
        groups.push(group);
    }

    (!groups.is_empty()).then_some(groups)
}

/// Parse a history page into a snapshot of downloadable releases at or above `floor`.
pub fn parse_index(html: &str, index_url: &Url, floor: &Version) -> Result<CatalogSnapshot> {
    let anchors = anchors(html);
    let groups = release_groups(&anchors).ok_or_else(|| ProvisionError::UnparsableIndex {
        url: index_url.to_string(),
    })?;

    let mut releases = BTreeMap::new();
    for group in groups.into_iter().filter(|g| g.downloadable) {
        let version: Version = match group.label.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping release: {e}");
                continue;
            }
        };
        if version < *floor {
            continue;
        }
        let Some(href) = group.href else {
            warn!(%version, "Skipping release without a release page link");
            continue;
        };
        let url = join_url(index_url, href)?;
        releases.entry(version).or_insert(url);
    }

    debug!(count = releases.len(), "parsed release index");
    Ok(CatalogSnapshot {
        source: index_url.clone(),
        releases,
    })
}

/// Find the source archive link on a release page.
pub fn find_archive_link(html: &str, page_url: &Url) -> Result<Url> {
    anchors(html)
        .into_iter()
        .find_map(|a| {
            a.text
                .ends_with(ARCHIVE_EXTENSION)
                .then_some(a.href)
                .flatten()
        })
        .ok_or_else(|| ProvisionError::ArchiveLinkNotFound {
            url: page_url.to_string(),
        })
        .and_then(|href| join_url(page_url, &href))
}

/// Downloadable releases from one fetch of the index, ordered by version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    source: Url,
    releases: BTreeMap<Version, Url>,
}

impl CatalogSnapshot {
    /// Versions in ascending order.
    pub fn versions(&self) -> Vec<Version> {
        self.releases.keys().cloned().collect()
    }

    /// The newest version.
    pub fn latest(&self) -> Result<&Version> {
        self.releases
            .keys()
            .next_back()
            .ok_or_else(|| ProvisionError::NoReleases {
                url: self.source.to_string(),
            })
    }

    /// Release page for `version`.
    pub fn release_url(&self, version: &Version) -> Result<&Url> {
        self.releases
            .get(version)
            .ok_or_else(|| ProvisionError::VersionNotFound(version.clone()))
    }

    /// Number of releases.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether no release qualified.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> BTreeMap<Version, Url> {
        self.releases
    }
}

/// Catalog service over a release index URL.
#[derive(Clone)]
pub struct ReleaseCatalog {
    fetch: Arc<dyn Fetch>,
    index_url: Url,
    floor: Version,
}

impl fmt::Debug for ReleaseCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseCatalog")
            .field("index_url", &self.index_url.as_str())
            .field("floor", &self.floor)
            .finish_non_exhaustive()
    }
}

impl ReleaseCatalog {
    /// Catalog of `index_url` with the default version floor.
    pub fn new(fetch: Arc<dyn Fetch>, index_url: Url) -> Self {
        Self {
            fetch,
            index_url,
            floor: MIN_VERSION,
        }
    }

    /// Override the minimum version.
    pub fn with_floor(mut self, floor: Version) -> Self {
        self.floor = floor;
        self
    }

    /// The release index location.
    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// The minimum version considered.
    pub fn floor(&self) -> &Version {
        &self.floor
    }

    /// The fetcher used for index, release page and archive requests.
    pub fn fetcher(&self) -> &dyn Fetch {
        self.fetch.as_ref()
    }

    /// Fetch and parse the index once.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let html = self.fetch.fetch_text(&self.index_url).await?;
        parse_index(&html, &self.index_url, &self.floor)
    }

    /// Mapping of version to release page.
    pub async fn release_urls(&self) -> Result<BTreeMap<Version, Url>> {
        Ok(self.snapshot().await?.into_map())
    }

    /// Versions in ascending order.
    pub async fn versions(&self) -> Result<Vec<Version>> {
        Ok(self.snapshot().await?.versions())
    }

    /// Newest available version.
    pub async fn latest_version(&self) -> Result<Version> {
        self.snapshot().await?.latest().cloned()
    }

    /// Release page of `version`.
    pub async fn release_url(&self, version: &Version) -> Result<Url> {
        self.snapshot().await?.release_url(version).cloned()
    }

    /// Source archive URL linked from `release_page`.
    pub async fn archive_url(&self, release_page: &Url) -> Result<Url> {
        let html = self.fetch.fetch_text(release_page).await?;
        find_archive_link(&html, release_page)
    }
}
