use std::time::Duration;

use flixscan_core::error::AppError;
use flixscan_core::models::{ItemMetadata, MediaItem, Section, SectionKind};
use flixscan_core::traits::Catalog;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Catalog implementation backed by a Plex Media Server.
///
/// Talks to the server's HTTP API with JSON responses requested via the
/// `Accept` header. Connection details and the auth token come from run
/// configuration; nothing is read from ambient state.
#[derive(Clone)]
pub struct PlexCatalog {
    client: Client,
    base: Url,
    token: Option<String>,
    timeout_secs: u64,
}

impl PlexCatalog {
    pub fn new(hostname: &str, port: u16, token: Option<String>) -> Result<Self, AppError> {
        Self::with_timeout(hostname, port, token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        hostname: &str,
        port: u16,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("flixscan/0.2")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        let base = Url::parse(&format!("http://{hostname}:{port}"))
            .map_err(|e| AppError::ConfigError(format!("Invalid Plex address: {e}")))?;

        Ok(Self {
            client,
            base,
            token,
            timeout_secs,
        })
    }

    async fn query(&self, path_and_query: &str) -> Result<MediaContainer, AppError> {
        let url = self
            .base
            .join(path_and_query)
            .map_err(|e| AppError::HttpError(format!("Invalid query path: {e}")))?;

        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("X-Plex-Token", token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let wrapper: MediaContainerWrapper = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse response: {e}")))?;

        Ok(wrapper.media_container)
    }
}

impl Catalog for PlexCatalog {
    async fn sections(&self) -> Result<Vec<Section>, AppError> {
        // A failure here means the server is unreachable or the token is
        // bad — fatal to the run.
        let container = self
            .query("/library/sections")
            .await
            .map_err(|e| AppError::CatalogError(e.to_string()))?;
        Ok(to_sections(container))
    }

    async fn items(
        &self,
        section: &Section,
        year: Option<u16>,
    ) -> Result<Vec<MediaItem>, AppError> {
        let container = self
            .query(&section_items_path(section, year))
            .await
            .map_err(|e| AppError::CatalogError(e.to_string()))?;
        Ok(to_items(container))
    }

    async fn metadata(&self, item: &MediaItem) -> Result<Option<ItemMetadata>, AppError> {
        let container = self.query(&item.key).await?;
        Ok(to_item_metadata(container))
    }
}

/// Path for enumerating a section's items, with the optional year filter.
fn section_items_path(section: &Section, year: Option<u16>) -> String {
    match year {
        Some(year) => format!("/library/sections/{}/all?year={year}", section.key),
        None => format!("/library/sections/{}/all", section.key),
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaContainerWrapper {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<DirectoryEntry>,
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
    /// Show-level title, present when the queried item is an episode or
    /// season.
    #[serde(rename = "parentTitle")]
    parent_title: Option<String>,
    #[serde(rename = "parentYear")]
    parent_year: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    key: String,
    title: Option<String>,
    /// Untranslated title, preferred for movies when present.
    #[serde(rename = "originalTitle")]
    original_title: Option<String>,
    guid: Option<String>,
    year: Option<u16>,
}

fn to_sections(container: MediaContainer) -> Vec<Section> {
    container
        .directories
        .into_iter()
        .map(|dir| Section {
            key: dir.key,
            title: dir.title,
            kind: kind_from_type(&dir.kind),
            agent: dir.agent.unwrap_or_default(),
        })
        .collect()
}

fn kind_from_type(kind: &str) -> SectionKind {
    match kind {
        "movie" => SectionKind::Movie,
        "show" => SectionKind::Show,
        _ => SectionKind::Other,
    }
}

fn to_items(container: MediaContainer) -> Vec<MediaItem> {
    container
        .metadata
        .into_iter()
        .map(|entry| MediaItem {
            key: entry.key,
            title: entry.title,
        })
        .collect()
}

/// Collapse a metadata response into the fields descriptor resolution
/// needs.
///
/// For TV shows the container's parent title/year identify the show
/// rather than the episode; for movies `originalTitle` carries the
/// untranslated title when the library language differs.
fn to_item_metadata(container: MediaContainer) -> Option<ItemMetadata> {
    let parent_title = container.parent_title;
    let parent_year = container.parent_year;
    let first = container.metadata.into_iter().next()?;

    let title = parent_title
        .or(first.original_title)
        .or(first.title)
        .unwrap_or_default();

    Some(ItemMetadata {
        guid: first.guid,
        title,
        year: parent_year.or(first.year),
    })
}
