//! Plain-HTTP availability probe against the uNoGS search index.
//!
//! Builds the same advanced-search URL the site's own frontend uses and
//! scans the result listing for a title link. Pages that render their
//! listing client-side need the browser probe instead (`browser`
//! feature).

use std::sync::LazyLock;
use std::time::Duration;

use flixscan_core::error::AppError;
use flixscan_core::models::Descriptor;
use flixscan_core::region::Region;
use flixscan_core::traits::AvailabilityProbe;
use reqwest::Client;
use scraper::{Html, Selector};

/// Year range used when the descriptor has no release year.
const ANY_YEAR_RANGE: &str = "1900,2019";

static RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#listdiv a").expect("valid selector"));

/// Build the advanced-search URL for one descriptor in one region.
///
/// Searches by IMDb id when the descriptor has one, otherwise by title;
/// the year range is pinned to the known release year when present.
pub(crate) fn search_url(descriptor: &Descriptor, region: Region) -> String {
    let year_range = descriptor
        .year
        .map(|year| format!("{year},{year}"))
        .unwrap_or_else(|| ANY_YEAR_RANGE.to_string());

    format!(
        "https://unogs.com/?q={query}-!{year_range}-!0,5-!0,10-!0,10-!Any-!Any-!Any-!Any-!I%20Don&cl={region_id},&pt=&st=adv&p=1&ao=and",
        query = descriptor.search_key(),
        region_id = region.catalog_id(),
    )
}

/// A result listing with at least one `/video/?v=<id>` link means the
/// title exists in the region's catalog.
pub(crate) fn parse_listing(html: &str) -> bool {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_LINKS)
        .filter_map(|link| link.value().attr("href"))
        .any(|href| href.contains("/video/?v="))
}

/// Availability probe using plain HTTP GETs.
#[derive(Clone)]
pub struct UnogsHttpProbe {
    client: Client,
    timeout_secs: u64,
}

impl UnogsHttpProbe {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("flixscan/0.2")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl AvailabilityProbe for UnogsHttpProbe {
    async fn check(&self, descriptor: &Descriptor, region: Region) -> Result<bool, AppError> {
        let url = search_url(descriptor, region);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::ProbeError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ProbeError(format!(
                "HTTP {} from availability index",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ProbeError(format!("Failed to read response body: {e}")))?;

        Ok(parse_listing(&body))
    }
}
