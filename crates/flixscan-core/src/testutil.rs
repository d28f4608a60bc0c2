//! Test utilities: mock implementations of the core trait seams.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks
//! use `Arc<Mutex<_>>` for interior mutability, allowing test assertions
//! on recorded calls. The probe additionally records its concurrent-call
//! high-water mark so tests can verify the limiter's cap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::{Descriptor, ItemMetadata, MediaItem, Section, SectionKind};
use crate::region::Region;
use crate::report::{ReportEvent, Reporter};
use crate::traits::{AvailabilityProbe, Catalog};

// ---------------------------------------------------------------------------
// MockCatalog
// ---------------------------------------------------------------------------

/// In-memory catalog with configurable sections, items, and metadata.
#[derive(Clone, Default)]
pub struct MockCatalog {
    sections: Arc<Mutex<Vec<Section>>>,
    /// Items per section key.
    items: Arc<Mutex<HashMap<String, Vec<MediaItem>>>>,
    /// Metadata per item key.
    metadata: Arc<Mutex<HashMap<String, ItemMetadata>>>,
    sections_error: Arc<Mutex<Option<AppError>>>,
    metadata_errors: Arc<Mutex<HashMap<String, AppError>>>,
    /// Recorded `(section key, year filter)` item queries.
    pub item_queries: Arc<Mutex<Vec<(String, Option<u16>)>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(self, section: Section, items: Vec<MediaItem>) -> Self {
        self.items
            .lock()
            .unwrap()
            .insert(section.key.clone(), items);
        self.sections.lock().unwrap().push(section);
        self
    }

    pub fn with_metadata(self, item_key: &str, meta: ItemMetadata) -> Self {
        self.metadata
            .lock()
            .unwrap()
            .insert(item_key.to_string(), meta);
        self
    }

    pub fn with_sections_error(self, error: AppError) -> Self {
        *self.sections_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_metadata_error(self, item_key: &str, error: AppError) -> Self {
        self.metadata_errors
            .lock()
            .unwrap()
            .insert(item_key.to_string(), error);
        self
    }
}

impl Catalog for MockCatalog {
    async fn sections(&self) -> Result<Vec<Section>, AppError> {
        if let Some(e) = self.sections_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.sections.lock().unwrap().clone())
    }

    async fn items(
        &self,
        section: &Section,
        year: Option<u16>,
    ) -> Result<Vec<MediaItem>, AppError> {
        self.item_queries
            .lock()
            .unwrap()
            .push((section.key.clone(), year));
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&section.key)
            .cloned()
            .unwrap_or_default())
    }

    async fn metadata(&self, item: &MediaItem) -> Result<Option<ItemMetadata>, AppError> {
        if let Some(e) = self.metadata_errors.lock().unwrap().remove(&item.key) {
            return Err(e);
        }
        Ok(self.metadata.lock().unwrap().get(&item.key).cloned())
    }
}

// ---------------------------------------------------------------------------
// MockProbe
// ---------------------------------------------------------------------------

/// Scripted availability probe with failure injection, configurable
/// latency, and concurrency instrumentation.
#[derive(Clone, Default)]
pub struct MockProbe {
    /// Result per descriptor search key; unscripted keys resolve to
    /// `Ok(false)`.
    results: Arc<Mutex<HashMap<String, Result<bool, AppError>>>>,
    latency: Option<Duration>,
    /// Search keys of every call made, in dispatch order.
    pub calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    /// Highest number of concurrently outstanding calls observed.
    pub high_water: Arc<AtomicUsize>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found_for(self, search_key: &str, found: bool) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(search_key.to_string(), Ok(found));
        self
    }

    pub fn error_for(self, search_key: &str, error: AppError) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(search_key.to_string(), Err(error));
        self
    }

    /// Hold each call open for `latency`, forcing calls to overlap so
    /// the high-water mark is meaningful.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl AvailabilityProbe for MockProbe {
    async fn check(&self, descriptor: &Descriptor, _region: Region) -> Result<bool, AppError> {
        let key = descriptor.search_key().to_string();
        self.calls.lock().unwrap().push(key.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = self
            .results
            .lock()
            .unwrap()
            .remove(&key)
            .unwrap_or(Ok(false));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records a flat label per event, in emission order.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: ReportEvent<'_>) {
        let label = match event {
            ReportEvent::ConnectSuccess => "connect".to_string(),
            ReportEvent::BeforeSection { section } => format!("before:{}", section.title),
            ReportEvent::ItemAvailable { descriptor } => {
                format!("available:{}", descriptor.search_key())
            }
            ReportEvent::ItemUnavailable { descriptor } => {
                format!("unavailable:{}", descriptor.search_key())
            }
            ReportEvent::ItemError { item, error } => {
                format!("error:{}:{}", item.label(), error)
            }
            ReportEvent::AfterRun { tally } => {
                format!("after:{}:{}", tally.seen, tally.available)
            }
        };
        self.events.lock().unwrap().push(label);
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Movie section backed by a real metadata agent.
pub fn make_section(key: &str, title: &str) -> Section {
    Section {
        key: key.to_string(),
        title: title.to_string(),
        kind: SectionKind::Movie,
        agent: "tv.plex.agents.movie".to_string(),
    }
}

pub fn make_item(key: &str, title: &str) -> MediaItem {
    MediaItem {
        key: key.to_string(),
        title: Some(title.to_string()),
    }
}

pub fn make_meta(guid: Option<&str>, title: &str, year: Option<u16>) -> ItemMetadata {
    ItemMetadata {
        guid: guid.map(str::to_string),
        title: title.to_string(),
        year,
    }
}
