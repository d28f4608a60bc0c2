use std::future::Future;

use crate::error::AppError;
use crate::models::{ItemMetadata, MediaItem, Section};
use crate::region::Region;

/// Read-only view of the media catalog (the Plex server).
///
/// Connection/auth failures surfaced by [`sections`](Catalog::sections)
/// are fatal to the run; per-item [`metadata`](Catalog::metadata)
/// failures are absorbed at the item boundary.
pub trait Catalog: Send + Sync + Clone {
    /// Enumerate all library sections.
    fn sections(&self) -> impl Future<Output = Result<Vec<Section>, AppError>> + Send;

    /// Enumerate the items of one section, optionally restricted to a
    /// release year.
    fn items(
        &self,
        section: &Section,
        year: Option<u16>,
    ) -> impl Future<Output = Result<Vec<MediaItem>, AppError>> + Send;

    /// Fetch the full metadata record for one item. `None` when the
    /// catalog has no metadata for the key.
    fn metadata(
        &self,
        item: &MediaItem,
    ) -> impl Future<Output = Result<Option<ItemMetadata>, AppError>> + Send;
}

/// Checks whether one descriptor is available on the target service.
///
/// Pure interface over the scraping mechanism so the pipeline core is
/// testable with a fake probe (configurable latency, failure injection).
/// Transient failures are captured as `Failed` at the item level, not
/// retried here.
pub trait AvailabilityProbe: Send + Sync + Clone {
    /// `Ok(true)` when the descriptor is found in `region`'s catalog,
    /// `Ok(false)` on a definitive not-found.
    fn check(
        &self,
        descriptor: &crate::models::Descriptor,
        region: Region,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}
