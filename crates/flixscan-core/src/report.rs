use crate::models::{Descriptor, MediaItem, Section, Tally};

/// Events emitted by the pipeline as results stream in.
///
/// Per-item events fire as each item settles (streaming, not batched);
/// the final summary fires once after all sections complete.
#[derive(Debug, Clone)]
pub enum ReportEvent<'a> {
    /// Catalog connection established.
    ConnectSuccess,
    /// A section is about to be searched.
    BeforeSection { section: &'a Section },
    /// Item found in the target region's catalog.
    ItemAvailable { descriptor: &'a Descriptor },
    /// Item definitively not found.
    ItemUnavailable { descriptor: &'a Descriptor },
    /// Probe or metadata lookup failed for an item.
    ItemError { item: &'a MediaItem, error: &'a str },
    /// Whole run finished.
    AfterRun { tally: Tally },
}

/// Sink for report events (decoupled output).
///
/// Fire-and-forget observer: implementations must not block beyond a
/// normal call/return, as they run on the pipeline's path.
pub trait Reporter: Send + Sync {
    fn report(&self, event: ReportEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: ReportEvent<'_>) {
        match event {
            ReportEvent::ConnectSuccess => {
                tracing::info!("Connected to catalog");
            }
            ReportEvent::BeforeSection { section } => {
                tracing::info!(section = %section.title, "Searching section");
            }
            ReportEvent::ItemAvailable { descriptor } => {
                tracing::info!(item = %descriptor, "Available");
            }
            ReportEvent::ItemUnavailable { descriptor } => {
                tracing::info!(item = %descriptor, "Unavailable");
            }
            ReportEvent::ItemError { item, error } => {
                tracing::warn!(item = %item.label(), %error, "Item check failed");
            }
            ReportEvent::AfterRun { tally } => {
                tracing::info!(
                    seen = tally.seen,
                    available = tally.available,
                    "Search finished"
                );
            }
        }
    }
}
