use crate::descriptor::{self, SkipPolicy};
use crate::limiter::ConcurrencyLimiter;
use crate::models::{MediaItem, Outcome, SkipReason};
use crate::region::Region;
use crate::report::{ReportEvent, Reporter};
use crate::traits::{AvailabilityProbe, Catalog};

/// Orchestrates one item: resolve its descriptor, probe availability
/// through the shared limiter, classify the outcome, and emit a report
/// event.
///
/// [`process`](Self::process) never propagates errors — every failure is
/// captured as a `Failed` outcome, so one item can never abort its
/// siblings.
#[derive(Clone)]
pub struct ItemProcessor<C, P, S>
where
    C: Catalog,
    P: AvailabilityProbe,
    S: SkipPolicy,
{
    catalog: C,
    probe: P,
    policy: S,
    limiter: ConcurrencyLimiter,
    region: Region,
}

impl<C, P, S> ItemProcessor<C, P, S>
where
    C: Catalog,
    P: AvailabilityProbe,
    S: SkipPolicy,
{
    pub fn new(
        catalog: C,
        probe: P,
        policy: S,
        limiter: ConcurrencyLimiter,
        region: Region,
    ) -> Self {
        Self {
            catalog,
            probe,
            policy,
            limiter,
            region,
        }
    }

    /// Process one item to a terminal [`Outcome`].
    ///
    /// Items without a usable identity are classified `Skipped` without
    /// ever touching the limiter; for the rest a permit is held for
    /// exactly the duration of the probe call and released on both the
    /// success and failure path.
    pub async fn process<R: Reporter>(&self, item: &MediaItem, reporter: &R) -> Outcome {
        let meta = match self.catalog.metadata(item).await {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                tracing::debug!(item = %item.label(), "No metadata record, skipping");
                return Outcome::Skipped(SkipReason::NoIdentity);
            }
            Err(e) => {
                let error = e.to_string();
                reporter.report(ReportEvent::ItemError {
                    item,
                    error: &error,
                });
                return Outcome::Failed(error);
            }
        };

        let descriptor = match descriptor::resolve(&meta, &self.policy) {
            Ok(descriptor) => descriptor,
            Err(reason) => {
                tracing::debug!(item = %item.label(), %reason, "Skipping item");
                return Outcome::Skipped(reason);
            }
        };

        let _permit = self.limiter.admit().await;
        match self.probe.check(&descriptor, self.region).await {
            Ok(true) => {
                reporter.report(ReportEvent::ItemAvailable {
                    descriptor: &descriptor,
                });
                Outcome::Available
            }
            Ok(false) => {
                reporter.report(ReportEvent::ItemUnavailable {
                    descriptor: &descriptor,
                });
                Outcome::Unavailable
            }
            Err(e) => {
                let error = e.to_string();
                reporter.report(ReportEvent::ItemError {
                    item,
                    error: &error,
                });
                Outcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ForeignGuidPolicy;
    use crate::error::AppError;
    use crate::testutil::*;

    fn region() -> Region {
        "us".parse().unwrap()
    }

    fn processor(
        catalog: MockCatalog,
        probe: MockProbe,
        limiter: ConcurrencyLimiter,
    ) -> ItemProcessor<MockCatalog, MockProbe, ForeignGuidPolicy> {
        ItemProcessor::new(catalog, probe, ForeignGuidPolicy, limiter, region())
    }

    #[tokio::test]
    async fn test_available_outcome_and_event() {
        let item = make_item("/library/metadata/1", "The Americans");
        let catalog = MockCatalog::new().with_metadata(
            &item.key,
            make_meta(Some("com.plexapp.agents.imdb://tt2149175"), "The Americans", Some(2013)),
        );
        let probe = MockProbe::new().found_for("tt2149175", true);
        let reporter = RecordingReporter::default();

        let proc = processor(catalog, probe.clone(), ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &reporter).await;

        assert_eq!(outcome, Outcome::Available);
        assert_eq!(reporter.labels(), vec!["available:tt2149175"]);
        assert_eq!(probe.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_outcome_and_event() {
        let item = make_item("/library/metadata/2", "Heat");
        let catalog = MockCatalog::new()
            .with_metadata(&item.key, make_meta(None, "Heat (1995)", Some(1995)));
        let probe = MockProbe::new().found_for("Heat", false);
        let reporter = RecordingReporter::default();

        let proc = processor(catalog, probe, ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &reporter).await;

        assert_eq!(outcome, Outcome::Unavailable);
        assert_eq!(reporter.labels(), vec!["unavailable:Heat"]);
    }

    #[tokio::test]
    async fn test_no_identity_skips_without_probe_call() {
        let item = make_item("/library/metadata/3", "???");
        let catalog = MockCatalog::new().with_metadata(&item.key, make_meta(None, "", None));
        let probe = MockProbe::new();
        let reporter = RecordingReporter::default();

        let proc = processor(catalog, probe.clone(), ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &reporter).await;

        assert_eq!(outcome, Outcome::Skipped(SkipReason::NoIdentity));
        assert!(probe.calls.lock().unwrap().is_empty());
        assert!(reporter.labels().is_empty());
    }

    #[tokio::test]
    async fn test_missing_metadata_record_skips() {
        let item = make_item("/library/metadata/4", "Ghost");
        let catalog = MockCatalog::new();
        let probe = MockProbe::new();

        let proc = processor(catalog, probe.clone(), ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &RecordingReporter::default()).await;

        assert_eq!(outcome, Outcome::Skipped(SkipReason::NoIdentity));
        assert!(probe.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_probe_error_becomes_failed_outcome() {
        let item = make_item("/library/metadata/5", "Tremors");
        let catalog = MockCatalog::new()
            .with_metadata(&item.key, make_meta(None, "Tremors", Some(1990)));
        let probe = MockProbe::new()
            .error_for("Tremors", AppError::ProbeError("automation timeout".into()));
        let reporter = RecordingReporter::default();

        let proc = processor(catalog, probe, ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &reporter).await;

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(reporter.labels().len(), 1);
        assert!(reporter.labels()[0].starts_with("error:Tremors"));
    }

    #[tokio::test]
    async fn test_metadata_error_becomes_failed_outcome() {
        let item = make_item("/library/metadata/6", "Lost");
        let catalog = MockCatalog::new()
            .with_metadata_error(&item.key, AppError::HttpError("500".into()));
        let probe = MockProbe::new();

        let proc = processor(catalog, probe.clone(), ConcurrencyLimiter::new(1));
        let outcome = proc.process(&item, &RecordingReporter::default()).await;

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(probe.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permit_released_on_probe_failure() {
        let item = make_item("/library/metadata/7", "Alien");
        let catalog = MockCatalog::new()
            .with_metadata(&item.key, make_meta(None, "Alien", Some(1979)));
        let probe = MockProbe::new()
            .error_for("Alien", AppError::NetworkError("reset".into()));
        let limiter = ConcurrencyLimiter::new(1);

        let proc = processor(catalog, probe, limiter.clone());
        let _ = proc.process(&item, &RecordingReporter::default()).await;

        assert_eq!(limiter.available(), 1);
    }
}
