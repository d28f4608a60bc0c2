use std::sync::Arc;

use tokio::task::JoinSet;

use crate::descriptor::SkipPolicy;
use crate::error::AppError;
use crate::models::{Outcome, Section, Tally};
use crate::processor::ItemProcessor;
use crate::report::Reporter;
use crate::traits::{AvailabilityProbe, Catalog};

/// Drives the item processor over every item of one section.
///
/// Items fan out concurrently, each gated by the limiter the processor
/// shares with the whole run; the runner returns only once every item
/// has reached a terminal outcome, so sections never overlap in time.
pub struct SectionRunner<C, P, S, R>
where
    C: Catalog,
    P: AvailabilityProbe,
    S: SkipPolicy,
    R: Reporter,
{
    catalog: C,
    processor: ItemProcessor<C, P, S>,
    reporter: Arc<R>,
    year: Option<u16>,
}

impl<C, P, S, R> SectionRunner<C, P, S, R>
where
    C: Catalog + 'static,
    P: AvailabilityProbe + 'static,
    S: SkipPolicy + 'static,
    R: Reporter + 'static,
{
    pub fn new(
        catalog: C,
        processor: ItemProcessor<C, P, S>,
        reporter: Arc<R>,
        year: Option<u16>,
    ) -> Self {
        Self {
            catalog,
            processor,
            reporter,
            year,
        }
    }

    /// Check every item of `section` and return its tally.
    ///
    /// A section with zero items is fatal to the run; an individual
    /// item's failure is not.
    pub async fn run(&self, section: &Section) -> Result<Tally, AppError> {
        let items = self.catalog.items(section, self.year).await?;
        if items.is_empty() {
            return Err(AppError::EmptySection {
                title: section.title.clone(),
            });
        }

        let mut tally = Tally {
            seen: items.len() as u64,
            available: 0,
        };

        let mut tasks = JoinSet::new();
        for item in items {
            let processor = self.processor.clone();
            let reporter = Arc::clone(&self.reporter);
            tasks.spawn(async move { processor.process(&item, reporter.as_ref()).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Outcome::Available) => tally.available += 1,
                Ok(_) => {}
                Err(e) => {
                    // A panicked item task counts as seen but never
                    // available; siblings are unaffected.
                    tracing::error!(section = %section.title, error = %e, "Item task failed");
                }
            }
        }

        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::descriptor::ForeignGuidPolicy;
    use crate::limiter::ConcurrencyLimiter;
    use crate::region::Region;
    use crate::testutil::*;

    fn runner(
        catalog: MockCatalog,
        probe: MockProbe,
        max_concurrent: usize,
    ) -> SectionRunner<MockCatalog, MockProbe, ForeignGuidPolicy, RecordingReporter> {
        let region: Region = "us".parse().unwrap();
        let processor = ItemProcessor::new(
            catalog.clone(),
            probe,
            ForeignGuidPolicy,
            ConcurrencyLimiter::new(max_concurrent),
            region,
        );
        SectionRunner::new(catalog, processor, Arc::new(RecordingReporter::default()), None)
    }

    #[tokio::test]
    async fn test_empty_section_is_fatal() {
        let section = make_section("1", "Movies");
        let catalog = MockCatalog::new().with_section(section.clone(), vec![]);

        let runner = runner(catalog, MockProbe::new(), 2);
        let err = runner.run(&section).await.unwrap_err();

        assert!(matches!(err, AppError::EmptySection { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_tally_counts_mixed_outcomes() {
        // Three items with probe results found / not found / error, at
        // max_concurrent=1: seen 3, available 1.
        let section = make_section("1", "Movies");
        let items = vec![
            make_item("/library/metadata/1", "A"),
            make_item("/library/metadata/2", "B"),
            make_item("/library/metadata/3", "C"),
        ];
        let catalog = MockCatalog::new()
            .with_section(section.clone(), items)
            .with_metadata("/library/metadata/1", make_meta(None, "A", None))
            .with_metadata("/library/metadata/2", make_meta(None, "B", None))
            .with_metadata("/library/metadata/3", make_meta(None, "C", None));
        let probe = MockProbe::new()
            .found_for("A", true)
            .found_for("B", false)
            .error_for("C", AppError::ProbeError("boom".into()));

        let runner = runner(catalog, probe.clone(), 1);
        let tally = runner.run(&section).await.unwrap();

        assert_eq!(tally, Tally { seen: 3, available: 1 });
        assert_eq!(probe.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_skipped_items_count_seen_but_not_available() {
        let section = make_section("1", "Movies");
        let items = vec![
            make_item("/library/metadata/1", "A"),
            make_item("/library/metadata/2", "B"),
        ];
        let catalog = MockCatalog::new()
            .with_section(section.clone(), items)
            .with_metadata("/library/metadata/1", make_meta(None, "A", None))
            .with_metadata("/library/metadata/2", make_meta(None, "", None));
        let probe = MockProbe::new().found_for("A", true);

        let runner = runner(catalog, probe.clone(), 2);
        let tally = runner.run(&section).await.unwrap();

        assert_eq!(tally, Tally { seen: 2, available: 1 });
        // The skipped item never reached the probe.
        assert_eq!(probe.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        let section = make_section("1", "Movies");
        let items: Vec<_> = (0..8)
            .map(|i| make_item(&format!("/library/metadata/{i}"), &format!("T{i}")))
            .collect();
        let mut catalog = MockCatalog::new().with_section(section.clone(), items);
        let mut probe = MockProbe::new().with_latency(Duration::from_millis(20));
        for i in 0..8 {
            catalog = catalog.with_metadata(
                &format!("/library/metadata/{i}"),
                make_meta(None, &format!("T{i}"), None),
            );
            probe = probe.found_for(&format!("T{i}"), i % 2 == 0);
        }

        let runner = runner(catalog, probe.clone(), 2);
        let tally = runner.run(&section).await.unwrap();

        assert_eq!(tally.seen, 8);
        assert_eq!(probe.calls.lock().unwrap().len(), 8);
        assert!(probe.high_water.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_siblings() {
        let section = make_section("1", "Movies");
        let items = vec![
            make_item("/library/metadata/1", "A"),
            make_item("/library/metadata/2", "B"),
            make_item("/library/metadata/3", "C"),
        ];
        let catalog = MockCatalog::new()
            .with_section(section.clone(), items)
            .with_metadata("/library/metadata/1", make_meta(None, "A", None))
            .with_metadata("/library/metadata/2", make_meta(None, "B", None))
            .with_metadata("/library/metadata/3", make_meta(None, "C", None));
        let probe = MockProbe::new()
            .error_for("A", AppError::NetworkError("reset".into()))
            .found_for("B", true)
            .found_for("C", true);

        let runner = runner(catalog, probe.clone(), 3);
        let tally = runner.run(&section).await.unwrap();

        assert_eq!(tally, Tally { seen: 3, available: 2 });
        assert_eq!(probe.calls.lock().unwrap().len(), 3);
    }
}
