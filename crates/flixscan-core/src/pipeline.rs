use std::sync::Arc;

use crate::config::RunConfig;
use crate::descriptor::SkipPolicy;
use crate::error::AppError;
use crate::limiter::ConcurrencyLimiter;
use crate::models::{Section, SectionKind, Tally};
use crate::processor::ItemProcessor;
use crate::report::{ReportEvent, Reporter};
use crate::section::SectionRunner;
use crate::traits::{AvailabilityProbe, Catalog};

/// Runs the whole availability check: section resolution, then one
/// section at a time, folding section tallies into the global one.
///
/// Sections execute strictly sequentially — the next section starts only
/// after every item of the previous one has reached a terminal outcome.
/// Items inside a section fan out up to the configured concurrency cap,
/// enforced by one limiter shared across the entire run.
pub struct PipelineDriver<C, P, S, R>
where
    C: Catalog,
    P: AvailabilityProbe,
    S: SkipPolicy,
    R: Reporter,
{
    catalog: C,
    probe: P,
    policy: S,
    reporter: Arc<R>,
    config: RunConfig,
}

impl<C, P, S, R> PipelineDriver<C, P, S, R>
where
    C: Catalog + 'static,
    P: AvailabilityProbe + 'static,
    S: SkipPolicy + 'static,
    R: Reporter + 'static,
{
    pub fn new(catalog: C, probe: P, policy: S, reporter: Arc<R>, config: RunConfig) -> Self {
        Self {
            catalog,
            probe,
            policy,
            reporter,
            config,
        }
    }

    /// Run the pipeline to completion and return the global tally.
    ///
    /// Fatal conditions (connection failure, bad configuration, an
    /// unmatched requested section name, an empty section) abort the
    /// whole run before any further work is dispatched.
    pub async fn run(&self) -> Result<Tally, AppError> {
        self.config.validate()?;

        let discovered = self.catalog.sections().await?;
        self.reporter.report(ReportEvent::ConnectSuccess);

        let sections = match &self.config.requested_sections {
            Some(names) => find_requested(&discovered, names)?,
            None => discover(discovered),
        };
        if sections.is_empty() {
            return Err(AppError::NoSections);
        }

        let limiter = ConcurrencyLimiter::new(self.config.max_concurrent);
        let processor = ItemProcessor::new(
            self.catalog.clone(),
            self.probe.clone(),
            self.policy.clone(),
            limiter,
            self.config.region,
        );
        let runner = SectionRunner::new(
            self.catalog.clone(),
            processor,
            Arc::clone(&self.reporter),
            self.config.year,
        );

        let mut tally = Tally::default();
        for section in &sections {
            self.reporter.report(ReportEvent::BeforeSection { section });
            let section_tally = runner.run(section).await?;
            tally.merge(section_tally);
        }

        self.reporter.report(ReportEvent::AfterRun { tally });
        Ok(tally)
    }
}

/// Match an explicit requested list against the discovered sections,
/// preserving the requested order. Every name must match before any
/// section work starts; an unmatched name is fatal and cites the
/// available titles.
fn find_requested(discovered: &[Section], names: &[String]) -> Result<Vec<Section>, AppError> {
    names
        .iter()
        .map(|name| {
            discovered
                .iter()
                .find(|section| section.title == *name)
                .cloned()
                .ok_or_else(|| AppError::SectionNotFound {
                    requested: name.clone(),
                    available: discovered.iter().map(|s| s.title.clone()).collect(),
                })
        })
        .collect()
}

/// Filtered discovery: only movie and show sections backed by a real
/// metadata agent are eligible.
fn discover(discovered: Vec<Section>) -> Vec<Section> {
    discovered
        .into_iter()
        .filter(|section| {
            matches!(section.kind, SectionKind::Movie | SectionKind::Show)
                && section.has_metadata_agent()
        })
        .collect()
}
