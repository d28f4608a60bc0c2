use flixscan_core::report::{ReportEvent, Reporter};

/// Reporter that prints per-item results and the final summary to
/// stdout.
///
/// Diagnostic logging goes to stderr via `tracing`; stdout carries only
/// the report itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: ReportEvent<'_>) {
        match event {
            ReportEvent::ConnectSuccess => {
                println!("Connected to Plex.");
            }
            ReportEvent::BeforeSection { section } => {
                println!("\nSearching in \"{}\"...", section.title);
            }
            ReportEvent::ItemAvailable { descriptor } => {
                println!("✓ {descriptor}");
            }
            ReportEvent::ItemUnavailable { descriptor } => {
                println!("✗ {descriptor}");
            }
            ReportEvent::ItemError { item, error } => {
                println!("! {} — {error}", item.label());
            }
            ReportEvent::AfterRun { tally } => {
                println!(
                    "\nSearched {} items, {} available on Netflix ({}%).",
                    tally.seen,
                    tally.available,
                    tally.available_percent()
                );
            }
        }
    }
}
