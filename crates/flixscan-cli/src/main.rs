use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flixscan_client::{ConsoleReporter, PlexCatalog, UnogsHttpProbe};
use flixscan_core::traits::AvailabilityProbe;
use flixscan_core::{ForeignGuidPolicy, PipelineDriver, Region, RunConfig};

#[derive(Parser)]
#[command(
    name = "flixscan",
    version,
    about = "Check which titles in a Plex library are available on Netflix"
)]
struct Cli {
    /// Plex server hostname
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// Plex server port
    #[arg(long, default_value_t = 32400)]
    port: u16,

    /// Plex auth token (reads from PLEX_TOKEN env var if not provided)
    #[arg(long, env = "PLEX_TOKEN")]
    token: Option<String>,

    /// Netflix region to check availability in (e.g. "us", "se", "gb")
    #[arg(short, long, default_value = "us")]
    region: String,

    /// Library section to search; repeatable, searched in the given
    /// order (default: every movie/show section)
    #[arg(short, long = "section")]
    sections: Vec<String>,

    /// Only check items released in this year
    #[arg(short, long)]
    year: Option<u16>,

    /// Maximum number of concurrent availability checks
    #[arg(long, default_value_t = flixscan_core::DEFAULT_MAX_CONCURRENT)]
    max_concurrent: usize,

    /// Use a headless browser for availability checks (renders
    /// JavaScript, slower)
    #[cfg(feature = "browser")]
    #[arg(long, default_value_t = false)]
    browser: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing; the report owns stdout, diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flixscan=warn".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Region validation happens before anything touches the catalog.
    let region: Region = cli.region.parse()?;

    let mut config = RunConfig::new(region).with_max_concurrent(cli.max_concurrent);
    if !cli.sections.is_empty() {
        config = config.with_requested_sections(cli.sections.clone());
    }
    if let Some(year) = cli.year {
        config = config.with_year(year);
    }

    let catalog = PlexCatalog::new(&cli.hostname, cli.port, cli.token.clone())?;

    #[cfg(feature = "browser")]
    if cli.browser {
        let probe = flixscan_client::UnogsBrowserProbe::new().await?;
        return run(catalog, probe, config).await;
    }

    let probe = UnogsHttpProbe::new()?;
    run(catalog, probe, config).await
}

async fn run<P>(catalog: PlexCatalog, probe: P, config: RunConfig) -> Result<()>
where
    P: AvailabilityProbe + 'static,
{
    let driver = PipelineDriver::new(
        catalog,
        probe,
        ForeignGuidPolicy,
        Arc::new(ConsoleReporter),
        config,
    );
    driver.run().await?;
    Ok(())
}
