use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use flixscan_core::error::AppError;
use flixscan_core::models::Descriptor;
use flixscan_core::region::Region;
use flixscan_core::traits::AvailabilityProbe;
use futures::StreamExt;

use crate::unogs::{parse_listing, search_url};

/// Headless-browser availability probe using Chromium via the Chrome
/// DevTools Protocol.
///
/// Unlike [`super::UnogsHttpProbe`], this renders JavaScript before
/// reading the result listing, so it also works when the index builds
/// its listing client-side. One Chromium process is shared across all
/// clones; each [`AvailabilityProbe::check`] call opens a new tab, reads
/// the rendered listing, and closes the tab.
#[derive(Clone)]
pub struct UnogsBrowserProbe {
    browser: Arc<Browser>,
    timeout: Duration,
}

impl UnogsBrowserProbe {
    /// Launches a headless Chromium browser with a **30 s** navigation
    /// timeout.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`).
    pub async fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30)).await
    }

    /// Launches a headless Chromium browser with a custom navigation
    /// timeout.
    pub async fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        // Distro wrapper scripts (snap in particular) strip the flags
        // below, so point chromiumoxide at a concrete binary when one
        // can be found.
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::Generic(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Generic(format!("Failed to launch browser: {e}")))?;

        // chromiumoxide's handler stream has to be drained for the CDP
        // connection to stay alive.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            timeout,
        })
    }

    /// Locates a Chrome/Chromium binary that accepts our CLI flags.
    ///
    /// `CHROME_BIN` wins when set. Otherwise the snap-internal binary is
    /// checked before the usual system paths, since `/snap/bin/chromium`
    /// is a wrapper that drops unknown flags. Returns `None` to let
    /// `chromiumoxide` run its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        [
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }
}

impl AvailabilityProbe for UnogsBrowserProbe {
    async fn check(&self, descriptor: &Descriptor, region: Region) -> Result<bool, AppError> {
        let url = search_url(descriptor, region);
        let timeout = self.timeout;

        let result = tokio::time::timeout(timeout, async {
            // Open a new tab and navigate to the search URL.
            let page = self.browser.new_page(url.as_str()).await.map_err(|e| {
                AppError::ProbeError(format!("Failed to navigate to search page: {e}"))
            })?;

            // Wait until the result listing is present — the page builds
            // it after load, so <body> alone is not enough.
            page.find_element("#listdiv").await.map_err(|e| {
                AppError::ProbeError(format!("Result listing did not render: {e}"))
            })?;

            // Grab the fully-rendered DOM.
            let html = page
                .content()
                .await
                .map_err(|e| AppError::ProbeError(format!("Failed to read page content: {e}")))?;

            // Close the tab to free browser resources.
            let _ = page.close().await;

            Ok::<bool, AppError>(parse_listing(&html))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(timeout.as_secs())),
        }
    }
}
