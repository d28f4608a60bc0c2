#[cfg(feature = "browser")]
pub mod browser;
pub mod plex;
pub mod report;
pub mod unogs;

#[cfg(feature = "browser")]
pub use browser::UnogsBrowserProbe;
pub use plex::PlexCatalog;
pub use report::ConsoleReporter;
pub use unogs::UnogsHttpProbe;
