use thiserror::Error;

/// Application-wide error types for flixscan.
#[derive(Error, Debug)]
pub enum AppError {
    /// Catalog connection or authentication failed.
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Availability probe call failed (network, automation timeout).
    #[error("Probe error: {0}")]
    ProbeError(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Region code outside the supported set.
    #[error("The region code \"{0}\" does not work with this application")]
    UnsupportedRegion(String),

    /// Invalid run configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A requested library section does not exist.
    #[error("Library section \"{requested}\" not found. Searched in sections: {}", .available.join(", "))]
    SectionNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// A library section enumerated zero items.
    #[error("No media found in library section \"{title}\"")]
    EmptySection { title: String },

    /// Discovery resolved no eligible library sections.
    #[error("No eligible library sections found")]
    NoSections,

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error terminates the whole run.
    ///
    /// Fatal errors propagate unchanged through the section runner and
    /// pipeline driver; everything else is absorbed at the item boundary
    /// and recorded as a `Failed` outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::CatalogError(_)
                | AppError::UnsupportedRegion(_)
                | AppError::ConfigError(_)
                | AppError::SectionNotFound { .. }
                | AppError::EmptySection { .. }
                | AppError::NoSections
        )
    }
}
