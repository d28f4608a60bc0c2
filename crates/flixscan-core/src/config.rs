use crate::error::AppError;
use crate::region::Region;

/// Default cap on concurrently outstanding probe calls.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Configuration for one pipeline run.
///
/// Threaded explicitly through the driver down to the probe call sites;
/// there is no ambient/global state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of in-flight probe calls across the whole run.
    pub max_concurrent: usize,
    /// Explicit ordered list of section names to process. `None` means
    /// filtered discovery over all catalog sections.
    pub requested_sections: Option<Vec<String>>,
    /// Restrict item enumeration to a release year.
    pub year: Option<u16>,
    /// Netflix region to check availability in.
    pub region: Region,
}

impl RunConfig {
    pub fn new(region: Region) -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            requested_sections: None,
            year: None,
            region,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_requested_sections(mut self, sections: Vec<String>) -> Self {
        self.requested_sections = Some(sections);
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_concurrent == 0 {
            return Err(AppError::ConfigError(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if let Some(sections) = &self.requested_sections {
            if sections.is_empty() {
                return Err(AppError::ConfigError(
                    "requested section list must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
