pub mod config;
pub mod descriptor;
pub mod error;
pub mod limiter;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod region;
pub mod report;
pub mod section;
pub mod testutil;
pub mod traits;

pub use config::{DEFAULT_MAX_CONCURRENT, RunConfig};
pub use descriptor::{ForeignGuidPolicy, SkipPolicy};
pub use error::AppError;
pub use limiter::ConcurrencyLimiter;
pub use models::{
    Descriptor, ItemMetadata, MediaItem, Outcome, Section, SectionKind, SkipReason, Tally,
};
pub use pipeline::PipelineDriver;
pub use region::Region;
pub use report::{ReportEvent, Reporter, TracingReporter};
pub use traits::{AvailabilityProbe, Catalog};
