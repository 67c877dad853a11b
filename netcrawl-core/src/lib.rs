pub mod canonical;
pub mod crawl;
pub mod report;

pub use canonical::{CanonicalUrl, HrefRejection};
pub use crawl::{
    CrawlOutcome, CrawlProgress, CrawlStats, DiscoveryEngine, ProgressCallback, Termination,
    DEFAULT_TARGET,
};
pub use report::{ReportFormat, generate_report};
