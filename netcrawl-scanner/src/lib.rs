pub mod error;
pub mod fetcher;

pub use error::ScanError;
pub use fetcher::{FetcherConfig, HttpFetcher, LinkFetcher, RawHref, extract_hrefs};
