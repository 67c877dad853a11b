pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, DEFAULT_SEED, command_argument_builder};
pub use handlers::{CrawlArgs, handle_crawl, init_tracing, log_level, write_report};
