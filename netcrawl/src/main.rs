use colored::Colorize;
use netcrawl::{CrawlArgs, command_argument_builder, handle_crawl, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = command_argument_builder().get_matches();

    let args = match CrawlArgs::from_matches(&matches) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    init_tracing(args.verbosity);

    if let Err(e) = handle_crawl(args).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
