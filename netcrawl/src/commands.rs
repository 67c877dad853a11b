use clap::{ArgAction, arg};

/// Seed used when none is given on the command line.
pub const DEFAULT_SEED: &str = "https://news.ycombinator.com";

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("netcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("netcrawl")
        .styles(CLAP_STYLING)
        .about(
            "Follow links breadth-first from a seed URL until enough unique, \
            domain-diverse URLs are found, then print them.",
        )
        .arg(
            arg!([SEED])
                .required(false)
                .help("The URL to start crawling from")
                .default_value(DEFAULT_SEED),
        )
        .arg(
            arg!(-n --"target" <COUNT>)
                .required(false)
                .help("Number of unique URLs to discover (at most one per domain)")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("100"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"max-pages" <COUNT>)
                .required(false)
                .help("Stop after fetching this many pages (default: no limit)")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: print to stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(arg!(-q --"quiet" "Suppress progress and status output on stderr").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .required(false)
                .action(ArgAction::Count),
        )
}
