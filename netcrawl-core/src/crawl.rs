use crate::canonical::{CanonicalUrl, HrefRejection};
use netcrawl_scanner::{LinkFetcher, RawHref};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Number of unique URLs a crawl collects unless told otherwise.
pub const DEFAULT_TARGET: usize = 100;

/// Snapshot handed to the progress callback before each page is fetched
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    pub current: String,
    pub pages_fetched: usize,
    pub accepted: usize,
    pub frontier: usize,
}

/// Callback for reporting crawl progress
pub type ProgressCallback = Arc<dyn Fn(CrawlProgress) + Send + Sync>;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The accepted set reached the target size.
    TargetReached,
    /// Nothing was left to visit. Fewer URLs than the target is a normal result.
    FrontierExhausted,
    /// The configured page budget ran out before either of the above.
    PageLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    /// Failures where the server answered with an error status; a subset of
    /// `fetch_failures`.
    pub status_failures: usize,
    pub revisits_skipped: usize,
    pub hrefs_seen: usize,
    pub hrefs_absent: usize,
    pub hrefs_unparsable: usize,
    pub hrefs_mail: usize,
    pub hrefs_without_authority: usize,
    pub duplicate_domains: usize,
    pub frontier_pushed: usize,
    pub frontier_remaining: usize,
}

impl CrawlStats {
    pub fn hrefs_skipped(&self) -> usize {
        self.hrefs_absent + self.hrefs_unparsable + self.hrefs_mail + self.hrefs_without_authority
    }

    fn record_rejection(&mut self, rejection: &HrefRejection) {
        match rejection {
            HrefRejection::Absent => self.hrefs_absent += 1,
            HrefRejection::Unparsable { .. } => self.hrefs_unparsable += 1,
            HrefRejection::MailScheme(_) => self.hrefs_mail += 1,
            HrefRejection::MissingAuthority(_) => self.hrefs_without_authority += 1,
        }
    }
}

/// Result of one crawl: the accepted URLs in acceptance order plus
/// bookkeeping about how the crawl went.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    pub accepted: Vec<CanonicalUrl>,
    pub stats: CrawlStats,
    pub termination: Termination,
}

/// All mutable state of a single crawl.
struct CrawlContext {
    frontier: VecDeque<String>,
    visited: HashSet<String>,
    accepted: Vec<CanonicalUrl>,
    seen_domains: HashSet<String>,
    stats: CrawlStats,
    target: usize,
}

impl CrawlContext {
    fn new(seed: &str, target: usize) -> Self {
        let mut frontier = VecDeque::new();
        // The seed goes in as given; only discovered hrefs are canonicalized.
        frontier.push_back(seed.to_string());

        Self {
            frontier,
            visited: HashSet::new(),
            accepted: Vec::new(),
            seen_domains: HashSet::new(),
            stats: CrawlStats::default(),
            target,
        }
    }

    fn target_reached(&self) -> bool {
        self.accepted.len() >= self.target
    }

    /// Processes the hrefs of one page in document order. Stops as soon as
    /// the target is reached, leaving the rest of the page unscanned.
    fn scan_page(&mut self, hrefs: Vec<RawHref>) {
        for href in hrefs {
            self.stats.hrefs_seen += 1;

            let url = match CanonicalUrl::from_href(href.as_deref()) {
                Ok(url) => url,
                Err(rejection) => {
                    trace!("Skipping href: {}", rejection);
                    self.stats.record_rejection(&rejection);
                    continue;
                }
            };

            // Every valid link is future work, accepted or not.
            self.frontier.push_back(url.as_str().to_string());
            self.stats.frontier_pushed += 1;

            if self.offer(url) && self.target_reached() {
                return;
            }
        }
    }

    /// Accepts `url` unless its domain already has a representative.
    fn offer(&mut self, url: CanonicalUrl) -> bool {
        if self.seen_domains.contains(url.domain()) {
            trace!("Domain {} already represented, not accepting {}", url.domain(), url);
            self.stats.duplicate_domains += 1;
            return false;
        }

        debug!("Accepted {} ({}/{})", url, self.accepted.len() + 1, self.target);
        self.seen_domains.insert(url.domain().to_string());
        self.accepted.push(url);
        true
    }

    /// Pops the next URL not yet fetched in this crawl.
    fn next_unvisited(&mut self) -> Option<String> {
        while let Some(url) = self.frontier.pop_front() {
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
            self.stats.revisits_skipped += 1;
        }
        None
    }

    fn finish(mut self) -> CrawlOutcome {
        let termination = if self.target_reached() {
            Termination::TargetReached
        } else if self.frontier.is_empty() {
            Termination::FrontierExhausted
        } else {
            Termination::PageLimit
        };
        self.stats.frontier_remaining = self.frontier.len();

        CrawlOutcome {
            accepted: self.accepted,
            stats: self.stats,
            termination,
        }
    }
}

/// Breadth-first link discovery that keeps at most one URL per domain.
///
/// The engine pops URLs from a FIFO frontier, asks its `LinkFetcher` for the
/// page's hrefs and canonicalizes them. Every valid href is queued for a later
/// visit, but only the first URL seen for each domain is accepted. The crawl
/// ends when `target` URLs are accepted, the frontier runs dry, or the
/// optional page budget is spent.
pub struct DiscoveryEngine<F> {
    fetcher: F,
    target: usize,
    max_pages: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl<F: LinkFetcher> DiscoveryEngine<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            target: DEFAULT_TARGET,
            max_pages: None,
            progress_callback: None,
        }
    }

    /// Sets the number of unique URLs to collect. Values below 1 are raised to 1.
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target.max(1);
        self
    }

    /// Caps the number of pages fetched. Unlimited by default.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn crawl(&self, seed: &str) -> CrawlOutcome {
        info!("Starting crawl of {} (target: {} unique urls)", seed, self.target);

        let mut ctx = CrawlContext::new(seed, self.target);

        while !ctx.target_reached() {
            if self
                .max_pages
                .is_some_and(|max| ctx.stats.pages_fetched >= max)
            {
                debug!("Page budget of {:?} exhausted", self.max_pages);
                break;
            }

            let Some(current) = ctx.next_unvisited() else {
                break;
            };

            if let Some(ref callback) = self.progress_callback {
                callback(CrawlProgress {
                    current: current.clone(),
                    pages_fetched: ctx.stats.pages_fetched,
                    accepted: ctx.accepted.len(),
                    frontier: ctx.frontier.len(),
                });
            }

            ctx.stats.pages_fetched += 1;
            let hrefs = match self.fetcher.fetch_links(&current).await {
                Ok(hrefs) => hrefs,
                Err(e) => {
                    if e.is_status() {
                        info!("Skipping {}: {}", current, e);
                        ctx.stats.status_failures += 1;
                    } else {
                        warn!("Fetch failed for {}: {}", current, e);
                    }
                    ctx.stats.fetch_failures += 1;
                    continue;
                }
            };

            debug!("{} yielded {} hrefs", current, hrefs.len());
            ctx.scan_page(hrefs);
        }

        let outcome = ctx.finish();
        info!(
            "Crawl complete. {} unique urls from {} pages ({:?}, {} left in frontier)",
            outcome.accepted.len(),
            outcome.stats.pages_fetched,
            outcome.termination,
            outcome.stats.frontier_remaining
        );
        outcome
    }
}
