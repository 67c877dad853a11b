use crate::error::{Result, ScanError};
use reqwest::Client;
use scraper::{Html, Selector};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

/// An href attribute value as found in markup. `None` for anchors that
/// carry no href at all.
pub type RawHref = Option<String>;

/// Source of outgoing links for a page.
///
/// Implementations report failures through `Err`; callers decide whether a
/// failed page aborts anything. The crawl engine treats every error as
/// "no links on this page".
pub trait LinkFetcher {
    fn fetch_links(&self, url: &str) -> impl Future<Output = Result<Vec<RawHref>>>;
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl FetcherConfig {
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(timeout_secs.div_ceil(2)),
            ..Self::default()
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("netcrawl/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 5,
        }
    }
}

/// `LinkFetcher` backed by a reqwest client. Every request is bounded by
/// the configured timeout so a hanging server cannot stall a crawl.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ScanError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl LinkFetcher for HttpFetcher {
    async fn fetch_links(&self, url: &str) -> Result<Vec<RawHref>> {
        let target =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching {}", url);
        let start = Instant::now();
        let response = self.client.get(target).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let hrefs = extract_hrefs(&body);
        debug!(
            "{} answered {} with {} anchors in {:?}",
            url,
            status.as_u16(),
            hrefs.len(),
            start.elapsed()
        );

        Ok(hrefs)
    }
}

/// Returns the href of every `<a>` element in document order, keeping
/// anchors without an href as `None`.
pub fn extract_hrefs(html: &str) -> Vec<RawHref> {
    let document = Html::parse_document(html);
    let Ok(anchor_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .map(|element| {
            let href = element.value().attr("href").map(str::to_string);
            trace!("Found anchor: {:?}", href);
            href
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[test]
    fn test_extract_hrefs_keeps_document_order() {
        let html = r#"<html><body>
            <a href="https://a.com/x">A</a>
            <p><a href="/relative">Rel</a></p>
            <a href="mailto:foo@bar.com">Mail</a>
        </body></html>"#;

        let hrefs = extract_hrefs(html);

        assert_eq!(
            hrefs,
            vec![
                Some("https://a.com/x".to_string()),
                Some("/relative".to_string()),
                Some("mailto:foo@bar.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_hrefs_reports_missing_href_as_none() {
        let html = r#"<a name="top">Top</a><a href="https://b.com/">B</a>"#;

        let hrefs = extract_hrefs(html);

        assert_eq!(hrefs, vec![None, Some("https://b.com/".to_string())]);
    }

    #[test]
    fn test_extract_hrefs_ignores_other_elements() {
        let html = r#"<link href="/style.css"><area href="/map"><img src="/x.png">"#;
        assert!(extract_hrefs(html).is_empty());
    }

    #[test]
    fn test_extract_hrefs_from_plain_text() {
        assert!(extract_hrefs("just some text, no markup").is_empty());
    }

    #[test]
    fn test_default_config_bounds_requests() {
        let config = FetcherConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.connect_timeout <= config.timeout);
        assert!(config.user_agent.starts_with("netcrawl/"));
    }

    #[test]
    fn test_config_with_timeout_secs() {
        let config = FetcherConfig::with_timeout_secs(3);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_fetch_links_from_html_page() {
        let mock_server = MockServer::start().await;

        let html = format!(
            r#"<html><body>
                <a href="{}/page1">Page 1</a>
                <a>No href</a>
                <a href="https://other.example/">Other</a>
            </body></html>"#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.as_bytes()),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let hrefs = fetcher.fetch_links(&mock_server.uri()).await.unwrap();

        assert_eq!(
            hrefs,
            vec![
                Some(format!("{}/page1", mock_server.uri())),
                None,
                Some("https://other.example/".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_links_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(b"<a href=\"https://a.com/\">still a link</a>"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch_links(&format!("{}/missing", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(err.is_status(), "expected status error, got {:?}", err);
        assert!(matches!(err, ScanError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_links_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"<a href=\"https://a.com/\">late</a>")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let config = FetcherConfig {
            timeout: Duration::from_millis(200),
            connect_timeout: Duration::from_millis(200),
            ..FetcherConfig::default()
        };
        let fetcher = HttpFetcher::with_config(config).unwrap();

        let result = fetcher
            .fetch_links(&format!("{}/slow", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(ScanError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_fetch_links_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch_links("not a url").await;
        assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_links_non_html_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(br#"{"href": "https://a.com/"}"#),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let hrefs = fetcher
            .fetch_links(&format!("{}/data.json", mock_server.uri()))
            .await
            .unwrap();

        assert!(hrefs.is_empty());
    }
}
