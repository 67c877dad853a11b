// Canonical URL identity for discovered links

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Why an href was not turned into a crawlable URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HrefRejection {
    #[error("href is absent or empty")]
    Absent,

    #[error("could not parse '{href}': {reason}")]
    Unparsable { href: String, reason: String },

    #[error("mail address: {0}")]
    MailScheme(String),

    #[error("no scheme or authority: {0}")]
    MissingAuthority(String),
}

/// A URL reduced to `scheme://authority/path`, with query and fragment
/// dropped. Two hrefs with the same canonical form are the same page.
///
/// Only the scheme is normalized (lowercase); authority and path are kept as
/// written in the href, so `https://a.com` has no trailing slash and
/// `A.com` and `a.com` are different domains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    url: String,
    scheme_end: usize,
    authority_end: usize,
}

impl CanonicalUrl {
    /// Canonicalizes a raw href value taken from markup.
    ///
    /// Relative references (`/path`, `//host/path`, `#frag`) have no base to
    /// resolve against and are rejected, as are `mailto:` addresses and
    /// schemes without an authority such as `javascript:` or `tel:`. The
    /// scheme must be followed by `//` and a non-empty authority.
    pub fn from_href(href: Option<&str>) -> Result<Self, HrefRejection> {
        let href = href
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(HrefRejection::Absent)?;

        let parsed = Url::parse(href).map_err(|e| HrefRejection::Unparsable {
            href: href.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() == "mailto" {
            return Err(HrefRejection::MailScheme(href.to_string()));
        }

        let (authority, path) = match split_authority(href) {
            Some((authority, path)) if !authority.is_empty() && parsed.has_host() => {
                (authority, path)
            }
            _ => return Err(HrefRejection::MissingAuthority(href.to_string())),
        };

        let scheme = parsed.scheme();
        let url = format!("{}://{}{}", scheme, authority, path);

        Ok(Self {
            scheme_end: scheme.len(),
            authority_end: scheme.len() + 3 + authority.len(),
            url,
        })
    }

    pub fn parse(href: &str) -> Result<Self, HrefRejection> {
        Self::from_href(Some(href))
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The authority component; the unit of the one-URL-per-domain rule.
    pub fn domain(&self) -> &str {
        &self.url[self.scheme_end + 3..self.authority_end]
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

/// Splits `scheme://authority/path?query#fragment` into its authority and
/// path text. `None` when the scheme is not followed by `//`.
fn split_authority(href: &str) -> Option<(&str, &str)> {
    let (_, rest) = href.split_once(':')?;
    let rest = rest.strip_prefix("//")?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    Some((authority, &tail[..path_end]))
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url)
    }
}
