// Report generation for discovered URLs

use crate::canonical::CanonicalUrl;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    urls: &'a [CanonicalUrl],
    count: usize,
}

/// Render the accepted URLs in acceptance order.
///
/// The text form prints one URL per line, a blank line, then
/// `<count> unique urls returned.`
pub fn generate_report(accepted: &[CanonicalUrl], format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => generate_text_report(accepted),
        ReportFormat::Json => generate_json_report(accepted),
    }
}

fn generate_text_report(accepted: &[CanonicalUrl]) -> String {
    let mut report = String::new();
    for url in accepted {
        report.push_str(url.as_str());
        report.push('\n');
    }
    report.push('\n');
    report.push_str(&format!("{} unique urls returned.\n", accepted.len()));
    report
}

fn generate_json_report(accepted: &[CanonicalUrl]) -> String {
    let report = JsonReport {
        urls: accepted,
        count: accepted.len(),
    };
    // Strings and a count cannot fail to serialize.
    let mut json = serde_json::to_string_pretty(&report).unwrap_or_default();
    json.push('\n');
    json
}
