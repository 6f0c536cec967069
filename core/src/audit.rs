use crate::document::{Document, Heading};
use crate::scoring::round2;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const TITLE_LENGTH: RangeInclusive<usize> = 30..=60;
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 120..=155;
pub const MIN_CONTENT_WORDS: usize = 300;
pub const MAX_LOAD_SECS: f64 = 3.0;
pub const MAX_PAGE_SIZE_KB: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Https,
    Http,
}

/// Pass/fail view of the thresholds. `None` where the input was not measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoChecks {
    pub title_length_ok: bool,
    pub description_length_ok: bool,
    pub content_length_ok: bool,
    pub has_internal_links: bool,
    pub load_time_ok: Option<bool>,
    pub page_size_ok: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoAssessment {
    pub url: String,
    /// Page title, or the URL when the page has none.
    pub title: String,
    pub has_title: bool,
    pub title_length: usize,
    pub description: String,
    pub has_meta_description: bool,
    pub description_length: usize,
    pub has_canonical: bool,
    pub canonical_url: Option<String>,
    pub has_schema: bool,
    pub schema_types: Vec<String>,
    pub is_secure: bool,
    pub protocol: Protocol,
    /// True whenever any heading exists. Hierarchy is not checked.
    pub has_proper_heading_structure: bool,
    pub headings: Vec<Heading>,
    pub images_total: usize,
    pub images_with_alt: usize,
    pub missing_alt_images: usize,
    pub images_with_alt_ratio: f64,
    /// Body word count.
    pub content_length: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub load_time_secs: Option<f64>,
    pub page_size_kb: Option<f64>,
    pub checks: SeoChecks,
}

impl SeoAssessment {
    /// Attach measured transfer time and body size, re-evaluating their checks.
    pub fn with_transfer(mut self, elapsed: Duration, bytes: usize) -> Self {
        let secs = round2(elapsed.as_secs_f64());
        let kb = round2(bytes as f64 / 1024.0);
        self.load_time_secs = Some(secs);
        self.page_size_kb = Some(kb);
        self.checks.load_time_ok = Some(secs < MAX_LOAD_SECS);
        self.checks.page_size_ok = Some(kb < MAX_PAGE_SIZE_KB);
        self
    }
}

/// Run the heuristic battery over one extracted page.
pub fn evaluate(document: &Document, page_url: &str) -> SeoAssessment {
    let title_length = document.title.chars().count();
    let description = document.meta_description.clone().unwrap_or_default();
    let description_length = description.chars().count();

    let images_total = document.images.len();
    let images_with_alt = document.images.iter().filter(|i| i.has_alt).count();
    let images_with_alt_ratio = if images_total == 0 {
        1.0
    } else {
        images_with_alt as f64 / images_total as f64
    };

    let content_length = document.body_text.split_whitespace().count();

    let internal_links = document.anchors.iter().filter(|a| a.is_internal).count();
    let external_links = document
        .anchors
        .iter()
        .filter(|a| a.href.starts_with("http") && !a.is_internal)
        .count();

    let is_secure = page_url.starts_with("https");

    SeoAssessment {
        url: page_url.to_string(),
        title: if document.title.is_empty() { page_url.to_string() } else { document.title.clone() },
        has_title: title_length > 0,
        title_length,
        has_meta_description: description_length > 0,
        description,
        description_length,
        has_canonical: document.canonical_url.is_some(),
        canonical_url: document.canonical_url.clone(),
        has_schema: document.structured_data_blocks > 0,
        schema_types: document.structured_data_types.iter().cloned().collect(),
        is_secure,
        protocol: if is_secure { Protocol::Https } else { Protocol::Http },
        has_proper_heading_structure: !document.headings.is_empty(),
        headings: document.headings.clone(),
        images_total,
        images_with_alt,
        missing_alt_images: images_total - images_with_alt,
        images_with_alt_ratio,
        content_length,
        internal_links,
        external_links,
        load_time_secs: None,
        page_size_kb: None,
        checks: SeoChecks {
            title_length_ok: TITLE_LENGTH.contains(&title_length),
            description_length_ok: DESCRIPTION_LENGTH.contains(&description_length),
            content_length_ok: content_length >= MIN_CONTENT_WORDS,
            has_internal_links: internal_links > 0,
            load_time_ok: None,
            page_size_ok: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract;

    #[test]
    fn no_images_means_full_alt_ratio() {
        let a = evaluate(&Document::default(), "https://example.com/");
        assert_eq!(a.images_with_alt_ratio, 1.0);
        assert_eq!(a.missing_alt_images, 0);
        assert!(!a.has_title);
        assert_eq!(a.title, "https://example.com/");
        assert!(!a.has_proper_heading_structure);
    }

    #[test]
    fn counts_links_and_alt_text() {
        let url = "https://example.com/";
        let html = r#"<html><head><title>Example</title>
            <meta name="description" content="An example page">
            <link rel="canonical" href="https://example.com/"></head>
            <body><h3>Only a third tier</h3>
            <img src="a.png" alt="A"><img src="b.png" alt=" "><img src="c.png">
            <a href="/about">about</a>
            <a href="https://example.com/blog">blog</a>
            <a href="https://other.org/">other</a>
            <a href="http://insecure.net/">insecure</a>
            <a href="relative.html">relative</a>
            </body></html>"#;
        let a = evaluate(&extract(html, url), url);
        // `relative.html` resolves under the page URL, so it is internal too
        assert_eq!(a.internal_links, 3);
        assert_eq!(a.external_links, 2);
        assert_eq!(a.images_with_alt, 1);
        assert_eq!(a.missing_alt_images, 2);
        assert!((a.images_with_alt_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!(a.has_canonical);
        assert!(a.has_meta_description);
        assert!(!a.checks.description_length_ok);
        assert!(a.has_proper_heading_structure);
        assert_eq!(a.protocol, Protocol::Https);
        assert_eq!(a.load_time_secs, None);
    }

    #[test]
    fn link_to_own_root_is_internal_only() {
        let url = "https://example.com/";
        let a = evaluate(&extract(r#"<a href="https://example.com">home</a>"#, url), url);
        assert_eq!(a.internal_links, 1);
        assert_eq!(a.external_links, 0);
    }

    #[test]
    fn transfer_stats_fill_checks() {
        let a = evaluate(&Document::default(), "http://example.com/")
            .with_transfer(Duration::from_millis(1250), 2048);
        assert_eq!(a.load_time_secs, Some(1.25));
        assert_eq!(a.page_size_kb, Some(2.0));
        assert_eq!(a.checks.load_time_ok, Some(true));
        assert_eq!(a.protocol, Protocol::Http);
    }
}
