//! Domain-wide page audits.
//!
//! The homepage is fetched once for link discovery, then every discovered page
//! (homepage included) is fetched and evaluated concurrently. One failing page
//! never aborts the batch; only a batch where every page fails is an error.

use crate::fetch::Fetcher;
use reqwest::Url;
use seoscope_core::{evaluate, extract, AnalysisError, Document, Result, SeoAssessment};
use serde::Serialize;
use std::collections::HashSet;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageBatch {
    pub domain: String,
    /// Successful assessments in discovery order.
    pub pages: Vec<SeoAssessment>,
    pub failures: Vec<PageFailure>,
}

impl PageBatch {
    pub fn attempted(&self) -> usize { self.pages.len() + self.failures.len() }

    /// `Some(PartialBatch)` when at least one page was dropped.
    pub fn partial_failure(&self) -> Option<AnalysisError> {
        (!self.failures.is_empty()).then(|| AnalysisError::PartialBatch {
            failed: self.failures.len(),
            total: self.attempted(),
        })
    }
}

/// Reduce user input like `https://www.example.com/blog` to `example.com`.
pub fn normalize_domain(input: &str) -> Result<String> {
    let mut s = input.trim();
    for prefix in ["https://", "http://"] {
        if s.get(..prefix.len()).map_or(false, |p| p.eq_ignore_ascii_case(prefix)) {
            s = &s[prefix.len()..];
            break;
        }
    }
    if s.get(..4).map_or(false, |p| p.eq_ignore_ascii_case("www.")) {
        s = &s[4..];
    }
    let host = s.split(|c: char| matches!(c, '/' | '?' | '#')).next().unwrap_or_default().trim();
    if host.is_empty() {
        return Err(AnalysisError::invalid("please enter a valid domain"));
    }
    Ok(host.to_string())
}

pub fn site_root(domain: &str, scheme: &str) -> Result<Url> {
    let url = Url::parse(&format!("{scheme}://{domain}/"))
        .map_err(|e| AnalysisError::invalid(format!("{domain}: {e}")))?;
    if url.host_str().is_none() {
        return Err(AnalysisError::invalid(format!("{domain}: no host")));
    }
    Ok(url)
}

fn norm(u: &Url) -> Url { let mut s = u.clone(); s.set_fragment(None); s }

/// The root followed by same-site links from `homepage`, deduplicated, at most `limit`.
pub fn discover_pages(root: &Url, homepage: &Document, limit: usize) -> Vec<Url> {
    let host = root.host_str().unwrap_or_default();
    let www_host = format!("www.{host}");
    let links = homepage.anchors.iter().filter_map(|a| Url::parse(&a.absolute_url).ok());

    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    for candidate in std::iter::once(root.clone()).chain(links) {
        if pages.len() >= limit {
            break;
        }
        if !matches!(candidate.host_str(), Some(h) if h == host || h == www_host) {
            continue;
        }
        let candidate = norm(&candidate);
        if seen.insert(candidate.to_string()) {
            pages.push(candidate);
        }
    }
    pages
}

async fn assess(fetcher: &Fetcher, url: &Url) -> Result<SeoAssessment> {
    let page = fetcher.fetch(url).await?;
    let document = extract(&page.html, url.as_str());
    Ok(evaluate(&document, url.as_str()).with_transfer(page.elapsed, page.bytes))
}

/// Audit up to `limit` pages of `domain`. Dropping the returned future aborts in-flight fetches.
pub async fn analyze_pages(fetcher: &Fetcher, domain: &str, scheme: &str, limit: usize) -> Result<PageBatch> {
    let domain = normalize_domain(domain)?;
    let root = site_root(&domain, scheme)?;

    let homepage = fetcher.fetch(&root).await?;
    let urls = discover_pages(&root, &extract(&homepage.html, root.as_str()), limit);
    tracing::info!(%domain, pages = urls.len(), "discovered pages");

    let mut tasks = JoinSet::new();
    for (i, url) in urls.iter().cloned().enumerate() {
        let fetcher = fetcher.clone();
        tasks.spawn(async move {
            let outcome = assess(&fetcher, &url).await;
            (i, url, outcome)
        });
    }

    let mut slots: Vec<Option<std::result::Result<SeoAssessment, PageFailure>>> = vec![None; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        let Ok((i, url, outcome)) = joined else { continue };
        slots[i] = Some(outcome.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "page analysis failed");
            PageFailure { url: url.to_string(), reason: e.to_string() }
        }));
    }

    let mut batch = PageBatch { domain, pages: Vec::new(), failures: Vec::new() };
    for (slot, url) in slots.into_iter().zip(&urls) {
        match slot {
            Some(Ok(page)) => batch.pages.push(page),
            Some(Err(failure)) => batch.failures.push(failure),
            None => batch.failures.push(PageFailure { url: url.to_string(), reason: "task aborted".into() }),
        }
    }

    if batch.pages.is_empty() {
        return Err(AnalysisError::TotalBatch { total: batch.attempted() });
    }
    tracing::info!(domain = %batch.domain, ok = batch.pages.len(), failed = batch.failures.len(), "batch complete");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_domains() {
        assert_eq!(normalize_domain("https://www.Example.com/blog?x=1").unwrap(), "Example.com");
        assert_eq!(normalize_domain("  example.com ").unwrap(), "example.com");
        assert_eq!(normalize_domain("HTTP://shop.example.com").unwrap(), "shop.example.com");
        assert!(matches!(normalize_domain("https://"), Err(AnalysisError::InvalidInput(_))));
        assert!(matches!(normalize_domain("   "), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn discovers_same_site_links_in_order() {
        let root = Url::parse("https://example.com/").unwrap();
        let html = r#"
            <a href="/about#team">About</a>
            <a href="https://www.example.com/blog">Blog</a>
            <a href="https://other.org/">Elsewhere</a>
            <a href="/about">About again</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="https://example.com/">Home</a>
            <a href="/contact">Contact</a>
        "#;
        let doc = extract(html, root.as_str());
        let pages: Vec<String> = discover_pages(&root, &doc, 10).into_iter().map(String::from).collect();
        assert_eq!(
            pages,
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://www.example.com/blog",
                "https://example.com/contact",
            ]
        );
        assert_eq!(discover_pages(&root, &doc, 2).len(), 2);
    }
}
