use crate::config::FetchConfig;
use crate::fetch::Fetcher;
use crate::pages::{self, PageBatch};
use crate::wikidata::Wikidata;
use reqwest::Url;
use seoscope_core::{extract, generate, score, AnalysisError, Heading, KeywordRecord, Result, TopicalNode};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct KeywordReport {
    pub url: String,
    pub records: Vec<KeywordRecord>,
    /// Non-empty H1..H3 headings in document order.
    pub headings: Vec<Heading>,
}

/// Request context handed to front ends: owns the HTTP client and settings.
/// Holds no per-request state, so one instance serves concurrent calls.
#[derive(Clone)]
pub struct Analyzer {
    fetcher: Fetcher,
    knowledge: Wikidata,
    config: FetchConfig,
}

pub fn parse_page_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim()).map_err(|e| AnalysisError::invalid(format!("{input}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AnalysisError::invalid(format!("{input}: expected an http(s) URL"))),
    }
}

impl Analyzer {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let knowledge = Wikidata::new(fetcher.client().clone(), config.wikidata_endpoint.clone());
        Ok(Self { fetcher, knowledge, config })
    }

    pub async fn analyze_keywords(&self, url: &str) -> Result<KeywordReport> {
        let url = parse_page_url(url)?;
        let page = self.fetcher.fetch(&url).await?;
        let document = extract(&page.html, url.as_str());
        let records = score(&document)?;
        Ok(KeywordReport { url: url.to_string(), records, headings: document.headings_in(1..=3) })
    }

    pub async fn analyze_pages(&self, domain: &str) -> Result<PageBatch> {
        pages::analyze_pages(&self.fetcher, domain, &self.config.site_scheme, self.config.max_pages).await
    }

    /// The template map for `topic`, optionally extended with knowledge-graph entities.
    pub async fn generate_topical_map(&self, topic: &str, enrich: bool) -> Result<TopicalNode> {
        let mut root = generate(topic)?;
        if enrich {
            let entities = self.knowledge.lookup(topic).await;
            seoscope_core::enrich(&mut root, &entities);
        }
        Ok(root)
    }
}
