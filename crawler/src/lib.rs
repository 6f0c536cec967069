//! Network side of the analyser: fetching, domain batches and knowledge-graph enrichment.

pub mod analyzer;
pub mod config;
pub mod fetch;
pub mod pages;
pub mod wikidata;

pub use analyzer::{parse_page_url, Analyzer, KeywordReport};
pub use config::{FetchArgs, FetchConfig, Relay, RelayKind};
pub use fetch::{FetchedPage, Fetcher};
pub use pages::{PageBatch, PageFailure};
pub use wikidata::Wikidata;
