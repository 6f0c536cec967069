//! Page extraction, keyword scoring, SEO rule evaluation and topical map generation.
//!
//! Everything here is synchronous and pure over its inputs; fetching lives in
//! the `crawler` crate.

pub mod audit;
pub mod document;
pub mod error;
pub mod scoring;
pub mod suggestions;
pub mod tokenizer;
pub mod topical;

pub use audit::{evaluate, Protocol, SeoAssessment, SeoChecks};
pub use document::{extract, Anchor, Document, Heading, Image};
pub use error::{AnalysisError, Result};
pub use scoring::{score, KeywordRecord, LocationCode, MAX_KEYWORDS};
pub use suggestions::{content_suggestions, ContentSuggestion, KeywordQuery, SortField};
pub use topical::{enrich, generate, KnowledgeEntity, Relation, TopicalNode};
