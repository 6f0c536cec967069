//! Keyword density and prominence scoring.
//!
//! Title and heading matching is plain substring containment on the lowercased
//! text, not word-boundary matching: the term `cat` is credited to a heading
//! that only says "Category". Equal occurrence counts keep the order in which
//! the terms first appear in `title + " " + body`.

use crate::document::{Document, Heading};
use crate::error::{AnalysisError, Result};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const MAX_KEYWORDS: usize = 100;

const TITLE_WEIGHT: f64 = 40.0;
const H1_WEIGHT: f64 = 30.0;
const H2_WEIGHT: f64 = 20.0;
const H3_WEIGHT: f64 = 10.0;

/// Where a term was found. Variant order is the display precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationCode {
    T,
    H1,
    H2,
    H3,
    /// Body only.
    D,
}

impl LocationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationCode::T => "T",
            LocationCode::H1 => "H1",
            LocationCode::H2 => "H2",
            LocationCode::H3 => "H3",
            LocationCode::D => "D",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T" => Some(LocationCode::T),
            "H1" => Some(LocationCode::H1),
            "H2" => Some(LocationCode::H2),
            "H3" => Some(LocationCode::H3),
            "D" => Some(LocationCode::D),
            _ => None,
        }
    }

    fn for_tier(tier: u8) -> Option<Self> {
        match tier {
            1 => Some(LocationCode::H1),
            2 => Some(LocationCode::H2),
            3 => Some(LocationCode::H3),
            _ => None,
        }
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub term: String,
    pub occurrences: u32,
    /// Percentage of all qualifying tokens, 2 decimals.
    pub density: f64,
    /// 0..=100, 2 decimals.
    pub prominence: f64,
    /// Sorted by precedence, deduplicated, never empty.
    pub location_codes: Vec<LocationCode>,
}

impl KeywordRecord {
    /// Codes concatenated in precedence order, e.g. `TH1H2`.
    pub fn location_label(&self) -> String {
        self.location_codes.iter().map(LocationCode::as_str).collect()
    }
}

pub(crate) fn round2(v: f64) -> f64 { (v * 100.0).round() / 100.0 }

/// Score every qualifying term of `document`, most frequent first, at most [`MAX_KEYWORDS`].
pub fn score(document: &Document) -> Result<Vec<KeywordRecord>> {
    let corpus = format!("{} {}", document.title, document.body_text);
    let tokens = tokenize(&corpus);
    if tokens.is_empty() {
        return Err(AnalysisError::EmptyContent);
    }
    let total = tokens.len() as f64;

    // insertion-ordered frequency table
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for tok in &tokens {
        match slots.get(tok.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slots.insert(tok.as_str(), counts.len());
                counts.push((tok.as_str(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(MAX_KEYWORDS);

    let title = document.title.to_lowercase();
    let headings: Vec<(u8, String)> = document
        .headings_in(1..=3)
        .into_iter()
        .map(|Heading { tier, text }| (tier, text.to_lowercase()))
        .collect();

    let records: Vec<KeywordRecord> = counts
        .into_iter()
        .map(|(term, occurrences)| {
            let (prominence, location_codes) = placement(term, &title, &headings);
            KeywordRecord {
                term: term.to_string(),
                occurrences,
                density: round2(100.0 * occurrences as f64 / total),
                prominence: round2(prominence),
                location_codes,
            }
        })
        .collect();

    if records.is_empty() {
        return Err(AnalysisError::NoKeywords);
    }
    Ok(records)
}

fn placement(term: &str, title: &str, headings: &[(u8, String)]) -> (f64, Vec<LocationCode>) {
    let mut prominence = 0.0;
    let mut codes = Vec::new();
    if title.contains(term) {
        prominence += TITLE_WEIGHT;
        codes.push(LocationCode::T);
    }
    for (tier, text) in headings {
        if !text.contains(term) {
            continue;
        }
        prominence += match tier {
            1 => H1_WEIGHT,
            2 => H2_WEIGHT,
            _ => H3_WEIGHT,
        };
        codes.extend(LocationCode::for_tier(*tier));
    }
    if codes.is_empty() {
        codes.push(LocationCode::D);
    }
    codes.sort();
    codes.dedup();
    (prominence.clamp(0.0, 100.0), codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, headings: &[(u8, &str)], body: &str) -> Document {
        Document {
            title: title.to_string(),
            headings: headings.iter().map(|(t, s)| Heading { tier: *t, text: s.to_string() }).collect(),
            body_text: body.to_string(),
            ..Document::default()
        }
    }

    #[test]
    fn title_and_h1_prominence() {
        let d = doc("Cats and Dogs", &[(1, "Why Cats Are Great")], "cats cats dogs");
        let records = score(&d).unwrap();
        let cats = records.iter().find(|r| r.term == "cats").unwrap();
        assert_eq!(cats.occurrences, 3);
        assert_eq!(cats.density, 50.0);
        assert_eq!(cats.prominence, 70.0);
        assert_eq!(cats.location_codes, vec![LocationCode::T, LocationCode::H1]);
        assert_eq!(cats.location_label(), "TH1");
    }

    #[test]
    fn prominence_is_clamped() {
        let d = doc("seo", &[(1, "seo"), (1, "seo tips"), (2, "seo again")], "seo");
        let records = score(&d).unwrap();
        assert_eq!(records[0].prominence, 100.0);
    }

    #[test]
    fn substring_matches_count() {
        let d = doc("", &[(2, "Category pages")], "cat cat");
        let records = score(&d).unwrap();
        assert_eq!(records[0].term, "cat");
        assert_eq!(records[0].location_codes, vec![LocationCode::H2]);
        assert_eq!(records[0].prominence, 20.0);
    }

    #[test]
    fn deeper_headings_do_not_score() {
        let d = doc("", &[(4, "widgets")], "widgets");
        let records = score(&d).unwrap();
        assert_eq!(records[0].prominence, 0.0);
        assert_eq!(records[0].location_codes, vec![LocationCode::D]);
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        let d = doc("", &[], "zebra apple mango apple zebra mango");
        let terms: Vec<String> = score(&d).unwrap().into_iter().map(|r| r.term).collect();
        assert_eq!(terms, vec!["zebra", "apple", "mango"]);
    }
}
