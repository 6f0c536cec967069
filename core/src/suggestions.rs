//! Derived views over a keyword report: writing suggestions and table queries.

use crate::document::Heading;
use crate::scoring::{KeywordRecord, LocationCode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const TOP_PROMINENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSuggestion {
    pub title: String,
    /// `- item` lines joined by `\n`.
    pub content: String,
}

fn bullets<I: IntoIterator<Item = String>>(items: I) -> String {
    items.into_iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n")
}

pub fn content_suggestions(records: &[KeywordRecord], headings: &[Heading]) -> Vec<ContentSuggestion> {
    let tier = |t: u8| headings.iter().filter(move |h| h.tier == t).map(|h| h.text.clone()).collect::<Vec<_>>();
    let (h1, h2, h3) = (tier(1), tier(2), tier(3));
    let mut out = Vec::new();

    for (title, texts) in [("Main Topics Structure", &h1), ("Subtopics & Sections", &h2), ("Detailed Points", &h3)] {
        if !texts.is_empty() {
            out.push(ContentSuggestion { title: title.into(), content: bullets(texts.iter().cloned()) });
        }
    }

    let mut prominent: Vec<&KeywordRecord> = records.iter().collect();
    prominent.sort_by(|a, b| b.prominence.partial_cmp(&a.prominence).unwrap_or(Ordering::Equal));
    prominent.truncate(TOP_PROMINENT);
    if !prominent.is_empty() {
        out.push(ContentSuggestion {
            title: "Important Keywords".into(),
            content: bullets(prominent.iter().map(|k| format!("{} ({}% prominence)", k.term, k.prominence))),
        });
    }

    let gaps: Vec<String> = [
        (h1.is_empty(), "Missing main topic (H1 heading)"),
        (h2.is_empty(), "Missing subtopics (H2 headings)"),
        (h3.is_empty(), "Missing detailed sections (H3 headings)"),
    ]
    .into_iter()
    .filter(|(missing, _)| *missing)
    .map(|(_, msg)| msg.to_string())
    .collect();
    if !gaps.is_empty() {
        out.push(ContentSuggestion { title: "Content Structure Gaps".into(), content: bullets(gaps) });
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Term,
    Location,
    Occurrences,
    Density,
    #[default]
    Prominence,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "term" => Some(SortField::Term),
            "location" => Some(SortField::Location),
            "occurrences" => Some(SortField::Occurrences),
            "density" => Some(SortField::Density),
            "prominence" => Some(SortField::Prominence),
            _ => None,
        }
    }
}

/// Filter and order a keyword table the way a report viewer would.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordQuery {
    /// Case-insensitive substring of the term.
    #[serde(default)]
    pub search: Option<String>,
    /// A record matches when it carries any of these codes. Empty matches all.
    #[serde(default)]
    pub locations: Vec<LocationCode>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default = "default_descending")]
    pub descending: bool,
}
fn default_descending() -> bool { true }

impl Default for KeywordQuery {
    fn default() -> Self {
        Self { search: None, locations: Vec::new(), sort: SortField::default(), descending: true }
    }
}

impl KeywordQuery {
    pub fn apply<'a>(&self, records: &'a [KeywordRecord]) -> Vec<&'a KeywordRecord> {
        let needle = self.search.as_deref().map(str::to_lowercase).unwrap_or_default();
        let mut rows: Vec<&KeywordRecord> = records
            .iter()
            .filter(|r| r.term.to_lowercase().contains(&needle))
            .filter(|r| self.locations.is_empty() || self.locations.iter().any(|c| r.location_codes.contains(c)))
            .collect();
        rows.sort_by(|a, b| {
            let ord = match self.sort {
                SortField::Term => a.term.cmp(&b.term),
                SortField::Location => a.location_label().cmp(&b.location_label()),
                SortField::Occurrences => a.occurrences.cmp(&b.occurrences),
                SortField::Density => a.density.partial_cmp(&b.density).unwrap_or(Ordering::Equal),
                SortField::Prominence => a.prominence.partial_cmp(&b.prominence).unwrap_or(Ordering::Equal),
            };
            if self.descending { ord.reverse() } else { ord }
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(term: &str, occurrences: u32, prominence: f64, codes: &[LocationCode]) -> KeywordRecord {
        KeywordRecord { term: term.into(), occurrences, density: 0.0, prominence, location_codes: codes.to_vec() }
    }

    #[test]
    fn suggestions_group_headings_and_flag_gaps() {
        let headings = vec![
            Heading { tier: 1, text: "Main".into() },
            Heading { tier: 2, text: "First".into() },
            Heading { tier: 2, text: "Second".into() },
        ];
        let records = vec![rec("alpha", 2, 10.0, &[LocationCode::D]), rec("beta", 1, 70.0, &[LocationCode::T])];
        let s = content_suggestions(&records, &headings);
        let titles: Vec<&str> = s.iter().map(|x| x.title.as_str()).collect();
        assert_eq!(titles, vec!["Main Topics Structure", "Subtopics & Sections", "Important Keywords", "Content Structure Gaps"]);
        assert_eq!(s[1].content, "- First\n- Second");
        assert_eq!(s[2].content, "- beta (70% prominence)\n- alpha (10% prominence)");
        assert_eq!(s[3].content, "- Missing detailed sections (H3 headings)");
    }

    #[test]
    fn query_filters_by_location_and_search() {
        let records = vec![
            rec("seo", 5, 70.0, &[LocationCode::T, LocationCode::H1]),
            rec("search", 3, 0.0, &[LocationCode::D]),
            rec("engine", 2, 20.0, &[LocationCode::H2]),
        ];
        let q = KeywordQuery { locations: vec![LocationCode::H1, LocationCode::H2], ..KeywordQuery::default() };
        let terms: Vec<&str> = q.apply(&records).iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["seo", "engine"]);

        let q = KeywordQuery { search: Some("SE".into()), sort: SortField::Occurrences, descending: false, ..KeywordQuery::default() };
        let terms: Vec<&str> = q.apply(&records).iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["search", "seo"]);
    }

    #[test]
    fn sort_field_names() {
        assert_eq!(SortField::parse(" Density "), Some(SortField::Density));
        assert_eq!(SortField::parse("occurrences"), Some(SortField::Occurrences));
        assert_eq!(SortField::parse("popularity"), None);
    }
}
