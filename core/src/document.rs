//! Best-effort HTML extraction.
//!
//! `extract` never fails. html5ever repairs any markup into a tree, so
//! malformed input only ever degrades individual fields:
//!
//! * no `<title>` gives an empty title
//! * no `h1`..`h6` gives an empty heading list
//! * a missing or blank `content`/`href` on the description or canonical tag gives `None`
//! * an `href` that cannot be resolved against the base URL is dropped, except
//!   that a root-relative `/path` is still kept by string concatenation
//! * a JSON-LD block that is not valid JSON, or has no `@type`, contributes no types
//!   (it still counts towards `structured_data_blocks`)

use ego_tree::NodeRef;
use lazy_static::lazy_static;
use scraper::{node::Node, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use url::Url;

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref BODY: Selector = Selector::parse("body").expect("valid selector");
    static ref HEADINGS: Selector = Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector");
    static ref META_DESCRIPTION: Selector = Selector::parse(r#"meta[name="description"]"#).expect("valid selector");
    static ref CANONICAL: Selector = Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector");
    static ref IMAGES: Selector = Selector::parse("img").expect("valid selector");
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref JSON_LD: Selector = Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");
}

const INVISIBLE: &[&str] = &["script", "style", "noscript", "template"];

/// Elements whose edges separate words even when the markup has no whitespace there.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1..=6
    pub tier: u8,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub has_alt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// The attribute value as written in the markup.
    pub href: String,
    pub absolute_url: String,
    pub is_internal: bool,
}

/// Extracted view of one fetched page. Built once by [`extract`], never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub headings: Vec<Heading>,
    pub body_text: String,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub images: Vec<Image>,
    pub anchors: Vec<Anchor>,
    pub structured_data_types: BTreeSet<String>,
    /// Number of `application/ld+json` script blocks, parseable or not.
    pub structured_data_blocks: usize,
}

impl Document {
    /// Non-empty headings of the given tiers, in document order.
    pub fn headings_in(&self, tiers: std::ops::RangeInclusive<u8>) -> Vec<Heading> {
        self.headings
            .iter()
            .filter(|h| tiers.contains(&h.tier) && !h.text.is_empty())
            .cloned()
            .collect()
    }
}

/// Parse `html` into a [`Document`]. Relative links are resolved against `base_url`.
pub fn extract(html: &str, base_url: &str) -> Document {
    let page = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let title = page
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let headings = page
        .select(&HEADINGS)
        .filter_map(|el| {
            let tier = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            Some(Heading { tier, text: el.text().collect::<String>().trim().to_string() })
        })
        .collect::<Vec<_>>();

    let body_text = page.select(&BODY).next().map(|b| visible_text(&b)).unwrap_or_default();

    let meta_description = first_attr(&page, &META_DESCRIPTION, "content");
    let canonical_url = first_attr(&page, &CANONICAL, "href");

    let images = page
        .select(&IMAGES)
        .map(|img| Image {
            has_alt: img.value().attr("alt").map_or(false, |a| !a.trim().is_empty()),
        })
        .collect();

    let anchors = page
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_anchor(href, base.as_ref(), base_url))
        .collect();

    let mut structured_data_types = BTreeSet::new();
    let mut structured_data_blocks = 0;
    for script in page.select(&JSON_LD) {
        structured_data_blocks += 1;
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
            collect_ld_types(&value, &mut structured_data_types);
        }
    }

    tracing::trace!(
        headings = headings.len(),
        body_chars = body_text.len(),
        structured_data_blocks,
        "extracted document"
    );

    Document {
        title,
        headings,
        body_text,
        meta_description,
        canonical_url,
        images,
        anchors,
        structured_data_types,
        structured_data_blocks,
    }
}

fn first_attr(page: &Html, sel: &Selector, attr: &str) -> Option<String> {
    page.select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Concatenated text of `root`, skipping script-like subtrees. Inline markup
/// joins as written (`un<b>believ</b>able` reads `unbelievable`); block
/// element edges insert one space, so `<h1>a</h1><p>b</p>` reads `a b`.
fn visible_text(root: &NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    collect_text(root, &mut out);
    out.trim().to_string()
}

fn collect_text(node: &NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            if INVISIBLE.contains(&name) {
                return;
            }
            let block = BLOCKS.contains(&name);
            if block {
                break_word(out);
            }
            for child in node.children() {
                collect_text(&child, out);
            }
            if block {
                break_word(out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
    }
}

fn break_word(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn resolve_anchor(href: &str, base: Option<&Url>, page_url: &str) -> Option<Anchor> {
    let href = href.trim();
    let absolute_url = match base.map(|b| b.join(href)) {
        Some(Ok(u)) => u.to_string(),
        _ if href.starts_with('/') => format!("{}{}", page_url.trim_end_matches('/'), href),
        _ => return None,
    };
    let is_internal = href.starts_with('/') || (!page_url.is_empty() && absolute_url.starts_with(page_url));
    Some(Anchor { href: href.to_string(), absolute_url, is_internal })
}

fn collect_ld_types(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_ld_types(v, out)),
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => { out.insert(t.clone()); }
                Some(Value::Array(ts)) => {
                    out.extend(ts.iter().filter_map(|t| t.as_str()).map(str::to_string));
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_ld_types(graph, out);
            }
        }
        _ => {}
    }
}
