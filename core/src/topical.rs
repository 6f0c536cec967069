//! Template-driven topical maps.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicalNode {
    pub topic: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub subtopics: Vec<TopicalNode>,
}

/// A related entity from an external knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntity {
    pub id: String,
    pub label: String,
    pub description: String,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Property id, e.g. `P31`.
    pub property: String,
    pub entity: String,
}

pub const RELATED_ENTITIES: &str = "Related Entities";

struct Category {
    name: &'static str,
    description: &'static str,
    keywords: [&'static str; 5],
}

const ROOT: Category = Category {
    name: "{topic}",
    description: "Comprehensive guide about {topic}",
    keywords: ["{topic}", "about {topic}", "{topic} overview", "{topic} introduction", "{topic} guide"],
};

const CATEGORIES: [Category; 5] = [
    Category {
        name: "Core Knowledge",
        description: "Essential information about {topic}",
        keywords: ["what is {topic}", "{topic} definition", "{topic} meaning", "{topic} explained", "{topic} basics"],
    },
    Category {
        name: "Guides & Tutorials",
        description: "Learn how to work with {topic}",
        keywords: ["how to use {topic}", "{topic} tutorial", "{topic} guide", "{topic} tips", "{topic} best practices"],
    },
    Category {
        name: "Examples & Applications",
        description: "Real-world applications and examples of {topic}",
        keywords: ["{topic} examples", "{topic} use cases", "{topic} applications", "{topic} implementations", "{topic} in practice"],
    },
    Category {
        name: "Common Questions",
        description: "Frequently asked questions about {topic}",
        keywords: ["what is {topic}", "why use {topic}", "how does {topic} work", "when to use {topic}", "{topic} benefits"],
    },
    Category {
        name: "Comparisons",
        description: "Compare {topic} with alternatives and related concepts",
        keywords: ["{topic} vs", "{topic} alternatives", "{topic} comparison", "different types of {topic}", "{topic} options"],
    },
];

impl Category {
    fn render(&self, topic: &str, subtopics: Vec<TopicalNode>) -> TopicalNode {
        let fill = |template: &str| template.replace("{topic}", topic);
        TopicalNode {
            topic: fill(self.name),
            description: fill(self.description),
            keywords: self.keywords.iter().map(|&k| fill(k)).collect(),
            subtopics,
        }
    }
}

/// Build the fixed two-level map for `topic`. The topic is interpolated verbatim.
pub fn generate(topic: &str) -> Result<TopicalNode> {
    if topic.trim().is_empty() {
        return Err(AnalysisError::invalid("topic must not be empty"));
    }
    let subtopics = CATEGORIES.iter().map(|c| c.render(topic, Vec::new())).collect();
    Ok(ROOT.render(topic, subtopics))
}

/// Append a [`RELATED_ENTITIES`] branch built from `entities`. No-op when empty.
pub fn enrich(root: &mut TopicalNode, entities: &[KnowledgeEntity]) {
    let mut seen = HashSet::new();
    let children: Vec<TopicalNode> = entities
        .iter()
        .filter(|e| !e.label.trim().is_empty() && seen.insert(e.label.to_lowercase()))
        .map(|e| TopicalNode {
            topic: e.label.clone(),
            description: e.description.clone(),
            keywords: vec![
                e.label.clone(),
                format!("what is {}", e.label),
                format!("{} and {}", e.label, root.topic),
            ],
            subtopics: Vec::new(),
        })
        .collect();
    if children.is_empty() {
        return;
    }
    root.subtopics.push(TopicalNode {
        topic: RELATED_ENTITIES.to_string(),
        description: format!("Entities connected to {} in the knowledge graph", root.topic),
        keywords: children.iter().map(|c| c.topic.clone()).collect(),
        subtopics: children,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_categories_in_order() {
        let root = generate("SEO").unwrap();
        assert_eq!(root.topic, "SEO");
        let names: Vec<&str> = root.subtopics.iter().map(|n| n.topic.as_str()).collect();
        assert_eq!(
            names,
            vec!["Core Knowledge", "Guides & Tutorials", "Examples & Applications", "Common Questions", "Comparisons"]
        );
        assert!(root.subtopics.iter().all(|n| n.keywords.len() == 5 && n.subtopics.is_empty()));
        assert_eq!(root.subtopics[0].keywords[0], "what is SEO");
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert!(matches!(generate("   "), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn topic_with_braces_is_literal() {
        let root = generate("{topic}").unwrap();
        assert_eq!(root.keywords[1], "about {topic}");
    }

    #[test]
    fn enrich_without_entities_leaves_tree_alone() {
        let base = generate("rust").unwrap();
        let mut enriched = base.clone();
        enrich(&mut enriched, &[]);
        assert_eq!(base, enriched);
    }

    #[test]
    fn enrich_appends_related_branch() {
        let mut root = generate("rust").unwrap();
        let entity = KnowledgeEntity {
            id: "Q575650".into(),
            label: "Rust".into(),
            description: "programming language".into(),
            relations: vec![],
        };
        enrich(&mut root, &[entity.clone(), entity]);
        let related = root.subtopics.last().unwrap();
        assert_eq!(related.topic, RELATED_ENTITIES);
        assert_eq!(related.subtopics.len(), 1);
        assert_eq!(related.subtopics[0].keywords[2], "Rust and rust");
    }
}
