//! Best-effort knowledge-graph lookup against the Wikidata API.

use reqwest::{Client, Url};
use seoscope_core::{KnowledgeEntity, Relation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const MAX_ENTITIES: usize = 3;
const MAX_RELATIONS: usize = 5;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: String,
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, RawEntity>,
}

#[derive(Deserialize, Default)]
struct RawEntity {
    #[serde(default)]
    labels: HashMap<String, LangValue>,
    #[serde(default)]
    descriptions: HashMap<String, LangValue>,
    #[serde(default)]
    claims: BTreeMap<String, Vec<Claim>>,
}

#[derive(Deserialize)]
struct LangValue {
    value: String,
}

#[derive(Deserialize)]
struct Claim {
    #[serde(default)]
    mainsnak: Option<Snak>,
}

#[derive(Deserialize)]
struct Snak {
    #[serde(default)]
    datavalue: Option<DataValue>,
}

#[derive(Deserialize)]
struct DataValue {
    #[serde(default)]
    value: serde_json::Value,
}

/// `None` on any shape mismatch.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    serde_json::from_slice(bytes).ok()
}

impl RawEntity {
    fn into_entity(self, id: &str) -> KnowledgeEntity {
        let label = self.labels.get("en").map(|l| l.value.clone()).unwrap_or_else(|| id.to_string());
        let description = self.descriptions.get("en").map(|d| d.value.clone()).unwrap_or_default();
        let relations = self
            .claims
            .into_iter()
            .flat_map(|(property, claims)| {
                claims.into_iter().filter_map(move |c| {
                    let target = c.mainsnak?.datavalue?.value.get("id")?.as_str()?.to_string();
                    Some(Relation { property: property.clone(), entity: target })
                })
            })
            .take(MAX_RELATIONS)
            .collect();
        KnowledgeEntity { id: id.to_string(), label, description, relations }
    }
}

#[derive(Clone)]
pub struct Wikidata {
    client: Client,
    endpoint: String,
}

impl Wikidata {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    /// Entities related to `topic`. Any failure yields an empty list.
    pub async fn lookup(&self, topic: &str) -> Vec<KnowledgeEntity> {
        match self.try_lookup(topic).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::debug!(%topic, error = %e, "knowledge graph lookup failed");
                Vec::new()
            }
        }
    }

    async fn get(&self, params: &[(&str, &str)]) -> anyhow::Result<Vec<u8>> {
        let url = Url::parse_with_params(&self.endpoint, params)?;
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn try_lookup(&self, topic: &str) -> anyhow::Result<Vec<KnowledgeEntity>> {
        let body = self
            .get(&[("action", "wbsearchentities"), ("search", topic), ("language", "en"), ("format", "json")])
            .await?;
        let ids: Vec<String> = decode::<SearchResponse>(&body)
            .map(|r| r.search.into_iter().take(MAX_ENTITIES).map(|h| h.id).collect())
            .unwrap_or_default();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join("|");
        let body = self
            .get(&[("action", "wbgetentities"), ("ids", joined.as_str()), ("languages", "en"), ("format", "json")])
            .await?;
        let Some(mut response) = decode::<EntitiesResponse>(&body) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| response.entities.remove(id).map(|raw| raw.into_entity(id)))
            .collect())
    }
}
