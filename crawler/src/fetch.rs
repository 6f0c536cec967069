use crate::config::{FetchConfig, Relay};
use reqwest::{Client, Url};
use seoscope_core::{AnalysisError, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Raw markup for one page plus transfer measurements.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub html: String,
    pub bytes: usize,
    pub elapsed: Duration,
}

#[derive(Deserialize)]
struct WrappedBody {
    #[serde(default)]
    contents: Option<String>,
}

/// Retrieves page markup directly or through a relay. Cheap to clone.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    relay: Relay,
    max_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, relay: config.relay.clone(), max_bytes: config.max_bytes })
    }

    pub fn client(&self) -> &Client { &self.client }

    fn request_url(&self, target: &Url) -> Result<Url> {
        match &self.relay {
            Relay::Direct => Ok(target.clone()),
            Relay::Raw { endpoint } | Relay::Wrapped { endpoint } => {
                Url::parse_with_params(endpoint, &[("url", target.as_str())])
                    .map_err(|e| AnalysisError::invalid(format!("relay endpoint {endpoint}: {e}")))
            }
        }
    }

    pub async fn fetch(&self, target: &Url) -> Result<FetchedPage> {
        let fail = |reason: String| AnalysisError::fetch(target.as_str(), reason);
        let request_url = self.request_url(target)?;
        let start = Instant::now();

        let resp = self.client.get(request_url).send().await.map_err(|e| fail(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(fail(format!("status {}", resp.status())));
        }
        if resp.content_length().map_or(false, |n| n as usize > self.max_bytes) {
            return Err(fail("response too large".into()));
        }
        let body = resp.bytes().await.map_err(|e| fail(e.to_string()))?;
        if body.len() > self.max_bytes {
            return Err(fail("response too large".into()));
        }

        let html = match self.relay {
            Relay::Wrapped { .. } => serde_json::from_slice::<WrappedBody>(&body)
                .ok()
                .and_then(|w| w.contents)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| fail("relay returned no contents".into()))?,
            _ => String::from_utf8_lossy(&body).into_owned(),
        };
        let elapsed = start.elapsed();
        tracing::debug!(url = %target, bytes = body.len(), elapsed_ms = elapsed.as_millis() as u64, "fetched");

        Ok(FetchedPage { url: target.clone(), bytes: body.len(), html, elapsed })
    }
}
