use clap::{Args, ValueEnum};
use std::time::Duration;

pub const DEFAULT_RAW_RELAY: &str = "https://api.allorigins.win/raw";
pub const DEFAULT_WRAPPED_RELAY: &str = "https://api.allorigins.win/get";
pub const DEFAULT_WIKIDATA: &str = "https://www.wikidata.org/w/api.php";

/// How page markup is retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relay {
    /// GET the target itself.
    Direct,
    /// GET `endpoint?url=<target>`, body is the page.
    Raw { endpoint: String },
    /// GET `endpoint?url=<target>`, body is `{"contents": "<page>"}`.
    Wrapped { endpoint: String },
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub relay: Relay,
    pub timeout: Duration,
    pub user_agent: String,
    /// Bodies larger than this are rejected.
    pub max_bytes: usize,
    /// Upper bound on pages analysed per domain.
    pub max_pages: usize,
    /// Scheme used to turn a bare domain into a site root.
    pub site_scheme: String,
    pub wikidata_endpoint: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            relay: Relay::Direct,
            timeout: Duration::from_secs(12),
            user_agent: "seoscope-bot/0.1 (+https://example.com/bot)".to_string(),
            max_bytes: 2 * 1024 * 1024,
            max_pages: 10,
            site_scheme: "https".to_string(),
            wikidata_endpoint: DEFAULT_WIKIDATA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelayKind {
    Direct,
    Raw,
    Wrapped,
}

/// Command-line flags shared by the CLI and the HTTP server.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// How to retrieve page markup
    #[arg(long, value_enum, default_value_t = RelayKind::Direct)]
    pub relay: RelayKind,
    /// Relay endpoint; defaults to the public allorigins endpoint for the chosen relay
    #[arg(long)]
    pub relay_endpoint: Option<String>,
    /// Per-fetch timeout seconds
    #[arg(long, default_value_t = 12)]
    pub timeout_secs: u64,
    /// Maximum pages analysed per domain
    #[arg(long, default_value_t = 10)]
    pub max_pages: usize,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "seoscope-bot/0.1 (+https://example.com/bot)")]
    pub user_agent: String,
    /// Knowledge-graph API used for topical map enrichment
    #[arg(long, default_value = DEFAULT_WIKIDATA)]
    pub wikidata_endpoint: String,
}

impl FetchArgs {
    pub fn into_config(self) -> FetchConfig {
        let relay = match self.relay {
            RelayKind::Direct => Relay::Direct,
            RelayKind::Raw => Relay::Raw {
                endpoint: self.relay_endpoint.unwrap_or_else(|| DEFAULT_RAW_RELAY.to_string()),
            },
            RelayKind::Wrapped => Relay::Wrapped {
                endpoint: self.relay_endpoint.unwrap_or_else(|| DEFAULT_WRAPPED_RELAY.to_string()),
            },
        };
        FetchConfig {
            relay,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent,
            max_pages: self.max_pages.max(1),
            wikidata_endpoint: self.wikidata_endpoint,
            ..FetchConfig::default()
        }
    }
}
