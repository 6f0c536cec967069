use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use crawler::{Analyzer, FetchConfig, KeywordReport, PageFailure};
use seoscope_core::{
    content_suggestions, AnalysisError, ContentSuggestion, Heading, KeywordQuery, KeywordRecord, LocationCode,
    SeoAssessment, SortField, TopicalNode,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
}

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn reject(err: AnalysisError) -> ApiError {
    let status = match err {
        AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AnalysisError::EmptyContent | AnalysisError::NoKeywords => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Fetch { .. } | AnalysisError::TotalBatch { .. } | AnalysisError::PartialBatch { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

pub fn build_app(config: FetchConfig) -> Result<Router> {
    let app_state = AppState { analyzer: Analyzer::new(config)? };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/keywords", get(keywords_handler))
        .route("/suggestions", get(suggestions_handler))
        .route("/pages", get(pages_handler))
        .route("/topics", get(topics_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

#[derive(Deserialize)]
pub struct KeywordParams {
    pub url: String,
    /// Substring filter on the term
    pub q: Option<String>,
    /// Comma-separated location codes, e.g. `T,H1`
    pub location: Option<String>,
    /// One of `term`, `location`, `occurrences`, `density`, `prominence`
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub order: Option<String>,
}

#[derive(Serialize)]
pub struct KeywordResponse {
    pub url: String,
    pub total_keywords: usize,
    pub records: Vec<KeywordRecord>,
    pub headings: Vec<Heading>,
}

pub async fn keywords_handler(State(state): State<AppState>, Query(params): Query<KeywordParams>) -> ApiResult<KeywordResponse> {
    let sort = match params.sort.as_deref().filter(|s| !s.trim().is_empty()) {
        None => SortField::default(),
        Some(s) => SortField::parse(s).ok_or_else(|| reject(AnalysisError::invalid(format!("unknown sort field: {s}"))))?,
    };
    let KeywordReport { url, records, headings } = state.analyzer.analyze_keywords(&params.url).await.map_err(reject)?;
    let query = KeywordQuery {
        search: params.q.filter(|s| !s.trim().is_empty()),
        locations: params
            .location
            .as_deref()
            .map(|l| l.split(',').filter_map(LocationCode::parse).collect())
            .unwrap_or_default(),
        sort,
        descending: !matches!(params.order.as_deref(), Some("asc")),
    };
    let rows = query.apply(&records).into_iter().cloned().collect();
    Ok(Json(KeywordResponse { url, total_keywords: records.len(), records: rows, headings }))
}

#[derive(Deserialize)]
pub struct UrlParams {
    pub url: String,
}

#[derive(Serialize)]
pub struct SuggestionResponse {
    pub url: String,
    pub suggestions: Vec<ContentSuggestion>,
}

pub async fn suggestions_handler(State(state): State<AppState>, Query(params): Query<UrlParams>) -> ApiResult<SuggestionResponse> {
    let report = state.analyzer.analyze_keywords(&params.url).await.map_err(reject)?;
    let suggestions = content_suggestions(&report.records, &report.headings);
    Ok(Json(SuggestionResponse { url: report.url, suggestions }))
}

#[derive(Deserialize)]
pub struct PagesParams {
    pub domain: String,
}

#[derive(Serialize)]
pub struct PagesResponse {
    pub domain: String,
    pub pages: Vec<SeoAssessment>,
    pub failures: Vec<PageFailure>,
    /// Set when some pages could not be analyzed.
    pub warning: Option<String>,
}

pub async fn pages_handler(State(state): State<AppState>, Query(params): Query<PagesParams>) -> ApiResult<PagesResponse> {
    let batch = state.analyzer.analyze_pages(&params.domain).await.map_err(reject)?;
    let warning = batch.partial_failure().map(|w| w.to_string());
    Ok(Json(PagesResponse { domain: batch.domain, pages: batch.pages, failures: batch.failures, warning }))
}

#[derive(Deserialize)]
pub struct TopicParams {
    pub topic: String,
    #[serde(default)]
    pub enrich: bool,
}

pub async fn topics_handler(State(state): State<AppState>, Query(params): Query<TopicParams>) -> ApiResult<TopicalNode> {
    let map = state.analyzer.generate_topical_map(&params.topic, params.enrich).await.map_err(reject)?;
    Ok(Json(map))
}
