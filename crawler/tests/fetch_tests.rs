use crawler::{FetchConfig, Fetcher, Relay};
use reqwest::Url;
use seoscope_core::AnalysisError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "<html><head><title>Hello</title></head><body><p>hello world</p></body></html>";

fn fetcher(relay: Relay) -> Fetcher {
    Fetcher::new(&FetchConfig { relay, ..FetchConfig::default() }).unwrap()
}

#[tokio::test]
async fn direct_fetch_returns_markup_and_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
    let page = fetcher(Relay::Direct).fetch(&url).await.unwrap();
    assert_eq!(page.html, PAGE);
    assert_eq!(page.bytes, PAGE.len());
    assert_eq!(page.url, url);
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let err = fetcher(Relay::Direct).fetch(&url).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Fetch { .. }), "{err:?}");
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn raw_relay_passes_target_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", "https://example.com/a?b=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let relay = Relay::Raw { endpoint: format!("{}/raw", server.uri()) };
    let target = Url::parse("https://example.com/a?b=1").unwrap();
    let page = fetcher(relay).fetch(&target).await.unwrap();
    assert_eq!(page.html, PAGE);
}

#[tokio::test]
async fn wrapped_relay_unwraps_contents() {
    let wrapped = json!({ "contents": PAGE, "status": { "http_code": 200 } });
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("url", "https://example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&wrapped))
        .mount(&server)
        .await;

    let relay = Relay::Wrapped { endpoint: format!("{}/get", server.uri()) };
    let target = Url::parse("https://example.com/").unwrap();
    let page = fetcher(relay).fetch(&target).await.unwrap();
    assert_eq!(page.html, PAGE);
    // size is what came over the wire, envelope included
    assert_eq!(page.bytes, serde_json::to_vec(&wrapped).unwrap().len());
    assert!(page.bytes > PAGE.len());
}

#[tokio::test]
async fn wrapped_relay_without_contents_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": null })))
        .mount(&server)
        .await;

    let relay = Relay::Wrapped { endpoint: format!("{}/get", server.uri()) };
    let target = Url::parse("https://example.com/").unwrap();
    let err = fetcher(relay).fetch(&target).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Fetch { .. }));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let f = Fetcher::new(&FetchConfig { max_bytes: 16, ..FetchConfig::default() }).unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    assert!(matches!(f.fetch(&url).await, Err(AnalysisError::Fetch { .. })));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let f = Fetcher::new(&FetchConfig { timeout: Duration::from_millis(200), ..FetchConfig::default() }).unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    let err = f.fetch(&url).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Fetch { .. }), "{err:?}");
}
