//! Integration tests for the content resolution pipeline

use siteintel::config::{QualityConfig, ResolverConfig};
use siteintel::error::Error;
use siteintel::quality::QualityClassifier;
use siteintel::resolve::{ContentResolver, FallbackReader, HttpReader, ResolveMethod};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rich_html() -> String {
    let paragraph = "Our company builds an analytics platform for enterprise customers. \
                     The product ships with pricing tiers for every team size, and our \
                     support staff helps clients integrate the service quickly. ";
    format!(
        "<html><head><title>Acme Analytics</title></head><body>\
         <nav>Home About Pricing</nav><main><p>{}</p></main>\
         <footer>Contact us</footer></body></html>",
        paragraph.repeat(4)
    )
}

fn shell_html() -> String {
    "<html><head><title>App</title></head><body>\
     <div id=\"root\"></div><script src=\"/bundle.js\"></script></body></html>"
        .to_string()
}

fn resolver(fallback: Option<Arc<dyn FallbackReader>>) -> ContentResolver {
    let quality = QualityClassifier::new(QualityConfig::default());
    let config = ResolverConfig {
        timeout_secs: 5,
        ..ResolverConfig::default()
    };
    ContentResolver::new(&config, quality, fallback, 500).unwrap()
}

fn reader_for(server: &MockServer) -> Arc<dyn FallbackReader> {
    Arc::new(HttpReader::new(&server.uri(), None, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn rich_page_resolves_on_primary_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rich_html()))
        .expect(1)
        .mount(&server)
        .await;

    let page = resolver(None)
        .resolve(&format!("{}/about", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.method, ResolveMethod::Primary);
    assert!(page.text_length >= 500);
    assert_eq!(page.title.as_deref(), Some("Acme Analytics"));
    assert!(page.text.contains("analytics platform"));
    // Boilerplate containers are stripped.
    assert!(!page.text.contains("bundle.js"));
}

#[tokio::test]
async fn shell_page_falls_back_to_reader() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(shell_html()))
        .expect(1)
        .mount(&primary)
        .await;

    let reader = MockServer::start().await;
    let content = "Acme builds analytics software for businesses. ".repeat(20);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "Acme",
            "content": content,
        })))
        .expect(1)
        .mount(&reader)
        .await;

    let page = resolver(Some(reader_for(&reader)))
        .resolve(&primary.uri())
        .await
        .unwrap();

    assert_eq!(page.method, ResolveMethod::Fallback);
    assert_eq!(page.title.as_deref(), Some("Acme"));
    assert!(page.text_length >= 500);
}

#[tokio::test]
async fn thin_fallback_content_is_rejected() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(shell_html()))
        .mount(&primary)
        .await;

    let reader = MockServer::start().await;
    // Fallback is consulted exactly once, never retried.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "App",
            "content": "Loading…",
        })))
        .expect(1)
        .mount(&reader)
        .await;

    let err = resolver(Some(reader_for(&reader)))
        .resolve(&primary.uri())
        .await
        .unwrap_err();

    match err {
        Error::Resolution { reason } => assert_eq!(reason, "quality_check_failed"),
        other => panic!("expected resolution error, got {:?}", other),
    }
}

#[tokio::test]
async fn fetch_failure_without_fallback_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = resolver(None)
        .resolve(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    match err {
        Error::Resolution { reason } => assert!(reason.contains("HTTP 404"), "{}", reason),
        other => panic!("expected resolution error, got {:?}", other),
    }
}

#[tokio::test]
async fn reader_outage_surfaces_resolution_error() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(shell_html()))
        .mount(&primary)
        .await;

    let reader = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&reader)
        .await;

    let err = resolver(Some(reader_for(&reader)))
        .resolve(&primary.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Resolution { .. }));
}

#[tokio::test]
async fn invalid_url_fails_before_any_request() {
    let err = resolver(None).resolve("not a url").await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));

    let err = resolver(None)
        .resolve("ftp://example.com/file")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}
