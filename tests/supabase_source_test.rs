use httpmock::prelude::*;
use serde_json::json;
use site_visit_export::config::Credentials;
use site_visit_export::core::RecordSource;
use site_visit_export::{ExportError, SupabaseSource};
use std::time::Duration;

fn source(base_url: String) -> SupabaseSource {
    let credentials = Credentials {
        url: base_url,
        service_key: "service-key".to_string(),
    };
    SupabaseSource::new(&credentials, Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_auth_headers_and_limit() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/customer_quotas")
            .query_param("select", "*")
            .query_param("limit", "25")
            .header("apikey", "service-key")
            .header("authorization", "Bearer service-key");
        then.status(200).json_body(json!([
            {"customer_email": "a@example.com", "total_hours": 10, "used_hours": 4, "updated_at": null}
        ]));
    });

    let dataset = source(server.base_url())
        .fetch("customer_quotas", 25)
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(dataset.table, "customer_quotas");
    assert_eq!(dataset.len(), 1);
    let record = &dataset.records[0];
    assert_eq!(record.text("customer_email"), Some("a@example.com"));
    assert_eq!(record.get("used_hours"), Some(&json!(4)));
    assert!(!record.is_present("updated_at"));
}

#[tokio::test]
async fn test_fetch_tolerates_trailing_slash_in_url() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/site_visit_requests");
        then.status(200).json_body(json!([]));
    });

    let dataset = source(format!("{}/", server.base_url()))
        .fetch("site_visit_requests", 10_000)
        .await
        .unwrap();

    api_mock.assert();
    assert!(dataset.is_empty());
}

#[tokio::test]
async fn test_fetch_http_error_is_source_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/site_visit_requests");
        then.status(401).body("{\"message\":\"Invalid API key\"}");
    });

    let err = source(server.base_url())
        .fetch("site_visit_requests", 10_000)
        .await
        .unwrap_err();

    match err {
        ExportError::SourceUnavailable { table, message } => {
            assert_eq!(table, "site_visit_requests");
            assert!(message.contains("401"));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_rejects_non_array_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/customer_quotas");
        then.status(200).json_body(json!({"customer_email": "a@example.com"}));
    });

    let err = source(server.base_url())
        .fetch("customer_quotas", 1_000)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn test_fetch_rejects_scalar_rows() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/customer_quotas");
        then.status(200).json_body(json!([1, 2, 3]));
    });

    let err = source(server.base_url())
        .fetch("customer_quotas", 1_000)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_server_is_source_unavailable() {
    // Port 9 (discard) is not expected to have an HTTP listener.
    let err = source("http://127.0.0.1:9".to_string())
        .fetch("site_visit_requests", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::SourceUnavailable { ref table, .. } if table == "site_visit_requests"));
}
