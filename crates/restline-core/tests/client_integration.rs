//! End-to-end tests against a mock HTTP server
//!
//! These tests drive the real reqwest transport through every verb.


use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use restline_core::http::HeaderMap;
use restline_core::{
    ApiKeyHeader, BearerToken, Error, ErrorKind, Method, QueryParam, TransportErrorKind,
};
use serde_json::{json, Value};
use test_support::client_for;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());
    let response = client.get("items/1", None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.value, Some(json!({"id": 1})));

    #[derive(serde::Deserialize)]
    struct Item {
        id: u32,
    }
    assert_eq!(response.json::<Item>().unwrap().id, 1);
}

#[tokio::test]
async fn test_not_found_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such item"))
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());
    let err = client.get("missing", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.body().map(|b| b.as_ref()), Some(&b"no such item"[..]));
}

#[tokio::test]
async fn test_post_and_put_send_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "widget"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7, "name": "widget"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/items/7"))
        .and(body_json(json!({"name": "gadget"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "gadget"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());

    let created = client.post("items", r#"{"name":"widget"}"#).await.unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.value.unwrap()["id"], 7);

    let replaced = client.put("items/7", r#"{"name":"gadget"}"#).await.unwrap();
    assert_eq!(replaced.value.unwrap()["name"], "gadget");
}

#[tokio::test]
async fn test_patch_sends_delta_and_delete_has_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/items/7"))
        .and(body_string(r#"{"done":true}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "done": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/items/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());

    let patched = client.patch("items/7", r#"{"done":true}"#).await.unwrap();
    assert_eq!(patched.value, Some(json!({"id": 7, "done": true})));

    let deleted = client.delete("items/7").await.unwrap();
    assert_eq!(deleted.status, 204);
    assert!(deleted.value.is_none());

    let received = server.received_requests().await.unwrap();
    let delete = received.iter().find(|r| r.method.as_str() == "DELETE").unwrap();
    assert!(delete.body.is_empty());
}

#[tokio::test]
async fn test_timeout_is_reported_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"late": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let (client, bus) = client_for(&server.uri());
    client.set_timeout(Duration::from_millis(50));
    let mut sub = bus.subscribe();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();
    let outcome = client
        .spawn(Method::Get, "slow", None, None, move |outcome| {
            seen.lock().unwrap().push(outcome.as_ref().err().map(Error::kind));
        })
        .await;

    assert!(matches!(outcome, Err(Error::Timeout { timeout }) if timeout == Duration::from_millis(50)));
    assert_eq!(*calls.lock().unwrap(), vec![Some(ErrorKind::Timeout)]);

    let event = sub.recv().await.unwrap();
    assert_eq!(event.outcome.unwrap_err().kind(), ErrorKind::Timeout);

    // Let the delayed response land; nothing more is delivered.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(bus.published_count(), 1);
}

#[tokio::test]
async fn test_callback_precedes_notification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let (client, bus) = client_for(&server.uri());
    let mut sub = bus.subscribe();

    let watched_bus = bus.clone();
    let published_at_callback = Arc::new(Mutex::new(None));
    let seen = published_at_callback.clone();

    client
        .spawn(Method::Get, "items/1", None, None, move |outcome| {
            assert!(outcome.is_ok());
            *seen.lock().unwrap() = Some(watched_bus.published_count());
        })
        .await
        .unwrap();

    assert_eq!(*published_at_callback.lock().unwrap(), Some(0));

    let event = sub.recv().await.unwrap();
    assert_eq!(event.method, Method::Get);
    assert_eq!(event.url.unwrap().path(), "/api/items/1");
    let value: Option<Value> = event.outcome.unwrap().value;
    assert_eq!(value, Some(json!({"id": 1})));
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "a"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());
    client.set_authorization(Some(Arc::new(BearerToken::new("sk-test"))));

    assert!(client.get("me", None).await.is_ok());
}

#[tokio::test]
async fn test_api_key_and_query_providers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/keyed"))
        .and(header("x-api-key", "k-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/signed"))
        .and(query_param("page", "2"))
        .and(query_param("sig", "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());

    client.set_authorization(Some(Arc::new(ApiKeyHeader::new("X-Api-Key", "k-1"))));
    assert!(client.get("keyed", None).await.is_ok());

    client.set_authorization(Some(Arc::new(QueryParam::new("sig", "abc"))));
    assert!(client.get("signed?page=2", None).await.is_ok());
}

#[tokio::test]
async fn test_per_call_headers_override_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/override"))
        .and(header("authorization", "Bearer per-call"))
        .and(header("x-trace", "t-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for(&server.uri());
    client.set_authorization(Some(Arc::new(BearerToken::new("provider"))));

    let mut headers = HeaderMap::new();
    headers.insert("Authorization", "Bearer per-call".parse().unwrap());
    headers.insert("X-Trace", "t-1".parse().unwrap());

    assert!(client.get("override", Some(headers)).await.is_ok());
}

#[tokio::test]
async fn test_body_on_get_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, bus) = client_for(&server.uri());
    let err = client
        .request(Method::Get, "items", None, Some(Bytes::from_static(b"{}")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedBody { method: Method::Get }));
    assert!(err.is_pre_dispatch());
    assert_eq!(bus.published_count(), 1);
}

#[tokio::test]
async fn test_absolute_uri_bypasses_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_for("https://unused.invalid");
    let uri = format!("{}/elsewhere", server.uri());

    assert!(client.get(&uri, None).await.is_ok());
}

#[tokio::test]
async fn test_invalid_uri_is_outcome() {
    let (client, bus) = client_for("https://api.example.com");
    let err = client.get("mailto:someone@example.com", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidUri);
    assert_eq!(bus.published_count(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind and drop a listener to get a port nothing is listening on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (client, _bus) = client_for(&format!("http://127.0.0.1:{}", port));

    match client.get("items", None).await {
        Err(Error::Transport(error)) => assert_eq!(error.kind, TransportErrorKind::Connect),
        other => panic!("expected transport error, got {other:?}"),
    }
}
