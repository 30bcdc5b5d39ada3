// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::sync::Arc;

use pinch::{
    fetch_json, PinchClient, PinchConfig, RequestDescriptor, SetCookiePolicy, StaticResolver,
};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> PinchClient {
    PinchClient::new(Arc::new(StaticResolver::new()))
}

#[tokio::test]
async fn test_set_cookie_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc123; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome back"))
        .mount(&server)
        .await;

    let client = client();
    assert!(client.get_cookies().is_empty());

    client
        .fetch(RequestDescriptor::get(format!("{}/login", server.uri())))
        .await
        .unwrap();
    assert_eq!(
        client.get_cookies().get("session").map(String::as_str),
        Some("abc123")
    );

    let response = client
        .fetch(RequestDescriptor::get(format!("{}/me", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body_string, "welcome back");
}

#[tokio::test]
async fn test_every_set_cookie_line_is_applied() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "a=1")
                .append_header("set-cookie", "b=2; HttpOnly"),
        )
        .mount(&server)
        .await;

    let client = client();
    client.fetch(RequestDescriptor::get(server.uri())).await.unwrap();
    let cookies = client.get_cookies();
    assert_eq!(cookies.len(), 2);
    assert_eq!(cookies["a"], "1");
    assert_eq!(cookies["b"], "2");

    let first_only = PinchClient::with_config(
        Arc::new(StaticResolver::new()),
        PinchConfig::default().set_cookie_policy(SetCookiePolicy::FirstOnly),
    );
    first_only
        .fetch(RequestDescriptor::get(server.uri()))
        .await
        .unwrap();
    assert_eq!(first_only.get_cookies().len(), 1);
    assert_eq!(first_only.get_cookies()["a"], "1");
}

#[tokio::test]
async fn test_expired_cookie_is_removed() {
    let server = MockServer::start().await;
    Mock::given(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc123"))
        .mount(&server)
        .await;
    Mock::given(path("/logout"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=; Max-Age=0"))
        .mount(&server)
        .await;

    let client = client();
    client
        .fetch(RequestDescriptor::get(format!("{}/login", server.uri())))
        .await
        .unwrap();
    assert_eq!(client.get_cookies().len(), 1);

    client
        .fetch(RequestDescriptor::get(format!("{}/logout", server.uri())))
        .await
        .unwrap();
    assert!(client.get_cookies().is_empty());
}

#[tokio::test]
async fn test_client_errors_are_responses() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&server)
        .await;

    let response = client()
        .fetch(RequestDescriptor::get(format!("{}/missing", server.uri())))
        .await
        .expect("404 is a response, not an error");

    assert_eq!(response.status, 404);
    assert_eq!(response.status_text, "Not Found");
    assert_eq!(response.body_string, "nope");
    assert!(response.is_client_error());
}

#[tokio::test]
async fn test_post_body_and_duplicate_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"name":"widget"}"#))
        .respond_with(
            ResponseTemplate::new(201)
                .append_header("x-dup", "first")
                .append_header("x-dup", "second"),
        )
        .mount(&server)
        .await;

    let response = client()
        .fetch(
            RequestDescriptor::post(format!("{}/items", server.uri()))
                .header("Content-Type", "application/json")
                .body(r#"{"name":"widget"}"#),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.header("X-Dup"), Some("second"));
}

#[tokio::test]
async fn test_fetch_json_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .and(header("x-api-key", "k"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let client = client();
    let json = fetch_json(
        &client,
        &format!("{}/profile", server.uri()),
        r#"{"method": "PUT", "headers": {"X-Api-Key": "k"}, "body": "{}", "timeoutInterval": 5000}"#,
    )
    .await
    .expect("request should succeed");

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["status"], 200);
    assert_eq!(value["statusText"], "OK");
    assert_eq!(value["bodyString"], r#"{"ok":true}"#);
    assert_eq!(value["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn test_fetch_json_pinning_http_is_error_message() {
    let server = MockServer::start().await;
    let err = fetch_json(
        &client(),
        &server.uri(),
        r#"{"sslPinning": {"cert": "server"}}"#,
    )
    .await
    .unwrap_err();
    assert!(err.contains("https"), "{}", err);
}
