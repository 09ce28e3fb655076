use folio_http::{HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Ack {
    success: bool,
    #[serde(default)]
    message: String,
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/", server.uri())).expect("mock base url")
}

#[tokio::test]
async fn post_form_sends_urlencoded_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=Ada&message=hi+there"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "message": "ok" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ack: Ack = client_for(&server)
        .post_form(
            "submit",
            &[("name", "Ada"), ("message", "hi there")],
            RequestOpts::default(),
        )
        .await
        .expect("form accepted");

    assert!(ack.success);
    assert_eq!(ack.message, "ok");
}

#[tokio::test]
async fn client_error_surfaces_the_structured_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            serde_json::json!({ "success": false, "message": "Invalid access key" }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = HttpClient::new(&format!("{}/", server.uri()))
        .unwrap()
        .post_form::<Ack>("submit", &[("access_key", "nope")], RequestOpts::default())
        .await
        .expect_err("400 is an error");

    match err {
        HttpError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "Invalid access key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_sent_once_and_keeps_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("retry-after", "1")
                .set_body_string("<html>busy</html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .post_form::<Ack>("submit", &[("name", "x")], RequestOpts::default())
        .await
        .expect_err("503 is an error");

    match err {
        HttpError::Api { status, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "<html>busy</html>");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .post_form::<Ack>("submit", &[("name", "x")], RequestOpts::default())
        .await
        .expect_err("html is not json");

    match err {
        HttpError::Decode(_, snippet) => assert!(snippet.contains("<html>")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn absolute_paths_bypass_the_base_when_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new("https://unreachable.invalid/").unwrap();
    let ack: Ack = client
        .post_form(
            &format!("{}/elsewhere", server.uri()),
            &[("name", "x")],
            RequestOpts {
                allow_absolute: true,
                ..Default::default()
            },
        )
        .await
        .expect("absolute url used");
    assert!(ack.success);
}
