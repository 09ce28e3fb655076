use std::sync::Arc;

use folio_contact::{
    ContactFields, ContactForm, FormRelay, FormSettings, RelayError, RelayResponse, Submission,
    SubmitOutcome, Web3FormsRelay,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fields() -> ContactFields {
    ContactFields {
        name: "Grace Hopper".into(),
        email: "grace@example.com".into(),
        subject: "Compilers".into(),
        message: "It's easier to ask forgiveness.".into(),
    }
}

fn relay_for(server: &MockServer) -> Web3FormsRelay {
    Web3FormsRelay::new(&format!("{}/submit", server.uri()), "test-access-key").unwrap()
}

#[tokio::test]
async fn posts_all_fields_with_the_access_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("name=Grace+Hopper"))
        .and(body_string_contains("email=grace%40example.com"))
        .and(body_string_contains("subject=Compilers"))
        .and(body_string_contains("message=It%27s+easier+to+ask+forgiveness."))
        .and(body_string_contains("access_key=test-access-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Email sent successfully!",
            "data": { "name": "Grace Hopper" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = relay_for(&server).deliver(&fields()).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.message.as_deref(), Some("Email sent successfully!"));
}

#[tokio::test]
async fn success_false_in_a_200_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": false, "message": "Spam detected" })),
        )
        .mount(&server)
        .await;

    let resp = relay_for(&server).deliver(&fields()).await.unwrap();
    assert_eq!(resp, RelayResponse::rejected("Spam detected"));
}

#[tokio::test]
async fn client_error_with_a_verdict_body_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "success": false, "message": "Invalid access key" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = relay_for(&server).deliver(&fields()).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.message.as_deref(), Some("Invalid access key"));
}

#[tokio::test]
async fn server_errors_are_transport_failures_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = relay_for(&server).deliver(&fields()).await.unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
}

#[tokio::test]
async fn not_found_html_page_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<html><body>Not Found</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = relay_for(&server).deliver(&fields()).await.unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
}

#[tokio::test]
async fn server_error_with_a_verdict_body_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({ "success": false, "message": "Relay is down" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = relay_for(&server).deliver(&fields()).await.unwrap();
    assert_eq!(resp, RelayResponse::rejected("Relay is down"));
}

#[tokio::test]
async fn non_success_status_never_reads_as_acceptance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "success": true })),
        )
        .mount(&server)
        .await;

    let resp = relay_for(&server).deliver(&fields()).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.message, None);
}

#[tokio::test]
async fn unparseable_answer_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .mount(&server)
        .await;

    let err = relay_for(&server).deliver(&fields()).await.unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
}

#[test]
fn blank_access_key_is_refused() {
    assert!(matches!(
        Web3FormsRelay::new("https://api.web3forms.com/submit", "   "),
        Err(RelayError::MissingAccessKey)
    ));
}

#[test]
fn debug_output_hides_the_access_key() {
    let relay = Web3FormsRelay::new("https://api.web3forms.com/submit", "super-secret").unwrap();
    let rendered = format!("{relay:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("api.web3forms.com"));
}

#[tokio::test]
async fn form_round_trip_against_the_relay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let form = ContactForm::new(Arc::new(relay_for(&server)), FormSettings::default());
    let f = fields();
    for (name, value) in f.pairs() {
        form.update_field(name.parse().unwrap(), value);
    }

    assert_eq!(form.submit().await, Ok(SubmitOutcome::Succeeded));
    let snap = form.snapshot();
    assert_eq!(snap.submission, Submission::Succeeded);
    assert!(snap.fields.is_empty());
    form.stop();
}
