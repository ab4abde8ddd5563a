use serde_json::{json, Value};
use tem_core::settings::EMAIL_BACKEND;
use tem_core::{
    send_mail, Attachment, BackendRegistry, EmailBackend, EmailMessage, MailError, Settings,
};
use tem_scaleway::config::{API_KEY_SETTING, API_URL_SETTING, PROJECT_ID_SETTING};
use tem_scaleway::{ScalewayBackend, ScalewayEmailError, ScalewayPlugin};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers with one delivery record per recipient found in the request body
struct EchoRecipients;

impl Respond for EchoRecipients {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let payload: Value = serde_json::from_slice(&request.body).unwrap();
        let count: usize = ["to", "cc", "bcc"]
            .iter()
            .map(|field| payload[field].as_array().map_or(0, Vec::len))
            .sum();

        let emails: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("dummy-id-{}", i),
                    "status": "new",
                    "rcpt_to": "",
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({ "emails": emails }))
    }
}

async fn mock_scaleway() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("X-Auth-Token", "dummy-api-key"))
        .and(body_partial_json(json!({"project_id": "dummy-project-id"})))
        .respond_with(EchoRecipients)
        .mount(&mock_server)
        .await;

    mock_server
}

fn settings(mock_server: &MockServer) -> Settings {
    Settings::new()
        .with(EMAIL_BACKEND, "scaleway")
        .with(PROJECT_ID_SETTING, "dummy-project-id")
        .with(API_KEY_SETTING, "dummy-api-key")
        .with(API_URL_SETTING, format!("{}/emails", mock_server.uri()))
}

fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::with_defaults();
    registry.register_plugin(&ScalewayPlugin::new());
    registry
}

async fn send_test_email(settings: &Settings) -> Result<Option<usize>, MailError> {
    send_mail(
        &registry(),
        settings,
        "Subject here",
        "Here is the message.",
        Some("postmaster@localhost"),
        &["test@example.com"],
        false,
    )
    .await
}

async fn last_payload(mock_server: &MockServer) -> Value {
    let requests = mock_server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

#[tokio::test]
async fn test_send_message() {
    let mock_server = mock_scaleway().await;

    let sent = send_test_email(&settings(&mock_server)).await.unwrap();
    assert_eq!(sent, Some(1));

    let payload = last_payload(&mock_server).await;
    assert_eq!(payload["from"], json!({"email": "postmaster@localhost"}));
    assert_eq!(payload["subject"], "Subject here");
    assert_eq!(payload["text"], "Here is the message.");
}

#[tokio::test]
async fn test_send_message_multiple_recipients() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();

    let message = EmailMessage::new(
        "Subject here",
        "This message has three recipients.",
        "postmaster@localhost",
        ["test@example.com", "another@example.com"],
    )
    .cc("carbon@copy.com");

    assert_eq!(backend.send_messages(&[message]).await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_count_sums_across_messages() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();

    let messages = vec![
        EmailMessage::new("One", "Body", "postmaster@localhost", ["a@example.com"])
            .bcc("b@example.com"),
        EmailMessage::new("Two", "Body", "postmaster@localhost", ["c@example.com"]),
    ];

    assert_eq!(backend.send_messages(&messages).await.unwrap(), Some(3));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_html_reply_to_and_attachment_reach_the_api() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();

    let message = EmailMessage::new(
        "Subject here",
        "Here is the test message. Thank you.",
        "postmaster@localhost",
        ["test@example.com"],
    )
    .bcc("postmaster@localhost")
    .reply_to("support@example.com")
    .attach_alternative("<p>Here is the test message.</p>", "text/html")
    .attach(Attachment::new(
        "example.txt",
        "Here is the test message.\n\nThank you.",
        "text/plain",
    ));

    assert_eq!(backend.send_messages(&[message]).await.unwrap(), Some(2));

    let payload = last_payload(&mock_server).await;
    assert_eq!(payload["text"], "Here is the test message. Thank you.");
    assert_eq!(payload["html"], "<p>Here is the test message.</p>");
    assert_eq!(
        payload["additional_headers"],
        json!([{"key": "Reply-To", "value": "support@example.com"}])
    );
    assert_eq!(payload["attachments"][0]["name"], "example.txt");
    assert_eq!(payload["attachments"][0]["type"], "text/plain");
    assert_eq!(
        payload["attachments"][0]["content"],
        "SGVyZSBpcyB0aGUgdGVzdCBtZXNzYWdlLgoKVGhhbmsgeW91Lg=="
    );
}

#[tokio::test]
async fn test_scaleway_required_settings() {
    let mock_server = mock_scaleway().await;

    let bare = Settings::new().with(EMAIL_BACKEND, "scaleway");
    let err = send_test_email(&bare).await.unwrap_err();
    assert!(err.is_configuration());

    let mut no_key = settings(&mock_server);
    no_key.remove(API_KEY_SETTING);
    let err = send_test_email(&no_key).await.unwrap_err();
    assert!(matches!(err, MailError::ImproperlyConfigured(ref msg) if msg.contains(API_KEY_SETTING)));

    let mut no_project = settings(&mock_server);
    no_project.remove(PROJECT_ID_SETTING);
    let err = send_test_email(&no_project).await.unwrap_err();
    assert!(matches!(err, MailError::ImproperlyConfigured(ref msg) if msg.contains(PROJECT_ID_SETTING)));

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_configuration_errors_are_not_silenced() {
    let registry = registry();
    let settings = Settings::new().with(EMAIL_BACKEND, "scw");

    let err = registry.get_connection(&settings, true).err().unwrap();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_scaleway_attachment_invalid_mime() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();

    let message = EmailMessage::new(
        "Subject here",
        "This message has an invalid attachment.",
        "postmaster@localhost",
        ["test@example.com"],
    )
    .attach(Attachment::new(
        "test.mp3",
        b"dummy-content".to_vec(),
        "audio/mpeg",
    ));

    let err = backend.send_messages(&[message]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Attachment test.mp3 has a disallowed content type: audio/mpeg"
    );
    assert!(matches!(
        err.downcast_backend::<ScalewayEmailError>(),
        Some(ScalewayEmailError::DisallowedAttachment { .. })
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_error_is_raised() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"message\":\"denied\"}"))
        .mount(&mock_server)
        .await;

    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();
    let message = EmailMessage::new("Hi", "Body", "postmaster@localhost", ["a@example.com"]);

    let err = backend.send_messages(&[message]).await.unwrap_err();
    let scw = err.downcast_backend::<ScalewayEmailError>().unwrap();
    assert_eq!(scw.status(), Some(401));
    assert_eq!(
        err.to_string(),
        "Scaleway API Error 401: {\"message\":\"denied\"}"
    );
}

#[tokio::test]
async fn test_non_200_success_status_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"emails": []})))
        .mount(&mock_server)
        .await;

    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();
    let message = EmailMessage::new("Hi", "Body", "postmaster@localhost", ["a@example.com"]);

    let err = backend.send_messages(&[message]).await.unwrap_err();
    assert_eq!(
        err.downcast_backend::<ScalewayEmailError>()
            .and_then(ScalewayEmailError::status),
        Some(202)
    );
}

#[tokio::test]
async fn test_fail_silently_swallows_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = ScalewayBackend::from_settings(&settings(&mock_server), true).unwrap();
    let messages = vec![
        EmailMessage::new("One", "Body", "postmaster@localhost", ["a@example.com"]),
        EmailMessage::new("Two", "Body", "postmaster@localhost", ["b@example.com"]),
    ];

    assert_eq!(backend.send_messages(&messages).await.unwrap(), None);
}

#[tokio::test]
async fn test_fail_silently_swallows_disallowed_attachment() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), true).unwrap();

    let message = EmailMessage::new("Hi", "Body", "postmaster@localhost", ["a@example.com"])
        .attach(Attachment::new("track.mp3", b"dummy-content".to_vec(), "audio/mpeg"));

    assert_eq!(backend.send_messages(&[message]).await.unwrap(), None);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_count_wins_on_mismatch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"emails": [{"id": "dummy-id-0"}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();
    let message = EmailMessage::new(
        "Subject here",
        "Three recipients, one record.",
        "postmaster@localhost",
        ["test@example.com", "another@example.com"],
    )
    .cc("carbon@copy.com");

    assert_eq!(message.recipients().len(), 3);
    assert_eq!(backend.send_messages(&[message]).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_invalid_response_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();
    let message = EmailMessage::new("Hi", "Body", "postmaster@localhost", ["a@example.com"]);

    let err = backend.send_messages(&[message]).await.unwrap_err();
    assert!(matches!(
        err.downcast_backend::<ScalewayEmailError>(),
        Some(ScalewayEmailError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_empty_batch_sends_nothing() {
    let mock_server = mock_scaleway().await;
    let backend = ScalewayBackend::from_settings(&settings(&mock_server), false).unwrap();

    assert_eq!(backend.send_messages(&[]).await.unwrap(), None);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

/// Talks to the real API. Run with `cargo test -- --ignored` and the
/// Scaleway credentials and addresses exported.
#[tokio::test]
#[ignore = "sends a real email through the Scaleway API"]
async fn test_scaleway_email_real() {
    let project_id = std::env::var(PROJECT_ID_SETTING).expect("SCALEWAY_EMAIL_PROJECT_ID not set");
    let api_key = std::env::var(API_KEY_SETTING).expect("SCALEWAY_EMAIL_API_KEY not set");
    let from_email = std::env::var("SCALEWAY_FROM_EMAIL").expect("SCALEWAY_FROM_EMAIL not set");
    let to_email = std::env::var("SCALEWAY_TO_EMAIL").expect("SCALEWAY_TO_EMAIL not set");

    let settings = Settings::new()
        .with(PROJECT_ID_SETTING, project_id)
        .with(API_KEY_SETTING, api_key);
    let backend = ScalewayBackend::from_settings(&settings, false).unwrap();

    let message = EmailMessage::new(
        "Subject here",
        "Here is the test message. Thank you.",
        from_email.clone(),
        [to_email],
    )
    .bcc(from_email)
    .attach_alternative(
        "<p>Here is the test <a href=\"https://duckduckgo.com\">message</a>.<br><br>Thank you.</p>",
        "text/html",
    )
    .attach(Attachment::new(
        "example.txt",
        "Here is the test message.\n\nThank you.",
        "text/plain",
    ));

    // to and bcc are counted separately
    assert_eq!(backend.send_messages(&[message]).await.unwrap(), Some(2));
}
