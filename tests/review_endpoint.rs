//! End-to-end tests against a local stand-in for the generateContent endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderName, Method, StatusCode, Uri, header};
use serde_json::{Value, json};

use codereview::chat::ChatSession;
use codereview::{
    ClientLogger, Error, Gemini, GeminiReviewer, GenerateContentRequest, GenerateContentResponse,
    MISSING_KEY_NOTICE, Message, Model, WARNING_MARKER, review_prompt,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    body: String,
}

struct Mock {
    status: StatusCode,
    body: String,
    retry_after: Option<&'static str>,
    requests: Mutex<Vec<Recorded>>,
}

impl Mock {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(mock): State<Arc<Mock>>,
    method: Method,
    uri: Uri,
    body: String,
) -> (StatusCode, [(HeaderName, String); 2], String) {
    mock.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(String::from),
        body,
    });
    (
        mock.status,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::RETRY_AFTER,
                mock.retry_after.unwrap_or("0").to_string(),
            ),
        ],
        mock.body.clone(),
    )
}

async fn serve(status: StatusCode, body: impl Into<String>) -> (Arc<Mock>, String) {
    serve_with_retry_after(status, body, None).await
}

async fn serve_with_retry_after(
    status: StatusCode,
    body: impl Into<String>,
    retry_after: Option<&'static str>,
) -> (Arc<Mock>, String) {
    let mock = Arc::new(Mock {
        status,
        body: body.into(),
        retry_after,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handle).with_state(Arc::clone(&mock));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, format!("http://{addr}/v1beta/"))
}

fn success_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn session_for(base_url: &str, api_key: &str) -> ChatSession<GeminiReviewer> {
    let reviewer = GeminiReviewer::new(Model::default()).with_base_url(Some(base_url.to_string()));
    let mut session = ChatSession::new(reviewer).with_api_key(api_key);
    assert!(session.confirm_api_key() || api_key.trim().is_empty());
    session
}

#[tokio::test]
async fn success_text_is_appended_verbatim() {
    let review = "## Code Quality\n\nLooks **fine**.\n\n```rust\nfn main() {}\n```\n";
    let (mock, base_url) = serve(StatusCode::OK, success_body(review)).await;
    let mut session = session_for(&base_url, "test-key");

    let code = "fn main() {\n    println!(\"hi\");\n}";
    session.set_draft(code);
    assert_eq!(session.submit().await, Some(2));

    assert_eq!(session.message_count(), 3);
    assert_eq!(session.messages()[1], Message::user(code));
    assert_eq!(session.messages()[2], Message::assistant(review));
    assert_eq!(session.draft(), "");
    assert!(!session.is_loading());

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].path,
        "/v1beta/models/gemini-2.5-pro:generateContent"
    );
    assert_eq!(requests[0].query.as_deref(), Some("key=test-key"));
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({ "contents": [{ "parts": [{ "text": review_prompt(code) }] }] })
    );
}

#[tokio::test]
async fn bad_request_message_is_surfaced() {
    let (mock, base_url) = serve(
        StatusCode::BAD_REQUEST,
        json!({ "error": { "message": "bad request" } }).to_string(),
    )
    .await;
    let mut session = session_for(&base_url, "test-key");

    session.set_draft("let x = ;");
    session.submit().await;

    let reply = &session.messages()[2];
    assert!(reply.is_assistant());
    assert!(reply.content.contains("bad request"));
    assert!(reply.content.starts_with(WARNING_MARKER));
    assert!(reply.content.ends_with("Please check your API key and try again."));
    assert_eq!(mock.requests().len(), 1);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn error_without_message_uses_generic_failure() {
    let (_mock, base_url) = serve(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;
    let mut session = session_for(&base_url, "test-key");

    session.set_draft("x");
    session.submit().await;

    assert_eq!(
        session.messages()[2].content,
        "⚠️ Error: Failed to analyze code\n\nPlease check your API key and try again."
    );
}

#[tokio::test]
async fn missing_candidate_text_is_reported() {
    let (_mock, base_url) = serve(StatusCode::OK, json!({ "candidates": [] }).to_string()).await;
    let mut session = session_for(&base_url, "test-key");

    session.set_draft("x");
    session.submit().await;

    let reply = &session.messages()[2].content;
    assert!(reply.starts_with(WARNING_MARKER));
    assert!(reply.contains("Malformed response"));
}

#[tokio::test]
async fn unparseable_body_is_reported() {
    let (_mock, base_url) = serve(StatusCode::OK, "<html>not json</html>").await;
    let mut session = session_for(&base_url, "test-key");

    session.set_draft("x");
    session.submit().await;

    let reply = &session.messages()[2].content;
    assert!(reply.starts_with(WARNING_MARKER));
    assert!(reply.contains("Failed to parse response"));
}

#[tokio::test]
async fn empty_key_makes_no_request() {
    let (mock, base_url) = serve(StatusCode::OK, success_body("unused")).await;
    let reviewer = GeminiReviewer::new(Model::default()).with_base_url(Some(base_url));
    let mut session = ChatSession::new(reviewer);

    session.set_draft("x");
    session.submit().await;

    assert_eq!(session.message_count(), 3);
    assert_eq!(session.messages()[2], Message::assistant(MISSING_KEY_NOTICE));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_is_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut session = session_for(&format!("http://{addr}/v1beta/"), "test-key");

    session.set_draft("x");
    session.submit().await;

    let reply = &session.messages()[2].content;
    assert!(
        reply.starts_with("⚠️ Error: Connection error: error sending request"),
        "{reply}"
    );
    assert_eq!(reply.matches("Connection error").count(), 1, "{reply}");
    assert!(reply.ends_with("\n\nPlease check your API key and try again."));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn model_change_changes_path() {
    let (mock, base_url) = serve(StatusCode::OK, success_body("ok")).await;
    let mut session = session_for(&base_url, "test-key");
    session
        .backend_mut()
        .set_model("gemini-2.5-flash".parse().unwrap());

    session.set_draft("x");
    session.submit().await;

    assert_eq!(
        mock.requests()[0].path,
        "/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[tokio::test]
async fn client_maps_status_codes() {
    let (_mock, base_url) = serve_with_retry_after(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED" } })
            .to_string(),
        Some("17"),
    )
    .await;
    let client = Gemini::with_options(Some("test-key".to_string()), Some(base_url), None).unwrap();

    let err = client
        .generate_text(&Model::default(), "prompt")
        .await
        .unwrap_err();
    match err {
        Error::RateLimit {
            message,
            retry_after,
        } => {
            assert_eq!(message, "quota");
            assert_eq!(retry_after, Some(17));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let (_mock, base_url) = serve(
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "denied" } }).to_string(),
    )
    .await;
    let client = Gemini::with_options(Some("test-key".to_string()), Some(base_url), None).unwrap();
    let err = client
        .generate_text(&Model::default(), "prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Permission { ref message } if message == "denied"));
}

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<String>>,
}

impl ClientLogger for RecordingLogger {
    fn log_request(&self, model: &Model, _: &GenerateContentRequest) {
        self.events.lock().unwrap().push(format!("request {model}"));
    }

    fn log_response(&self, response: &GenerateContentResponse) {
        self.events
            .lock()
            .unwrap()
            .push(format!("response {}", response.first_text().unwrap_or("")));
    }

    fn log_error(&self, error: &Error) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error {}", error.message()));
    }
}

#[tokio::test]
async fn logger_observes_requests() {
    let (_mock, base_url) = serve(StatusCode::OK, success_body("all good")).await;
    let logger = Arc::new(RecordingLogger::default());
    let client = Gemini::with_options(Some("test-key".to_string()), Some(base_url), None)
        .unwrap()
        .with_logger(logger.clone());

    let text = client
        .generate_text(&Model::default(), "prompt")
        .await
        .unwrap();
    assert_eq!(text, "all good");

    let (_mock, base_url) = serve(
        StatusCode::BAD_REQUEST,
        json!({ "error": { "message": "nope" } }).to_string(),
    )
    .await;
    let reviewer = GeminiReviewer::new(Model::default())
        .with_base_url(Some(base_url))
        .with_logger(logger.clone());
    let mut session = ChatSession::new(reviewer).with_api_key("test-key");
    session.set_draft("x");
    session.submit().await;

    assert_eq!(
        *logger.events.lock().unwrap(),
        vec![
            "request gemini-2.5-pro".to_string(),
            "response all good".to_string(),
            "request gemini-2.5-pro".to_string(),
            "error nope".to_string(),
        ]
    );
}
