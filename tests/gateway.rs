//! Integration tests: the console client against a mock agent service.

use maritime_console::gateway::{ErrorEvent, RequestEvent, ResponseEvent};
use maritime_console::{
    ClientConfig, ConsoleClient, Error, ErrorKind, FileAttachment, Gateway, GatewayObserver,
    Operation,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    headers: Mutex<Vec<Vec<(String, String)>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn request_headers(&self) -> Vec<Vec<(String, String)>> {
        self.headers.lock().unwrap().clone()
    }
}

impl GatewayObserver for Recorder {
    fn on_request(&self, event: &RequestEvent<'_>) {
        self.headers.lock().unwrap().push(event.headers.clone());
        self.events
            .lock()
            .unwrap()
            .push(format!("request {} {} {}", event.operation, event.method, event.url));
    }

    fn on_response(&self, event: &ResponseEvent<'_>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("response {} {}", event.operation, event.status));
    }

    fn on_error(&self, event: &ErrorEvent<'_>) {
        self.events.lock().unwrap().push(format!(
            "error {} {} {:?}",
            event.operation, event.kind, event.status
        ));
    }
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api", server.uri()))
}

fn client_for(server: &MockServer) -> ConsoleClient {
    ConsoleClient::from_config(config_for(server)).unwrap()
}

fn recorded_client(config: ClientConfig) -> (ConsoleClient, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let gateway = Gateway::with_observer(config, recorder.clone()).unwrap();
    (ConsoleClient::new(gateway), recorder)
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

async fn only_request(server: &MockServer) -> wiremock::Request {
    let mut requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn content_type(request: &wiremock::Request) -> String {
    request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn ping_reports_request_and_response_to_observer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, recorder) = recorded_client(config_for(&server));
    let reply = assert_ok!(client.ping().await);
    assert!(reply.is_healthy());

    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        format!("request ping GET {}/api/ping", server.uri())
    );
    assert_eq!(events[1], "response ping 200");
}

#[tokio::test]
async fn observed_request_headers_match_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, recorder) = recorded_client(config_for(&server));
    assert_ok!(client.ping().await);

    let headers = recorder.request_headers();
    assert_eq!(headers.len(), 1);
    assert!(headers[0].contains(&("accept".to_string(), "application/json".to_string())));

    let request = only_request(&server).await;
    assert_eq!(
        request.headers.get("accept").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[tokio::test]
async fn agent_query_without_optionals_sends_only_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Departure looks safe",
            "tools_used": ["weather_forecast"],
            "execution_plan": "Handled by conversational-react agent",
            "confidence": 0.9,
            "timestamp": "2024-01-01T00:00:00"
        })))
        .mount(&server)
        .await;

    let reply = assert_ok!(client_for(&server).agent_query("x", None, None).await);
    assert_eq!(reply.answer, "Departure looks safe");
    assert_eq!(reply.tools_used, vec![json!("weather_forecast")]);

    let request = only_request(&server).await;
    assert!(content_type(&request).starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"query\""));
    assert!(!body.contains("name=\"file\""));
    assert!(!body.contains("name=\"context\""));
}

#[tokio::test]
async fn agent_query_with_file_and_context_sends_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "ok" })))
        .mount(&server)
        .await;

    let file = FileAttachment::new("notes.txt", b"ETA Rotterdam 14:00".to_vec())
        .with_mime_type("text/plain");
    assert_ok!(
        client_for(&server)
            .agent_query("x", Some(file), Some(json!({ "a": 1 })))
            .await
    );

    let request = only_request(&server).await;
    let content_type = content_type(&request);
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(!content_type.contains("application/json"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"query\""));
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("ETA Rotterdam 14:00"));
    assert!(body.contains("name=\"context\"\r\n\r\n{\"a\":1}\r\n"));
}

#[tokio::test]
async fn ask_direct_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "query": "What is laytime?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "Time allowed for loading" })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = assert_ok!(client_for(&server).ask_direct("What is laytime?").await);
    assert_eq!(payload["answer"], "Time allowed for loading");
}

#[tokio::test]
async fn summarize_document_uploads_file_from_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "Charter party, 12 clauses" })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("charter.txt");
    std::fs::write(&file_path, "CLAUSE 1. Laytime shall commence...").unwrap();

    let file = assert_ok!(FileAttachment::from_path(&file_path).await);
    assert_eq!(file.file_name(), "charter.txt");

    let payload = assert_ok!(client_for(&server).summarize_document(file).await);
    assert_eq!(payload["summary"], "Charter party, 12 clauses");

    let request = only_request(&server).await;
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\"; filename=\"charter.txt\""));
}

#[tokio::test]
async fn weather_uses_path_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather/10.5/-20.25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "wind_speed": 12.4 })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = assert_ok!(client_for(&server).weather(10.5, -20.25).await);
    assert_eq!(payload["wind_speed"], 12.4);

    let request = only_request(&server).await;
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn agent_endpoints_resolve_against_api_base() {
    let server = MockServer::start().await;
    for (verb, route) in [
        ("GET", "/api/agent/status"),
        ("GET", "/api/agent/examples"),
        ("GET", "/api/agent/memory"),
        ("POST", "/api/agent/memory/clear"),
        ("GET", "/api/agent/tools"),
        ("GET", "/api/agent/comparison"),
    ] {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "route": route })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    assert_eq!(client.agent_status().await.unwrap()["route"], "/api/agent/status");
    assert_eq!(client.agent_examples().await.unwrap()["route"], "/api/agent/examples");
    assert_eq!(client.agent_memory().await.unwrap()["route"], "/api/agent/memory");
    assert_eq!(
        client.clear_agent_memory().await.unwrap()["route"],
        "/api/agent/memory/clear"
    );
    assert_eq!(client.available_tools().await.unwrap()["route"], "/api/agent/tools");
    assert_eq!(client.comparison().await.unwrap()["route"], "/api/agent/comparison");
}

#[tokio::test]
async fn remote_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agent/status"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(r#"{"detail":"Error fetching agent status: boom"}"#),
        )
        .mount(&server)
        .await;

    let (client, recorder) = recorded_client(config_for(&server));
    let err = assert_err!(client.agent_status().await);
    assert_eq!(err.kind(), ErrorKind::Remote);
    match err {
        Error::Remote { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body, r#"{"detail":"Error fetching agent status: boom"}"#);
        }
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.remote_json().unwrap()["detail"],
        "Error fetching agent status: boom"
    );

    let events = recorder.events();
    assert_eq!(events.last().unwrap(), "error agent_status remote Some(500)");
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agent/examples"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(client_for(&server).agent_examples().await);
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn slow_call_is_classified_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "healthy" }))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_default_timeout(Duration::from_millis(100));
    let (client, recorder) = recorded_client(config);

    let err = assert_err!(client.ping().await);
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err, Error::Timeout { timeout, .. } if timeout == Duration::from_millis(100)));

    let events = recorder.events();
    assert_eq!(events.last().unwrap(), "error ping timeout None");
}

#[tokio::test]
async fn agent_query_gets_the_extended_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "answer": "done" }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/agent/tools"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_default_timeout(Duration::from_millis(100))
        .with_extended_timeout(Duration::from_secs(5));
    let client = ConsoleClient::from_config(config).unwrap();

    let reply = assert_ok!(client.agent_query("plan voyage", None, None).await);
    assert_eq!(reply.answer, "done");

    let err = assert_err!(client.available_tools().await);
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_classified_as_connectivity() {
    let base_url = format!("http://127.0.0.1:{}/api", closed_port());
    let client = ConsoleClient::from_config(ClientConfig::new(base_url.clone())).unwrap();

    let err = assert_err!(client.ping().await);
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(err.to_string().contains(&base_url));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn connection_test_probes_service_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).connection_test().await);
}

#[tokio::test]
async fn connection_test_reports_false_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    assert!(!client_for(&server).connection_test().await);

    let unreachable = ClientConfig::new(format!("http://127.0.0.1:{}/api", closed_port()));
    assert!(!ConsoleClient::from_config(unreachable).unwrap().connection_test().await);
}

#[tokio::test]
async fn descriptors_are_executed_as_built() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agent/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["weather", "laytime"])))
        .mount(&server)
        .await;

    let gateway = Gateway::new(config_for(&server)).unwrap();
    let descriptor = Operation::AvailableTools.descriptor();
    assert_eq!(descriptor, Operation::AvailableTools.descriptor());

    let payload = assert_ok!(gateway.execute(&descriptor).await);
    assert_eq!(payload, json!(["weather", "laytime"]));
}
