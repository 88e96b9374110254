//! Client tests against an in-process emulation of the REST API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes as Body;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cogvis_core::contract::{
    Detail, ImageSource, Model, OperationStatus, TextRecognitionMode, ThumbnailRequest,
    VisualFeature,
};
use cogvis_core::{ErrorKind, PollError, PollPolicy, ServiceStatus, VisionProvider};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::{ReqwestClient, ReqwestConfig};

const KEY: &str = "test-key";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct Emulator {
    requests: Mutex<Vec<Recorded>>,
    operation_queries: AtomicU32,
}

impl Emulator {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().unwrap()
    }
}

async fn handle(
    State(state): State<Arc<Emulator>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        content_type: header(CONTENT_TYPE.as_str()),
        body: body.to_vec(),
    });

    if header("ocp-apim-subscription-key").as_deref() != Some(KEY) {
        let body = json!({"error": {"code": "401", "message": "Access denied due to invalid subscription key."}});
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let host = header(HOST.as_str()).unwrap_or_default();
    let path = uri.path().trim_start_matches("/vision/v1.0");

    match (method, path) {
        (Method::POST, "/analyze") => Json(json!({
            "requestId": "req-analyze",
            "metadata": {"width": 640, "height": 480, "format": "Jpeg"},
            "categories": [{"name": "animal_dog", "score": 0.98}],
            "description": {
                "tags": ["dog", "grass"],
                "captions": [
                    {"text": "a dog lying on grass", "confidence": 0.91},
                    {"text": "a dog", "confidence": 0.42}
                ]
            }
        }))
        .into_response(),
        (Method::POST, "/models/celebrities/analyze") => Json(json!({
            "requestId": "req-domain",
            "metadata": {"width": 200, "height": 300, "format": "Png"},
            "result": {"celebrities": [{"name": "Someone", "confidence": 0.97}]}
        }))
        .into_response(),
        (Method::POST, "/describe") => Json(json!({
            "requestId": "req-describe",
            "description": {"tags": ["dog"], "captions": [{"text": "a dog", "confidence": 0.8}]}
        }))
        .into_response(),
        (Method::GET, "/models") => Json(json!({
            "models": [
                {"name": "celebrities", "categories": ["people_"]},
                {"name": "landmarks", "categories": ["building_", "outdoor_"]}
            ]
        }))
        .into_response(),
        (Method::POST, "/ocr") if uri.query().is_some_and(|q| q.contains("language=xx")) => {
            (StatusCode::OK, [(CONTENT_TYPE, "application/json")], "{not json").into_response()
        }
        (Method::POST, "/ocr") => Json(json!({
            "language": "en",
            "textAngle": 0.0,
            "orientation": "Up",
            "regions": [{
                "boundingBox": "10,10,200,40",
                "lines": [{
                    "boundingBox": "10,10,200,40",
                    "words": [
                        {"boundingBox": "10,10,90,40", "text": "Hello"},
                        {"boundingBox": "110,10,100,40", "text": "world"}
                    ]
                }]
            }]
        }))
        .into_response(),
        (Method::POST, "/recognizeText") if &body[..] == b"no-location" => {
            StatusCode::ACCEPTED.into_response()
        }
        (Method::POST, "/recognizeText") => {
            let operation = if &body[..] == b"fails" { "op-fail" } else { "op-1" };
            let location = format!("http://{host}/vision/v1.0/textOperations/{operation}");
            (StatusCode::ACCEPTED, [("Operation-Location", location)]).into_response()
        }
        (Method::GET, "/textOperations/op-1") => {
            let queries = state.operation_queries.fetch_add(1, Ordering::SeqCst) + 1;
            if queries < 3 {
                Json(json!({"status": "Running"})).into_response()
            } else {
                Json(json!({
                    "status": "Succeeded",
                    "recognitionResult": {
                        "lines": [
                            {
                                "boundingBox": [0, 0, 100, 0, 100, 20, 0, 20],
                                "text": "Hello world",
                                "words": [
                                    {"boundingBox": [0, 0, 40, 0, 40, 20, 0, 20], "text": "Hello"},
                                    {"boundingBox": [50, 0, 100, 0, 100, 20, 50, 20], "text": "world"}
                                ]
                            },
                            {
                                "boundingBox": [0, 30, 60, 30, 60, 50, 0, 50],
                                "text": "again",
                                "words": [{"boundingBox": [0, 30, 60, 30, 60, 50, 0, 50], "text": "again"}]
                            }
                        ]
                    }
                }))
                .into_response()
            }
        }
        (Method::GET, "/textOperations/op-fail") => Json(json!({
            "status": "Failed",
            "recognitionResult": {"lines": [{"boundingBox": [], "text": "stale", "words": []}]}
        }))
        .into_response(),
        (Method::GET, "/textOperations/op-stuck") => {
            state.operation_queries.fetch_add(1, Ordering::SeqCst);
            Json(json!({"status": "NotStarted"})).into_response()
        }
        (Method::GET, "/textOperations/op-outage") => {
            let queries = state.operation_queries.fetch_add(1, Ordering::SeqCst) + 1;
            if queries < 2 {
                Json(json!({"status": "Running"})).into_response()
            } else {
                let body = json!({"code": "ServiceUnavailable", "message": "Try again later", "requestId": "req-503"});
                (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
            }
        }
        (Method::GET, "/textOperations/op-unknown") => {
            Json(json!({"status": "Paused"})).into_response()
        }
        (Method::POST, "/generateThumbnail") => (
            StatusCode::OK,
            [(CONTENT_TYPE, "image/png")],
            vec![0x89, b'P', b'N', b'G'],
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "NotFound", "message": "Resource not found", "requestId": "req-404"})),
        )
            .into_response(),
    }
}

async fn spawn_emulator() -> (Arc<Emulator>, String) {
    let state = Arc::new(Emulator::default());
    let router = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (state, format!("http://{addr}/vision/v1.0/"))
}

async fn client_with_key(key: &str) -> (Arc<Emulator>, ReqwestClient) {
    let (state, api_root) = spawn_emulator().await;
    let config = ReqwestConfig::new(key).with_api_root(api_root).with_timeout(5);
    (state, ReqwestClient::new(config).unwrap())
}

async fn client() -> (Arc<Emulator>, ReqwestClient) {
    client_with_key(KEY).await
}

fn dog() -> ImageSource {
    ImageSource::from_url("https://example.com/dog.jpg").unwrap()
}

fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(max_attempts, Duration::from_millis(10)).unwrap()
}

#[tokio::test]
async fn test_analyze_image_sends_url_body_and_parameters() {
    let (state, client) = client().await;

    let result = client
        .analyze_image(
            &dog(),
            &[VisualFeature::Categories, VisualFeature::Description],
            &[Detail::Celebrities],
        )
        .await
        .unwrap();

    assert_eq!(result.request_id.as_deref(), Some("req-analyze"));
    assert_eq!(result.best_caption().unwrap().text, "a dog lying on grass");
    assert_eq!(result.categories[0].name, "animal_dog");

    let request = state.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/vision/v1.0/analyze");
    assert_eq!(
        request.query.as_deref(),
        Some("visualFeatures=Categories%2CDescription&details=Celebrities")
    );
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"url": "https://example.com/dog.jpg"}));
}

#[tokio::test]
async fn test_analyze_image_omits_empty_parameters() {
    let (state, client) = client().await;

    client.analyze_image(&dog(), &[], &[]).await.unwrap();

    assert_eq!(state.last().query, None);
}

#[tokio::test]
async fn test_bytes_are_sent_as_octet_stream() {
    let (state, client) = client().await;
    let image = ImageSource::from_bytes(vec![0xFF, 0xD8, 0xFF]);

    client.describe(&image, 2).await.unwrap();

    let request = state.last();
    assert_eq!(request.path, "/vision/v1.0/describe");
    assert_eq!(request.query.as_deref(), Some("maxCandidates=2"));
    assert_eq!(
        request.content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(request.body, vec![0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn test_empty_image_is_rejected_without_request() {
    let (state, client) = client().await;
    let image = ImageSource::from_bytes(Vec::new());

    let error = client.describe(&image, 1).await.unwrap_err();

    assert_eq!(error.kind, ErrorKind::InvalidInput);
    assert!(state.requests().is_empty());
}

#[tokio::test]
async fn test_analyze_image_in_domain() {
    let (state, client) = client().await;

    let result = client
        .analyze_image_in_domain(&dog(), Model::Celebrities.as_ref())
        .await
        .unwrap();

    assert_eq!(result.request_id.as_deref(), Some("req-domain"));
    assert_eq!(result.result["celebrities"][0]["name"], "Someone");
    assert_eq!(state.last().path, "/vision/v1.0/models/celebrities/analyze");
}

#[tokio::test]
async fn test_unknown_model_maps_service_error() {
    let (_, client) = client().await;

    let error = client
        .analyze_image_in_domain(&dog(), "unicorns")
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(error.message.as_deref(), Some("Resource not found"));
    assert_eq!(error.context.as_deref(), Some("NotFound (request req-404)"));
}

#[tokio::test]
async fn test_list_models() {
    let (state, client) = client().await;

    let models = client.list_models().await.unwrap();

    assert_eq!(models.models.len(), 2);
    assert_eq!(
        models.find("landmarks").unwrap().categories,
        vec!["building_", "outdoor_"]
    );
    assert_eq!(state.last().method, Method::GET);
}

#[tokio::test]
async fn test_recognize_printed_text() {
    let (state, client) = client().await;

    let ocr = client
        .recognize_printed_text(&dog(), "", true)
        .await
        .unwrap();

    assert_eq!(ocr.language, "en");
    assert_eq!(ocr.text(), "Hello world");
    assert_eq!(
        state.last().query.as_deref(),
        Some("language=unk&detectOrientation=true")
    );
}

#[tokio::test]
async fn test_malformed_json_is_serialization_error() {
    let (_, client) = client().await;

    let error = client
        .recognize_printed_text(&dog(), "xx", false)
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Serialization);
}

#[tokio::test]
async fn test_create_text_operation_reads_location() {
    let (state, client) = client().await;

    let operation = client
        .create_text_operation(&dog(), TextRecognitionMode::Handwritten)
        .await
        .unwrap();

    assert!(operation.location().ends_with("/vision/v1.0/textOperations/op-1"));
    assert_eq!(state.last().query.as_deref(), Some("mode=Handwritten"));
}

#[tokio::test]
async fn test_missing_operation_location_is_external_error() {
    let (_, client) = client().await;
    let image = ImageSource::from_bytes(&b"no-location"[..]);

    let error = client
        .create_text_operation(&image, TextRecognitionMode::Printed)
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::ExternalError);
}

#[tokio::test]
async fn test_generate_thumbnail_returns_bytes() {
    let (state, client) = client().await;
    let request = ThumbnailRequest::new(50, 60).with_smart_cropping(false);

    let thumbnail = client.generate_thumbnail(&dog(), &request).await.unwrap();

    assert_eq!(thumbnail.as_ref(), &[0x89, b'P', b'N', b'G']);
    assert_eq!(
        state.last().query.as_deref(),
        Some("width=50&height=60&smartCropping=false")
    );
}

#[tokio::test]
async fn test_invalid_thumbnail_is_rejected_without_request() {
    let (state, client) = client().await;

    let error = client
        .generate_thumbnail(&dog(), &ThumbnailRequest::new(0, 60))
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::InvalidInput);
    assert!(state.requests().is_empty());
}

#[tokio::test]
async fn test_wrong_key_is_authentication_error() {
    let (_, client) = client_with_key("wrong-key").await;

    let error = client.list_models().await.unwrap_err();

    assert_eq!(error.kind, ErrorKind::Authentication);
    assert_eq!(
        error.message.as_deref(),
        Some("Access denied due to invalid subscription key.")
    );
}

#[tokio::test]
async fn test_health_check() {
    let (_, client) = client().await;
    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, ServiceStatus::Healthy);
    assert_eq!(health.model_count, Some(2));
    assert_eq!(health.api_root, client.api_root());

    let (_, client) = client_with_key("wrong-key").await;
    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, ServiceStatus::Degraded);
    assert_eq!(health.error_kind, Some(ErrorKind::Authentication));
}

#[tokio::test]
async fn test_health_check_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ReqwestConfig::new(KEY).with_api_root(format!("http://{addr}/vision/v1.0"));
    let client = ReqwestClient::new(config).unwrap();

    let error = client.list_models().await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::NetworkError);

    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, ServiceStatus::Unhealthy);
    assert_eq!(health.error_kind, Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_recognize_text_polls_until_succeeded() {
    let (state, client) = client().await;
    let service = client.into_service();

    let result = service
        .recognize_text(
            &dog(),
            TextRecognitionMode::Handwritten,
            &fast_policy(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, OperationStatus::Succeeded);
    assert_eq!(
        result.recognition_result.unwrap().text(),
        "Hello world\nagain"
    );
    assert_eq!(state.operation_queries.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_recognize_text_failed_is_data() {
    let (_, client) = client().await;
    let service = client.into_service();
    let image = ImageSource::from_bytes(&b"fails"[..]);

    let result = service
        .recognize_text(
            &image,
            TextRecognitionMode::Printed,
            &fast_policy(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, OperationStatus::Failed);
    assert!(result.recognition_result.is_none());
}

#[tokio::test]
async fn test_poll_times_out_after_max_attempts_plus_one_queries() {
    let (state, client) = client().await;
    let operation = cogvis_core::contract::TextOperation::new(format!(
        "{}/textOperations/op-stuck",
        client.api_root()
    ))
    .unwrap();

    let error = client
        .into_service()
        .poll_text_operation(&operation, &fast_policy(3), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        PollError::Timeout {
            attempts: 4,
            max_attempts: 3
        }
    ));
    assert_eq!(state.operation_queries.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_unknown_status_is_transport_error() {
    let (_, client) = client().await;
    let operation = cogvis_core::contract::TextOperation::new("/textOperations/op-unknown").unwrap();

    let error = client
        .into_service()
        .poll_text_operation(&operation, &fast_policy(3), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(error.transport().unwrap().kind, ErrorKind::Serialization);
    assert_eq!(error.attempts(), None);
}

#[tokio::test]
async fn test_status_query_outage_ends_session() {
    let (state, client) = client().await;
    let operation = cogvis_core::contract::TextOperation::new(format!(
        "{}/textOperations/op-outage",
        client.api_root()
    ))
    .unwrap();

    let error = client
        .into_service()
        .poll_text_operation(&operation, &fast_policy(5), &CancellationToken::new())
        .await
        .unwrap_err();

    let transport = error.transport().unwrap();
    assert_eq!(transport.kind, ErrorKind::ServiceUnavailable);
    assert_eq!(transport.message.as_deref(), Some("Try again later"));
    assert!(!error.is_timeout());
    assert_eq!(state.operation_queries.load(Ordering::SeqCst), 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.operation_queries.load(Ordering::SeqCst), 2);
}
