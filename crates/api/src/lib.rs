//! Posture API Server
//!
//! REST API for collecting and listing posture measurements.

use axum::{
    routing::{get, post},
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;
mod service;

pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use service::PostureService;

use storage::PostureStore;

/// Application state shared across handlers
pub struct AppState {
    /// Record access service
    pub service: PostureService,
}

impl AppState {
    /// Create new application state
    pub fn new(service: PostureService) -> Self {
        Self { service }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/posture/all", get(routes::posture::get_all))
        .route("/api/posture/save", post(routes::posture::save))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

/// Run the server until a shutdown signal arrives
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = PostureStore::connect(&config.database).await?;
    let state = Arc::new(AppState::new(PostureService::new(store.clone())));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (Router, PostureStore) {
        let store = PostureStore::in_memory().await.unwrap();
        let state = Arc::new(AppState::new(PostureService::new(store.clone())));
        (create_router(state), store)
    }

    fn save_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/posture/save")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn list_request() -> Request<Body> {
        Request::builder()
            .uri("/api/posture/all")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let (app, _store) = test_app().await;

        let response = app.oneshot(list_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let (app, _store) = test_app().await;

        let body = json!({"userId": "u1", "neckAngle": 42.0, "postureState": "forward-head"});
        let response = app
            .clone()
            .oneshot(save_request(body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let saved = body_json(response).await;
        assert_eq!(saved["id"], 1);
        assert_eq!(saved["userId"], "u1");
        assert_eq!(saved["neckAngle"], 42.0);
        assert_eq!(saved["postureState"], "forward-head");
        assert!(saved["recordedAt"].is_string());

        let response = app.oneshot(list_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([saved]));
    }

    #[tokio::test]
    async fn test_client_id_and_time_ignored() {
        let (app, _store) = test_app().await;

        let body = json!({
            "id": 999,
            "userId": "u1",
            "neckAngle": 37.5,
            "postureState": "normal",
            "recordedAt": "2000-01-01T00:00:00"
        });
        let response = app.oneshot(save_request(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let saved = body_json(response).await;
        assert_eq!(saved["id"], 1);
        assert_ne!(saved["recordedAt"], "2000-01-01T00:00:00");
        assert!(!saved["recordedAt"].as_str().unwrap().starts_with("2000-"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _store) = test_app().await;

        let response = app
            .oneshot(save_request(r#"{"userId": }"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_null_and_absent_fields_are_stored() {
        let (app, _store) = test_app().await;

        let response = app
            .clone()
            .oneshot(save_request(
                r#"{"userId": null, "neckAngle": 10.0, "postureState": "n"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved = body_json(response).await;
        assert_eq!(saved["id"], 1);
        assert_eq!(saved["userId"], Value::Null);
        assert_eq!(saved["neckAngle"], 10.0);
        assert_eq!(saved["postureState"], "n");

        let response = app
            .clone()
            .oneshot(save_request(r#"{"userId": "u1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved = body_json(response).await;
        assert_eq!(saved["id"], 2);
        assert_eq!(saved["neckAngle"], 0.0);
        assert_eq!(saved["postureState"], Value::Null);

        let response = app.oneshot(list_request()).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_bad_request() {
        let (app, _store) = test_app().await;

        let response = app
            .oneshot(save_request(r#"{"userId": "u1", "neckAngle": "steep"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let (app, store) = test_app().await;
        store.close().await;

        let response = app.clone().oneshot(list_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json!({"userId": "u1", "neckAngle": 1.0, "postureState": "normal"});
        let response = app.oneshot(save_request(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_end_to_end_over_tcp() {
        let (app, _store) = test_app().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::new();
        let before = chrono::Local::now().naive_local();
        let saved: Value = client
            .post(format!("http://{}/api/posture/save", addr))
            .json(&json!({"userId": "device-7", "neckAngle": 18.75, "postureState": "normal"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let recorded_at: chrono::NaiveDateTime =
            serde_json::from_value(saved["recordedAt"].clone()).unwrap();
        assert!(recorded_at >= before);

        let all: Vec<storage::PostureRecord> = client
            .get(format!("http://{}/api/posture/all", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user_id.as_deref(), Some("device-7"));
        assert_eq!(all[0].neck_angle, 18.75);
    }
}
