use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, config, health, sessions};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// This function sets up:
/// - CORS middleware
/// - Health check endpoint
/// - Question answering, sessions, reload and config endpoints
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/health", get(health::health))
        .route("/api/ask", post(ask::ask))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/:session_id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/:session_id/messages",
            post(sessions::post_message).delete(sessions::clear_messages),
        )
        .route("/api/reload", post(config::reload))
        .route("/api/config", get(config::get_config))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = resolve_allowed_origins(&state.settings.server.cors_allowed_origins)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins();
    }

    origins
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8501".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assistant::DocsAssistant;
    use crate::core::config::{AppConfig, AppPaths, ConfigService};
    use crate::corpus::Chunk;
    use crate::llm::GenerationService;
    use crate::rag::{EmbeddingIndex, FALLBACK_PREFIX, NO_INFORMATION_MESSAGE};
    use crate::test_util::KeywordEmbedder;

    struct Harness {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    async fn harness(chunks: Vec<Chunk>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let paths = Arc::new(AppPaths::with_dirs(
            dir.path().to_path_buf(),
            dir.path().join("data"),
        ));
        let mut settings = AppConfig::default();
        settings.corpus_path = "docs.json".to_string();

        let index = EmbeddingIndex::build(chunks, Arc::new(KeywordEmbedder::new(128)))
            .await
            .unwrap();
        let generation = Arc::new(GenerationService::unavailable("no credentials"));
        let assistant = DocsAssistant::from_parts(index, generation, &settings);

        let state = AppState::with_assistant(
            paths.clone(),
            ConfigService::new(paths),
            settings,
            assistant,
        );
        Harness {
            _dir: dir,
            state: Arc::new(state),
        }
    }

    fn ticket_chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("Tickets", "Use POST /api/v2/tickets to create a ticket."),
            Chunk::new("Agents", "List agents with GET /api/v2/agents."),
        ]
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_chunks_and_generation_state() {
        let h = harness(ticket_chunks()).await;
        let (status, body) = send(&h.state, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["chunks"], 2);
        assert_eq!(body["generation"], "unavailable");
    }

    #[tokio::test]
    async fn ask_returns_fallback_answer_with_sources() {
        let h = harness(ticket_chunks()).await;
        let (status, body) = send(
            &h.state,
            post_json("/api/ask", json!({"query": "How do I create a ticket?"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().unwrap().starts_with(FALLBACK_PREFIX));
        assert_eq!(body["sources"].as_array().unwrap().len(), 2);
        assert_eq!(body["sources"][0]["section"], "Tickets");
    }

    #[tokio::test]
    async fn ask_rejects_blank_query() {
        let h = harness(ticket_chunks()).await;
        let (status, body) = send(&h.state, post_json("/api/ask", json!({"query": "   "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn ask_on_empty_corpus_reports_no_information() {
        let h = harness(Vec::new()).await;
        let (status, body) = send(&h.state, post_json("/api/ask", json!({"query": "anything"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], NO_INFORMATION_MESSAGE);
        assert_eq!(body["confidence"], Value::Null);
    }

    #[tokio::test]
    async fn session_records_query_and_answer_turns() {
        let h = harness(ticket_chunks()).await;
        let (_, created) = send(&h.state, post_json("/api/sessions", json!({}))).await;
        let session_id = created["session_id"].as_str().unwrap().to_string();

        let (status, answer) = send(
            &h.state,
            post_json(
                &format!("/api/sessions/{session_id}/messages"),
                json!({"query": "list agents"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(answer["query"], "list agents");

        let (status, session) = send(&h.state, get(&format!("/api/sessions/{session_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let messages = session["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "list agents");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"]["query"], "list agents");
    }

    #[tokio::test]
    async fn cleared_session_keeps_existing_but_empty() {
        let h = harness(ticket_chunks()).await;
        let session_id = h.state.sessions.create().await;
        h.state.sessions.record_query(&session_id, "hello").await;

        let (status, _) = send(&h.state, delete(&format!("/api/sessions/{session_id}/messages"))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, session) = send(&h.state, get(&format!("/api/sessions/{session_id}"))).await;
        assert_eq!(session["messages"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let h = harness(ticket_chunks()).await;

        let (status, _) = send(&h.state, get("/api/sessions/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &h.state,
            post_json("/api/sessions/missing/messages", json!({"query": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&h.state, delete("/api/sessions/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleted_session_disappears_from_listing() {
        let h = harness(ticket_chunks()).await;
        let session_id = h.state.sessions.create().await;

        let (status, _) = send(&h.state, delete(&format!("/api/sessions/{session_id}"))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listing) = send(&h.state, get("/api/sessions")).await;
        assert!(listing["sessions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reload_picks_up_rewritten_corpus() {
        let h = harness(ticket_chunks()).await;
        let corpus_path = h.state.paths.project_root.join("docs.json");
        std::fs::write(
            &corpus_path,
            r#"[{"section": "Assets", "content": ["Assets are tracked in the CMDB.", "Import assets via CSV."]},
                {"section": "Changes", "content": ["Changes need approval."]}]"#,
        )
        .unwrap();

        let (status, body) = send(&h.state, post_json("/api/reload", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"], 3);

        let (_, health) = send(&h.state, get("/health")).await;
        assert_eq!(health["chunks"], 3);
    }

    #[tokio::test]
    async fn failed_reload_keeps_current_index() {
        let h = harness(ticket_chunks()).await;

        let (status, _) = send(&h.state, post_json("/api/reload", json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (_, health) = send(&h.state, get("/health")).await;
        assert_eq!(health["chunks"], 2);
    }

    #[tokio::test]
    async fn config_endpoint_redacts_secrets() {
        let h = harness(ticket_chunks()).await;
        std::fs::write(
            h.state.paths.project_root.join("config.yml"),
            "generation:\n  api_key: super-secret\n  api_key_env: GEMINI_API_KEY\n",
        )
        .unwrap();

        let (status, body) = send(&h.state, get("/api/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"]["api_key"], "****");
        assert_eq!(body["generation"]["api_key_env"], "GEMINI_API_KEY");
    }

    #[test]
    fn blank_configured_origins_fall_back_to_local_defaults() {
        let origins = resolve_allowed_origins(&["  ".to_string()]);
        assert_eq!(origins, default_local_origins());

        let origins = resolve_allowed_origins(&["https://docs.example.com".to_string()]);
        assert_eq!(origins, vec!["https://docs.example.com".to_string()]);
    }
}
