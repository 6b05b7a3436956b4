//! Webhook server for receiving WhatsApp messages from Twilio

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Form, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use gdg_core::chat::ChatOrchestrator;
use gdg_core::llm::Content;
use gdg_core::session::SessionStats;

use crate::commands::{Command, HELP_TEXT, RESET_TEXT, WELCOME_TEXT, status_text};
use crate::error::{Result, WhatsAppError};
use crate::twilio::{IncomingMessage, TwilioClient, strip_channel_prefix};

/// WhatsApp caps message bodies at 1600 characters
const MAX_MESSAGE_LENGTH: usize = 1600;

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub twilio_client: Arc<TwilioClient>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

/// Webhook server
pub struct WebhookServer {
    addr: SocketAddr,
    state: WebhookState,
}

impl WebhookServer {
    /// Create a new webhook server
    pub fn new(
        addr: SocketAddr,
        twilio_client: Arc<TwilioClient>,
        orchestrator: Arc<ChatOrchestrator>,
    ) -> Self {
        let state = WebhookState {
            twilio_client,
            orchestrator,
        };

        Self { addr, state }
    }

    /// Build the router (separated out for tests)
    pub fn router(state: WebhookState) -> Router {
        Router::new()
            .route("/webhook/whatsapp", post(handle_webhook))
            .route("/webhook/test", post(handle_test_message))
            .route("/webhook/stats", get(handle_stats))
            .route("/webhook/history/{user_id}", get(handle_history))
            .route(
                "/webhook/conversation/{user_id}",
                delete(handle_clear_conversation),
            )
            .route("/webhook/status", get(handle_status))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(state))
    }

    /// Start the webhook server
    pub async fn start(self) -> Result<()> {
        info!("Starting WhatsApp webhook server on {}", self.addr);

        let app = Self::router(self.state);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| WhatsAppError::Config(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| WhatsAppError::Http(e.to_string()))?;

        Ok(())
    }
}

/// Truncate a reply that exceeds the WhatsApp message limit
fn clamp_reply(reply: String) -> String {
    if reply.chars().count() <= MAX_MESSAGE_LENGTH {
        return reply;
    }
    let marker = "...(truncated)";
    let cut: String = reply
        .chars()
        .take(MAX_MESSAGE_LENGTH - marker.chars().count())
        .collect();
    format!("{}{}", cut, marker)
}

/// Handle incoming WhatsApp webhook
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    Form(msg): Form<IncomingMessage>,
) -> impl IntoResponse {
    let from = strip_channel_prefix(&msg.from).to_string();
    let body = msg.body.trim().to_string();

    info!("Received WhatsApp message from {}: {}", from, body);

    if body.is_empty() {
        warn!("Empty message received");
        return (StatusCode::OK, "OK");
    }

    let reply = match Command::parse(&body) {
        Some(Command::Start) => WELCOME_TEXT.to_string(),
        Some(Command::Help) => HELP_TEXT.to_string(),
        Some(Command::Reset) => {
            state.orchestrator.sessions().clear(&from).await;
            RESET_TEXT.to_string()
        }
        Some(Command::Status) => {
            let stats = state.orchestrator.sessions().stats().await;
            status_text(stats.active_sessions, Utc::now())
        }
        None => state.orchestrator.reply(&from, &body).await,
    };

    let reply = clamp_reply(reply);

    // Delivery failures are logged but not retried; Twilio has already
    // accepted the inbound message.
    match state.twilio_client.send_message(&from, &reply).await {
        Ok(sid) => info!("Response sent to {} (SID: {})", from, sid),
        Err(e) => error!("Failed to send response to {}: {}", from, e),
    }

    (StatusCode::OK, "OK")
}

/// Direct message processing request (for testing without Twilio)
#[derive(Debug, Deserialize)]
pub struct TestMessageRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestMessageResponse {
    success: bool,
    response: String,
    user_id: String,
    timestamp: String,
}

/// Handle direct message processing (for testing)
async fn handle_test_message(
    State(state): State<Arc<WebhookState>>,
    Json(req): Json<TestMessageRequest>,
) -> impl IntoResponse {
    let (Some(user_id), Some(message)) = (req.user_id, req.message) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "userId and message are required"
            })),
        );
    };

    info!("Processing direct message for user {}: {}", user_id, message);

    let response = state.orchestrator.reply(&user_id, &message).await;

    (
        StatusCode::OK,
        Json(
            serde_json::to_value(TestMessageResponse {
                success: true,
                response,
                user_id,
                timestamp: Utc::now().to_rfc3339(),
            })
            .unwrap_or_default(),
        ),
    )
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    success: bool,
    stats: SessionStats,
    timestamp: String,
}

/// Get conversation statistics
async fn handle_stats(State(state): State<Arc<WebhookState>>) -> impl IntoResponse {
    let stats = state.orchestrator.sessions().stats().await;

    Json(StatsResponse {
        success: true,
        stats,
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    success: bool,
    user_id: String,
    history: Vec<Content>,
    timestamp: String,
}

/// Get chat history for a user
async fn handle_history(
    State(state): State<Arc<WebhookState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let history = state.orchestrator.sessions().history(&user_id).await;

    Json(HistoryResponse {
        success: true,
        user_id,
        history,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Clear conversation for a user
async fn handle_clear_conversation(
    State(state): State<Arc<WebhookState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    state.orchestrator.sessions().clear(&user_id).await;

    Json(json!({
        "success": true,
        "message": format!("Conversation cleared for user {}", user_id),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Simple status check
async fn handle_status() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "service": "GDG WhatsApp Bot",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "webhook": "POST /webhook/whatsapp",
            "test": "POST /webhook/test",
            "stats": "GET /webhook/stats",
            "clearConversation": "DELETE /webhook/conversation/{userId}",
            "history": "GET /webhook/history/{userId}",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use gdg_core::error::Result as CoreResult;
    use gdg_core::llm::{ChatModel, Completion, Content, FunctionDeclaration};
    use gdg_core::session::SessionStore;
    use gdg_core::tool::{
        CalendarEvent, CalendarSource, Faq, SheetsSource, Speaker, ToolRegistry,
    };

    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn complete(
            &self,
            _contents: Vec<Content>,
            _tools: &[FunctionDeclaration],
        ) -> CoreResult<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Completion::text_only("Hi from the model"))
        }
    }

    struct EmptyCalendar;

    #[async_trait]
    impl CalendarSource for EmptyCalendar {
        async fn upcoming_events(&self, _: u32, _: i64) -> CoreResult<Vec<CalendarEvent>> {
            Ok(Vec::new())
        }
        async fn past_events(&self, _: u32, _: i64) -> CoreResult<Vec<CalendarEvent>> {
            Ok(Vec::new())
        }
        async fn find_events(
            &self,
            _: Option<&str>,
            _: Option<&str>,
        ) -> CoreResult<Vec<CalendarEvent>> {
            Ok(Vec::new())
        }
    }

    struct EmptySheets;

    #[async_trait]
    impl SheetsSource for EmptySheets {
        async fn faqs(&self, _: Option<&str>, _: Option<&str>) -> CoreResult<Vec<Faq>> {
            Ok(Vec::new())
        }
        async fn speakers(&self, _: Option<&str>, _: Option<&str>) -> CoreResult<Vec<Speaker>> {
            Ok(Vec::new())
        }
    }

    fn test_state() -> (WebhookState, Arc<CountingModel>) {
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
        });
        let tools = ToolRegistry::new(Arc::new(EmptyCalendar), Arc::new(EmptySheets));
        let sessions = Arc::new(SessionStore::new());
        let orchestrator = Arc::new(ChatOrchestrator::new(model.clone(), tools, sessions));
        // Unroutable base URL so delivery attempts fail fast instead of
        // reaching the real Twilio API.
        let twilio = Arc::new(
            TwilioClient::new(
                "AC123".to_string(),
                "token".to_string(),
                "+15550000000".to_string(),
            )
            .with_base_url("http://127.0.0.1:9"),
        );
        (
            WebhookState {
                twilio_client: twilio,
                orchestrator,
            },
            model,
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook/whatsapp")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reserved_command_skips_the_model() {
        let (state, model) = test_state();
        let app = WebhookServer::router(state);

        let response = app
            .oneshot(form_request(
                "From=whatsapp%3A%2B15551234567&Body=+Help+&MessageSid=SM1&AccountSid=AC1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reset_command_clears_the_session() {
        let (state, model) = test_state();
        let orchestrator = state.orchestrator.clone();
        let app = WebhookServer::router(state);

        orchestrator.reply("+15551234567", "remember me").await;
        assert_eq!(
            orchestrator.sessions().history("+15551234567").await.len(),
            2
        );

        let response = app
            .oneshot(form_request(
                "From=whatsapp%3A%2B15551234567&Body=reset&MessageSid=SM2&AccountSid=AC1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            orchestrator
                .sessions()
                .history("+15551234567")
                .await
                .is_empty()
        );
        // Only the earlier conversational message reached the model
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_body_is_acknowledged_without_processing() {
        let (state, model) = test_state();
        let app = WebhookServer::router(state);

        let response = app
            .oneshot(form_request(
                "From=whatsapp%3A%2B15551234567&Body=++&MessageSid=SM3&AccountSid=AC1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (state, _) = test_state();
        let app = WebhookServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["service"], "GDG WhatsApp Bot");
    }

    #[tokio::test]
    async fn test_test_endpoint_requires_user_and_message() {
        let (state, _) = test_state();
        let app = WebhookServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/test")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"userId": "user1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "userId and message are required");
    }

    #[tokio::test]
    async fn test_test_endpoint_returns_model_reply() {
        let (state, model) = test_state();
        let app = WebhookServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/test")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"userId": "user1", "message": "what events are coming up?"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "Hi from the model");
        assert_eq!(json["userId"], "user1");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stats_and_clear_endpoints() {
        let (state, _) = test_state();
        let orchestrator = state.orchestrator.clone();
        let app = WebhookServer::router(state);

        orchestrator.reply("user1", "hello there, assistant").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/webhook/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["stats"]["activeSessions"], 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/webhook/conversation/user1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["success"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook/history/user1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["history"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_history_endpoint_reports_turns() {
        let (state, _) = test_state();
        let orchestrator = state.orchestrator.clone();
        let app = WebhookServer::router(state);

        orchestrator.reply("user2", "tell me about devfest").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook/history/user2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["userId"], "user2");
        let history = json["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["role"], "user");
        assert_eq!(history[1]["role"], "model");
    }

    #[test]
    fn test_clamp_reply_under_limit_unchanged() {
        let reply = "short reply".to_string();
        assert_eq!(clamp_reply(reply.clone()), reply);
    }

    #[test]
    fn test_clamp_reply_truncates_long_messages() {
        let reply = "x".repeat(2000);
        let clamped = clamp_reply(reply);
        assert_eq!(clamped.chars().count(), MAX_MESSAGE_LENGTH);
        assert!(clamped.ends_with("...(truncated)"));
    }
}
