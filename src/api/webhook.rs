use crate::dispatcher::CommandDispatcher;
use crate::line::{verify_signature, SignatureError, WebhookPayload, SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state for the LINE webhook endpoint
#[derive(Clone)]
pub struct WebhookAppState {
    pub dispatcher: CommandDispatcher,
    /// Channel secret used to verify `x-line-signature`
    pub channel_secret: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create router with the webhook endpoint mounted at `path`
pub fn create_webhook_router(state: WebhookAppState, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_callback))
        .with_state(Arc::new(state))
}

/// POST {webhook_path} - LINE webhook delivery
///
/// The status reflects transport validation only: a command whose store
/// write failed still yields 200, with the failure in the chat reply.
async fn handle_callback(
    State(state): State<Arc<WebhookAppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    verify_signature(&state.channel_secret, &body, signature)?;

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    let messages = payload.text_messages();
    info!(
        events = payload.events.len(),
        text_messages = messages.len(),
        "Webhook delivery received"
    );

    for message in &messages {
        state
            .dispatcher
            .dispatch(&message.reply_token, &message.text)
            .await;
    }

    Ok(StatusCode::OK)
}

/// Webhook error types
enum WebhookError {
    InvalidSignature(SignatureError),
    MalformedPayload(String),
}

impl From<SignatureError> for WebhookError {
    fn from(e: SignatureError) -> Self {
        WebhookError::InvalidSignature(e)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WebhookError::InvalidSignature(e) => {
                warn!(error = %e, "Rejected webhook delivery");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            WebhookError::MalformedPayload(msg) => {
                warn!(error = %msg, "Failed to parse webhook delivery");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}
