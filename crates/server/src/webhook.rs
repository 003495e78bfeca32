//! WhatsApp Cloud API webhook: subscription handshake and message delivery.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use innerspace_core::config::WhatsAppConfig;
use innerspace_whatsapp::signature::{self, SIGNATURE_HEADER};
use innerspace_whatsapp::{DialogueController, WebhookPayload};

pub const WEBHOOK_PATH: &str = "/api/whatsapp/webhook";
const SUBSCRIBE_MODE: &str = "subscribe";
const ACK_BODY: &str = "EVENT_RECEIVED";

#[derive(Clone)]
pub struct WebhookState {
    controller: Arc<DialogueController>,
    verify_token: SecretString,
    app_secret: Option<SecretString>,
}

impl WebhookState {
    pub fn new(controller: Arc<DialogueController>, whatsapp: &WhatsAppConfig) -> Self {
        Self {
            controller,
            verify_token: whatsapp.verify_token.clone(),
            app_secret: whatsapp.app_secret.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route(WEBHOOK_PATH, get(verify).post(receive)).with_state(state)
}

/// Echoes `hub.challenge` when the subscription request carries our verify token.
pub async fn verify(
    State(state): State<WebhookState>,
    Query(query): Query<VerifyQuery>,
) -> (StatusCode, String) {
    let subscribing = query.mode.as_deref() == Some(SUBSCRIBE_MODE);
    let token_matches = query
        .verify_token
        .as_deref()
        .is_some_and(|token| token == state.verify_token.expose_secret());

    if subscribing && token_matches {
        info!(
            event_name = "whatsapp.webhook.verified",
            correlation_id = "webhook-verify",
            "webhook subscription verified"
        );
        return (StatusCode::OK, query.challenge.unwrap_or_default());
    }

    warn!(
        event_name = "whatsapp.webhook.verify_rejected",
        correlation_id = "webhook-verify",
        mode = query.mode.as_deref().unwrap_or(""),
        "webhook verification rejected"
    );
    (StatusCode::FORBIDDEN, "Forbidden".to_string())
}

/// Runs every message in the delivery through the dialogue, then acknowledges.
///
/// Once the payload is accepted the answer is always 200, whatever the
/// dialogue did, so the provider does not redeliver.
pub async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Some(app_secret) = &state.app_secret {
        let header_value =
            headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok()).unwrap_or("");
        if !signature::verify(app_secret.expose_secret(), &body, header_value) {
            warn!(
                event_name = "whatsapp.webhook.signature_rejected",
                correlation_id = "webhook",
                "webhook signature mismatch"
            );
            return (StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(
                event_name = "whatsapp.webhook.malformed_payload",
                correlation_id = "webhook",
                error = %error,
                "webhook payload could not be decoded"
            );
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    if !payload.is_whatsapp() {
        debug!(
            event_name = "whatsapp.webhook.foreign_object",
            correlation_id = "webhook",
            object = payload.object.as_str(),
            "ignoring non-whatsapp webhook object"
        );
        return (StatusCode::NOT_FOUND, "Not Found");
    }

    let messages = payload.messages();
    if messages.is_empty() {
        debug!(
            event_name = "whatsapp.webhook.status_only",
            correlation_id = "webhook",
            statuses = payload.status_count(),
            "delivery carried no customer messages"
        );
    }

    for message in &messages {
        let outcome = state.controller.handle(message).await;
        info!(
            event_name = "whatsapp.webhook.message_handled",
            correlation_id = message.message_id.as_str(),
            phone = message.from.as_str(),
            kind = message.kind_label(),
            outcome = ?outcome,
            "inbound message handled"
        );
    }

    (StatusCode::OK, ACK_BODY)
}
