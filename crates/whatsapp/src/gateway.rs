use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

use innerspace_core::config::AppConfig;

use crate::messages::OutboundMessage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("messaging client setup failed: {0}")]
    Setup(String),
    #[error("messaging transport failed: {0}")]
    Transport(String),
    #[error("messaging api rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound side of the channel. One call per message, awaited in order.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), GatewayError>;
}

/// WhatsApp Cloud API client.
pub struct CloudApiGateway {
    client: Client,
    endpoint: String,
    access_token: SecretString,
}

impl CloudApiGateway {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::Setup(error.to_string()))?;

        Ok(Self { client, endpoint: endpoint.into(), access_token })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.messages_endpoint(),
            config.whatsapp.access_token.clone(),
            Duration::from_secs(config.whatsapp.timeout_secs.max(1)),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessagingGateway for CloudApiGateway {
    async fn send(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.access_token.expose_secret())
            .json(&message.to_cloud_api_payload())
            .send()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "whatsapp.gateway.send_rejected",
                phone = %message.to,
                message_kind = message.kind(),
                status = status.as_u16(),
                "cloud api rejected outbound message"
            );
            return Err(GatewayError::Rejected { status: status.as_u16(), body });
        }

        debug!(
            event_name = "whatsapp.gateway.sent",
            phone = %message.to,
            message_kind = message.kind(),
            "outbound message accepted"
        );
        Ok(())
    }
}

/// Keeps every message instead of sending it. Can be switched into a failing
/// mode to exercise error paths.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.lock().clone()
    }

    pub fn sent_to(&self, phone: &str) -> Vec<OutboundMessage> {
        self.lock().iter().filter(|message| message.to == phone).cloned().collect()
    }

    pub fn last_to(&self, phone: &str) -> Option<OutboundMessage> {
        self.lock().iter().rev().find(|message| message.to == phone).cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OutboundMessage>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("recording gateway set to fail".to_string()));
        }
        self.lock().push(message.clone());
        Ok(())
    }
}
