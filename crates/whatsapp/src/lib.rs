//! WhatsApp channel for chat bookings.
//!
//! Inbound Cloud API webhook payloads are parsed in [`inbound`], handed to the
//! per-sender [`dialogue::DialogueController`], and every reply leaves through a
//! [`gateway::MessagingGateway`]. Conversation progress lives in a
//! [`store::ConversationStore`] and completed drafts become bookings through the
//! [`finalizer::BookingFinalizer`].

pub mod dialogue;
pub mod finalizer;
pub mod gateway;
pub mod inbound;
pub mod messages;
pub mod signature;
pub mod store;
pub mod templates;

pub use dialogue::{DialogueController, DialogueError, DialogueOutcome};
pub use finalizer::{BookingFinalizer, FinalizeError};
pub use gateway::{CloudApiGateway, GatewayError, MessagingGateway, RecordingGateway};
pub use inbound::{InboundMessage, InboundMessageKind, WebhookPayload};
pub use messages::{ListRow, ListSection, MessageBody, OutboundMessage, ReplyButton};
pub use store::{ConversationStore, InMemoryConversationStore, StoreError};
