//! Per-sender booking dialogue.
//!
//! Each inbound message runs exactly one step: load the sender's state, apply
//! the token, send the next prompt, then write the new state back. Messages
//! from the same phone number are processed one at a time; different senders
//! proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use innerspace_core::domain::asset::{Asset, AssetId, Pricing};
use innerspace_core::domain::booking::BookingDuration;
use innerspace_core::flows::tokens::{
    is_greeting, BROWSE_SPACES, CANCEL_BOOKING, CONFIRM_BOOKING, HELP, MY_BOOKINGS,
};
use innerspace_core::flows::{
    BookingDraft, ConversationState, ConversationStep, Slot, SpaceSelection,
};
use innerspace_core::pricing::{format_money, price_label, quote_for};
use innerspace_core::validation::{validate_date, validate_email, validate_time};
use innerspace_db::repositories::{
    AssetCatalog, BookingStore, RepositoryError, MAX_SEARCH_RESULTS,
};

use crate::finalizer::BookingFinalizer;
use crate::gateway::{GatewayError, MessagingGateway};
use crate::inbound::InboundMessage;
use crate::messages::{
    truncate_chars, ListRow, ListSection, OutboundMessage, ReplyButton, MAX_REPLY_BUTTONS,
    MAX_ROW_TITLE_CHARS,
};
use crate::store::{ConversationStore, StoreError};
use crate::templates::{self, MessageTemplates, TemplateError};

const MAX_CITY_ROWS: usize = 10;
const RECENT_BOOKINGS_LIMIT: u32 = 5;

const SPACE_TYPE_ROWS: [(&str, &str, &str); 5] = [
    ("meeting_room", "Meeting Room", "Private meeting spaces"),
    ("conference_room", "Conference Room", "Large conference halls"),
    ("hot_desk", "Hot Desk", "Flexible desk space"),
    ("cabin", "Private Cabin", "Enclosed office cabin"),
    ("dedicated_desk", "Dedicated Desk", "Fixed desk space"),
];

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("asset `{0}` not found")]
    AssetNotFound(String),
    #[error(transparent)]
    Catalog(#[from] RepositoryError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl DialogueError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssetNotFound(_) => "not_found",
            Self::Catalog(_) | Self::Gateway(_) | Self::Store(_) => "downstream",
            Self::Template(_) => "unexpected",
        }
    }
}

/// What one inbound message did to the sender's conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogueOutcome {
    Advanced { from: ConversationStep, to: ConversationStep },
    /// Input rejected or nothing to offer; the user was re-prompted.
    Stayed(ConversationStep),
    /// Unrecognized token at a step that does not re-prompt.
    Ignored(ConversationStep),
    /// Booking confirmed or cancelled; state removed.
    Finished(ConversationStep),
    /// Selected space vanished; state removed.
    Aborted(ConversationStep),
    /// Step failed; generic retry sent and state removed.
    Failed(ConversationStep),
}

enum Transition {
    MoveTo(ConversationState),
    Stay,
    Ignore,
    Finish,
}

pub struct DialogueController {
    catalog: Arc<dyn AssetCatalog>,
    bookings: Arc<dyn BookingStore>,
    store: Arc<dyn ConversationStore>,
    gateway: Arc<dyn MessagingGateway>,
    finalizer: BookingFinalizer,
    templates: MessageTemplates,
    sender_locks: SenderLocks,
}

impl DialogueController {
    pub fn new(
        catalog: Arc<dyn AssetCatalog>,
        bookings: Arc<dyn BookingStore>,
        store: Arc<dyn ConversationStore>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            finalizer: BookingFinalizer::new(catalog.clone(), bookings.clone()),
            templates: MessageTemplates::new()?,
            catalog,
            bookings,
            store,
            gateway,
            sender_locks: StdMutex::default(),
        })
    }

    pub async fn handle(&self, message: &InboundMessage) -> DialogueOutcome {
        self.handle_token(&message.from, &message.token(), &message.message_id).await
    }

    /// Never fails: every error ends in a reply to the sender.
    pub async fn handle_token(
        &self,
        phone: &str,
        token: &str,
        correlation_id: &str,
    ) -> DialogueOutcome {
        let lease = SenderLease::acquire(&self.sender_locks, phone);
        let _turn = lease.lock.lock().await;
        self.process(phone, token, correlation_id).await
    }

    async fn process(&self, phone: &str, token: &str, correlation_id: &str) -> DialogueOutcome {
        let state = match self.store.get(phone).await {
            Ok(state) => state.unwrap_or_default(),
            Err(error) => {
                return self.fail(phone, ConversationStep::Start, error.into(), correlation_id).await
            }
        };
        let from = state.step();
        debug!(
            event_name = "whatsapp.dialogue.message_received",
            correlation_id,
            phone,
            step = from.as_str(),
            token,
            "applying dialogue step"
        );

        let transition = match self.apply(phone, token, state).await {
            Ok(transition) => transition,
            Err(DialogueError::AssetNotFound(asset_id)) => {
                return self.abort(phone, from, &asset_id, correlation_id).await
            }
            Err(error) => return self.fail(phone, from, error, correlation_id).await,
        };

        match self.commit(phone, from, transition).await {
            Ok(outcome) => {
                info!(
                    event_name = "whatsapp.dialogue.step_applied",
                    correlation_id,
                    phone,
                    from = from.as_str(),
                    outcome = ?outcome,
                    "dialogue step applied"
                );
                outcome
            }
            Err(error) => self.fail(phone, from, error.into(), correlation_id).await,
        }
    }

    async fn commit(
        &self,
        phone: &str,
        from: ConversationStep,
        transition: Transition,
    ) -> Result<DialogueOutcome, StoreError> {
        match transition {
            Transition::MoveTo(next) => {
                let to = next.step();
                self.store.set(phone, next).await?;
                Ok(DialogueOutcome::Advanced { from, to })
            }
            Transition::Stay => Ok(DialogueOutcome::Stayed(from)),
            Transition::Ignore => Ok(DialogueOutcome::Ignored(from)),
            Transition::Finish => {
                self.store.delete(phone).await?;
                Ok(DialogueOutcome::Finished(from))
            }
        }
    }

    async fn apply(
        &self,
        phone: &str,
        token: &str,
        state: ConversationState,
    ) -> Result<Transition, DialogueError> {
        match state {
            ConversationState::Start => self.on_start(phone, token).await,
            ConversationState::Menu => self.on_menu(phone, token).await,
            ConversationState::SelectType => self.on_select_type(phone, token).await,
            ConversationState::SelectCity { space_type } => {
                self.on_select_city(phone, token, space_type).await
            }
            ConversationState::SelectSpace { space_type, city } => {
                self.on_select_space(phone, token, space_type, city).await
            }
            ConversationState::SelectDuration { space } => {
                self.send_text(phone, templates::DATE_PROMPT).await?;
                Ok(Transition::MoveTo(ConversationState::EnterDate {
                    space,
                    duration: token.to_string(),
                }))
            }
            ConversationState::EnterDate { space, duration } => {
                if !validate_date(token) {
                    self.send_text(phone, templates::INVALID_DATE).await?;
                    return Ok(Transition::Stay);
                }
                self.send_text(phone, templates::TIME_PROMPT).await?;
                Ok(Transition::MoveTo(ConversationState::EnterTime {
                    space,
                    duration,
                    date: token.to_string(),
                }))
            }
            ConversationState::EnterTime { space, duration, date } => {
                if !validate_time(token) {
                    self.send_text(phone, templates::INVALID_TIME).await?;
                    return Ok(Transition::Stay);
                }
                self.send_text(phone, templates::NAME_PROMPT).await?;
                Ok(Transition::MoveTo(ConversationState::EnterName {
                    space,
                    slot: Slot { duration, date, time: token.to_string() },
                }))
            }
            ConversationState::EnterName { space, slot } => {
                self.send_text(phone, templates::EMAIL_PROMPT).await?;
                Ok(Transition::MoveTo(ConversationState::EnterEmail {
                    space,
                    slot,
                    name: token.to_string(),
                }))
            }
            ConversationState::EnterEmail { space, slot, name } => {
                self.on_enter_email(phone, token, space, slot, name).await
            }
            ConversationState::Confirm { draft } => self.on_confirm(phone, token, draft).await,
        }
    }

    async fn on_start(&self, phone: &str, token: &str) -> Result<Transition, DialogueError> {
        if !is_greeting(token) {
            self.send_text(phone, templates::START_HINT).await?;
            return Ok(Transition::Stay);
        }

        let menu = vec![
            ReplyButton::new(BROWSE_SPACES, "Browse Spaces"),
            ReplyButton::new(MY_BOOKINGS, "My Bookings"),
            ReplyButton::new(HELP, "Help"),
        ];
        self.send(OutboundMessage::buttons(phone, templates::WELCOME, menu)).await?;
        Ok(Transition::MoveTo(ConversationState::Menu))
    }

    async fn on_menu(&self, phone: &str, token: &str) -> Result<Transition, DialogueError> {
        match token {
            BROWSE_SPACES => {
                let rows = SPACE_TYPE_ROWS
                    .iter()
                    .map(|(id, title, description)| {
                        ListRow::new(*id, *title).description(*description)
                    })
                    .collect();
                self.send(OutboundMessage::list(
                    phone,
                    templates::SPACE_TYPE_PROMPT,
                    "Select Type",
                    vec![ListSection::new("Workspace Types", rows)],
                ))
                .await?;
                Ok(Transition::MoveTo(ConversationState::SelectType))
            }
            MY_BOOKINGS => {
                self.show_my_bookings(phone).await?;
                Ok(Transition::MoveTo(ConversationState::Start))
            }
            HELP => {
                self.send_text(phone, templates::HELP_TEXT).await?;
                Ok(Transition::MoveTo(ConversationState::Start))
            }
            _ => Ok(Transition::Ignore),
        }
    }

    async fn on_select_type(&self, phone: &str, token: &str) -> Result<Transition, DialogueError> {
        let cities = self.catalog.cities_for_type(token).await?;
        if cities.is_empty() {
            self.send_text(phone, templates::NO_CITIES).await?;
            return Ok(Transition::Stay);
        }

        let rows = cities
            .iter()
            .take(MAX_CITY_ROWS)
            .map(|city| {
                ListRow::new(city_row_id(city), city).description(format!("Available in {city}"))
            })
            .collect();
        self.send(OutboundMessage::list(
            phone,
            templates::CITY_PROMPT,
            "Select City",
            vec![ListSection::new("Available Cities", rows)],
        ))
        .await?;

        Ok(Transition::MoveTo(ConversationState::SelectCity { space_type: token.to_string() }))
    }

    async fn on_select_city(
        &self,
        phone: &str,
        token: &str,
        space_type: String,
    ) -> Result<Transition, DialogueError> {
        let city = token.replace('_', " ");
        let listings = self.catalog.search(&space_type, &city, MAX_SEARCH_RESULTS).await?;
        if listings.is_empty() {
            self.send_text(phone, templates::NO_SPACES).await?;
            return Ok(Transition::Stay);
        }

        let rows = listings
            .iter()
            .map(|listing| {
                let asset = &listing.asset;
                let title = truncate_chars(&asset.title, MAX_ROW_TITLE_CHARS);
                let price = price_label(&asset.pricing);
                ListRow::new(asset.id.0.clone(), title)
                    .description(format!("{price} | {}", asset.location.city))
            })
            .collect();
        self.send(OutboundMessage::list(
            phone,
            templates::spaces_found(listings.len()),
            "Select Space",
            vec![ListSection::new("Available Spaces", rows)],
        ))
        .await?;

        Ok(Transition::MoveTo(ConversationState::SelectSpace {
            space_type,
            city: token.to_string(),
        }))
    }

    async fn on_select_space(
        &self,
        phone: &str,
        token: &str,
        space_type: String,
        city: String,
    ) -> Result<Transition, DialogueError> {
        let asset = self.bookable_asset(token).await?;
        let buttons = duration_buttons(&asset.pricing);
        if buttons.is_empty() {
            self.send_text(phone, templates::NO_PRICING).await?;
            return Ok(Transition::Stay);
        }

        self.send(OutboundMessage::buttons(phone, templates::space_details(&asset), buttons))
            .await?;
        Ok(Transition::MoveTo(ConversationState::SelectDuration {
            space: SpaceSelection { space_type, city, asset_id: token.to_string() },
        }))
    }

    async fn on_enter_email(
        &self,
        phone: &str,
        token: &str,
        space: SpaceSelection,
        slot: Slot,
        name: String,
    ) -> Result<Transition, DialogueError> {
        if !validate_email(token) {
            self.send_text(phone, templates::INVALID_EMAIL).await?;
            return Ok(Transition::Stay);
        }

        let asset = self.bookable_asset(&space.asset_id).await?;
        let price = quote_for(&asset.pricing, &slot.duration);
        let draft = BookingDraft {
            space,
            slot,
            name,
            email: token.to_string(),
            phone: phone.to_string(),
            price,
        };

        let summary = self.templates.booking_summary(&draft, &asset)?;
        let buttons = vec![
            ReplyButton::new(CONFIRM_BOOKING, "✅ Confirm"),
            ReplyButton::new(CANCEL_BOOKING, "❌ Cancel"),
        ];
        self.send(OutboundMessage::buttons(phone, summary, buttons)).await?;

        Ok(Transition::MoveTo(ConversationState::Confirm { draft }))
    }

    async fn on_confirm(
        &self,
        phone: &str,
        token: &str,
        draft: BookingDraft,
    ) -> Result<Transition, DialogueError> {
        match token {
            CONFIRM_BOOKING => {
                match self.finalizer.finalize(&draft).await {
                    Ok(finalized) => {
                        let text = self
                            .templates
                            .booking_confirmation(&finalized.booking, &finalized.asset)?;
                        if let Err(error) = self.send_text(phone, &text).await {
                            warn!(
                                event_name = "whatsapp.booking.confirmation_failed",
                                phone,
                                booking_id = %finalized.booking.id,
                                error = %error,
                                "booking stored but confirmation message was not delivered"
                            );
                        }
                    }
                    Err(error) => {
                        warn!(
                            event_name = "whatsapp.booking.finalize_failed",
                            phone,
                            asset_id = %draft.space.asset_id,
                            error = %error,
                            "booking finalization failed"
                        );
                        self.send_text(phone, &templates::finalize_failed(&error.user_message()))
                            .await?;
                    }
                }
                Ok(Transition::Finish)
            }
            CANCEL_BOOKING => {
                self.send_text(phone, templates::BOOKING_CANCELLED).await?;
                Ok(Transition::Finish)
            }
            _ => Ok(Transition::Ignore),
        }
    }

    async fn show_my_bookings(&self, phone: &str) -> Result<(), DialogueError> {
        let listings = self.bookings.list_for_phone(phone, Some(RECENT_BOOKINGS_LIMIT)).await?;
        if listings.is_empty() {
            return self.send_text(phone, templates::NO_BOOKINGS).await;
        }

        let text = self.templates.my_bookings(&listings)?;
        self.send_text(phone, &text).await
    }

    /// Only approved, active assets can be booked; anything else reads as gone.
    async fn bookable_asset(&self, asset_id: &str) -> Result<Asset, DialogueError> {
        self.catalog
            .find_by_id(&AssetId(asset_id.to_string()))
            .await?
            .filter(Asset::is_bookable)
            .ok_or_else(|| DialogueError::AssetNotFound(asset_id.to_string()))
    }

    async fn abort(
        &self,
        phone: &str,
        from: ConversationStep,
        asset_id: &str,
        correlation_id: &str,
    ) -> DialogueOutcome {
        info!(
            event_name = "whatsapp.dialogue.aborted",
            correlation_id,
            phone,
            step = from.as_str(),
            asset_id,
            "selected space no longer available"
        );
        if let Err(error) = self.send_text(phone, templates::SPACE_NOT_FOUND).await {
            warn!(correlation_id, phone, error = %error, "failed to send not-found notice");
        }
        if let Err(error) = self.store.delete(phone).await {
            warn!(correlation_id, phone, error = %error, "failed to clear conversation state");
        }
        DialogueOutcome::Aborted(from)
    }

    async fn fail(
        &self,
        phone: &str,
        from: ConversationStep,
        error: DialogueError,
        correlation_id: &str,
    ) -> DialogueOutcome {
        warn!(
            event_name = "whatsapp.dialogue.step_failed",
            correlation_id,
            phone,
            step = from.as_str(),
            error_kind = error.kind(),
            error = %error,
            "dialogue step failed; resetting conversation"
        );
        if let Err(send_error) = self.send_text(phone, templates::GENERIC_RETRY).await {
            warn!(correlation_id, phone, error = %send_error, "failed to send retry prompt");
        }
        if let Err(store_error) = self.store.delete(phone).await {
            warn!(
                correlation_id,
                phone,
                error = %store_error,
                "failed to clear conversation state"
            );
        }
        DialogueOutcome::Failed(from)
    }

    async fn send_text(&self, phone: &str, body: &str) -> Result<(), DialogueError> {
        self.send(OutboundMessage::text(phone, body)).await
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), DialogueError> {
        self.gateway.send(&message).await.map_err(DialogueError::from)
    }
}

type SenderLocks = StdMutex<HashMap<String, Arc<Mutex<()>>>>;

/// A handle on one sender's turn lock. Dropping the last lease for a phone
/// removes its entry, including when the handling future is cancelled.
struct SenderLease<'a> {
    locks: &'a SenderLocks,
    phone: &'a str,
    lock: Arc<Mutex<()>>,
}

impl<'a> SenderLease<'a> {
    fn acquire(locks: &'a SenderLocks, phone: &'a str) -> Self {
        let lock = lock_map(locks).entry(phone.to_string()).or_default().clone();
        Self { locks, phone, lock }
    }
}

impl Drop for SenderLease<'_> {
    fn drop(&mut self) {
        let mut locks = lock_map(self.locks);
        // The map entry plus this lease.
        if locks.get(self.phone).is_some_and(|entry| Arc::strong_count(entry) == 2) {
            locks.remove(self.phone);
        }
    }
}

fn lock_map(locks: &SenderLocks) -> StdMutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `New Delhi` -> `new_delhi`; the city step turns underscores back into spaces.
pub fn city_row_id(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Hourly, then daily, then monthly while fewer than three buttons exist.
pub fn duration_buttons(pricing: &Pricing) -> Vec<ReplyButton> {
    let mut buttons = Vec::with_capacity(MAX_REPLY_BUTTONS);
    let offered = [
        (BookingDuration::Hourly, "Hourly"),
        (BookingDuration::Daily, "Daily"),
        (BookingDuration::Monthly, "Monthly"),
    ];
    for (duration, label) in offered {
        if buttons.len() >= MAX_REPLY_BUTTONS {
            break;
        }
        if let Some(rate) = pricing.rate(duration) {
            buttons.push(ReplyButton::new(
                duration.as_str(),
                format!("{label} {}", format_money(rate, &pricing.currency)),
            ));
        }
    }
    buttons
}
