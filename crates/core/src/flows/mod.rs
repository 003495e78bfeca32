pub mod states;
pub mod tokens;

pub use states::{BookingDraft, ConversationState, ConversationStep, Slot, SpaceSelection};
