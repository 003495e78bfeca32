use thiserror::Error;

use crate::domain::booking::BookingStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid booking transition from {from:?} to {to:?}")]
    InvalidBookingTransition { from: BookingStatus, to: BookingStatus },
    #[error("unknown booking duration `{0}` (expected hourly|daily|weekly|monthly)")]
    UnknownDuration(String),
}

impl DomainError {
    /// Safe to echo back to a customer in chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidBookingTransition { .. } => {
                "This booking can no longer be changed.".to_owned()
            }
            Self::UnknownDuration(key) => format!("`{key}` is not a bookable duration."),
        }
    }
}
