use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::asset::AssetId;
use crate::domain::partner::PartnerId;
use crate::errors::DomainError;

const CHAT_BOOKING_PREFIX: &str = "WA";
const RANDOM_SUFFIX_SPACE: u16 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl BookingId {
    /// `WA<unix millis><3-digit zero-padded random>`.
    ///
    /// Two ids minted in the same millisecond collide with probability 1/1000; no
    /// uniqueness check runs before insert, the store's primary key rejects duplicates.
    pub fn generate() -> Self {
        let suffix = rand::thread_rng().gen_range(0..RANDOM_SUFFIX_SPACE);
        Self::from_parts(Utc::now().timestamp_millis(), suffix)
    }

    pub fn from_parts(timestamp_millis: i64, suffix: u16) -> Self {
        Self(format!("{CHAT_BOOKING_PREFIX}{timestamp_millis}{:03}", suffix % RANDOM_SUFFIX_SPACE))
    }

    pub fn is_chat_format(&self) -> bool {
        self.0
            .strip_prefix(CHAT_BOOKING_PREFIX)
            .map(|digits| digits.len() > 3 && digits.bytes().all(|byte| byte.is_ascii_digit()))
            .unwrap_or(false)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingDuration {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl BookingDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for BookingDuration {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(DomainError::UnknownDuration(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Web,
    Whatsapp,
    Mobile,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Whatsapp => "whatsapp",
            Self::Mobile => "mobile",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "web" => Some(Self::Web),
            "whatsapp" => Some(Self::Whatsapp),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }
}

/// Contact details captured at booking time, independent of later profile edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub date: String,
    pub time: String,
    pub duration: BookingDuration,
    pub units: u32,
}

/// Price agreed when the booking was made. Never recomputed from the asset afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub base_amount: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub asset_id: AssetId,
    pub partner_id: PartnerId,
    pub customer: CustomerContact,
    pub details: BookingDetails,
    pub pricing: PricingSnapshot,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub source: BookingSource,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self.status, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn transition_to(&mut self, next: BookingStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidBookingTransition { from: self.status, to: next })
    }
}

/// A booking joined with the asset fields shown in booking lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingListing {
    pub booking: Booking,
    pub asset_title: Option<String>,
    pub asset_city: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{
        Booking, BookingDetails, BookingDuration, BookingId, BookingSource, BookingStatus,
        CustomerContact, PaymentStatus, PricingSnapshot,
    };
    use crate::domain::asset::AssetId;
    use crate::domain::partner::PartnerId;
    use crate::errors::DomainError;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: BookingId::from_parts(1_767_225_600_000, 7),
            asset_id: AssetId("asset-1".to_string()),
            partner_id: PartnerId("partner-1".to_string()),
            customer: CustomerContact {
                name: "asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "919800000001".to_string(),
            },
            details: BookingDetails {
                date: "25/12/2099".to_string(),
                time: "14:30".to_string(),
                duration: BookingDuration::Hourly,
                units: 1,
            },
            pricing: PricingSnapshot {
                base_amount: Decimal::from(500),
                tax: Decimal::from(90),
                total_amount: Decimal::from(590),
                currency: "INR".to_string(),
            },
            status,
            payment_status: PaymentStatus::Pending,
            source: BookingSource::Whatsapp,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn booking_id_pads_random_suffix_to_three_digits() {
        let id = BookingId::from_parts(1_767_225_600_000, 7);
        assert_eq!(id.0, "WA1767225600000007");
        assert!(id.is_chat_format());
    }

    #[test]
    fn generated_ids_match_chat_format() {
        for _ in 0..50 {
            let id = BookingId::generate();
            assert!(id.is_chat_format(), "unexpected id format: {id}");
            let digits = id.0.trim_start_matches("WA");
            let suffix = &digits[digits.len() - 3..];
            assert!(suffix.parse::<u16>().expect("numeric suffix") < 1_000);
        }
    }

    #[test]
    fn foreign_ids_are_not_chat_format() {
        assert!(!BookingId("WEB-001".to_string()).is_chat_format());
        assert!(!BookingId("WA12ab".to_string()).is_chat_format());
    }

    #[test]
    fn duration_parse_rejects_unknown_keys() {
        assert_eq!("daily".parse::<BookingDuration>(), Ok(BookingDuration::Daily));
        assert_eq!(
            "fortnightly".parse::<BookingDuration>(),
            Err(DomainError::UnknownDuration("fortnightly".to_string()))
        );
    }

    #[test]
    fn stored_names_parse_back_and_unknown_names_do_not() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("on_hold"), None);
        assert_eq!(PaymentStatus::parse("paid"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::parse("chargeback"), None);
        assert_eq!(BookingSource::parse("whatsapp"), Some(BookingSource::Whatsapp));
        assert_eq!(BookingSource::parse("kiosk"), None);
    }

    #[test]
    fn confirmed_booking_can_complete_or_cancel() {
        let mut completed = booking(BookingStatus::Confirmed);
        completed.transition_to(BookingStatus::Completed).expect("confirmed -> completed");
        assert_eq!(completed.status, BookingStatus::Completed);

        let mut cancelled = booking(BookingStatus::Confirmed);
        cancelled.transition_to(BookingStatus::Cancelled).expect("confirmed -> cancelled");
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }

    #[test]
    fn terminal_bookings_reject_further_transitions() {
        let mut booking = booking(BookingStatus::Cancelled);
        let error =
            booking.transition_to(BookingStatus::Confirmed).expect_err("cancelled is terminal");
        assert!(matches!(error, DomainError::InvalidBookingTransition { .. }));
    }
}
