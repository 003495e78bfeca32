use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::booking::BookingDuration;
use crate::domain::partner::PartnerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    MeetingRoom,
    ConferenceRoom,
    Cabin,
    DedicatedDesk,
    HotDesk,
    OfficeSpace,
    EventSpace,
}

impl AssetType {
    pub const ALL: [AssetType; 7] = [
        AssetType::MeetingRoom,
        AssetType::ConferenceRoom,
        AssetType::Cabin,
        AssetType::DedicatedDesk,
        AssetType::HotDesk,
        AssetType::OfficeSpace,
        AssetType::EventSpace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeetingRoom => "meeting_room",
            Self::ConferenceRoom => "conference_room",
            Self::Cabin => "cabin",
            Self::DedicatedDesk => "dedicated_desk",
            Self::HotDesk => "hot_desk",
            Self::OfficeSpace => "office_space",
            Self::EventSpace => "event_space",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw.trim())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Pending,
    Approved,
    Rejected,
    Inactive,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Rate card for an asset. A missing or zero rate means the duration is not offered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub hourly: Option<Decimal>,
    pub daily: Option<Decimal>,
    pub weekly: Option<Decimal>,
    pub monthly: Option<Decimal>,
    pub currency: String,
}

impl Default for Pricing {
    fn default() -> Self {
        Self { hourly: None, daily: None, weekly: None, monthly: None, currency: "INR".to_string() }
    }
}

impl Pricing {
    pub fn rate(&self, duration: BookingDuration) -> Option<Decimal> {
        let rate = match duration {
            BookingDuration::Hourly => self.hourly,
            BookingDuration::Daily => self.daily,
            BookingDuration::Weekly => self.weekly,
            BookingDuration::Monthly => self.monthly,
        };
        rate.filter(|value| !value.is_zero())
    }

    /// Looks a rate up by its duration key (`hourly`, `daily`, ...). Unknown keys have no rate.
    pub fn rate_for_key(&self, key: &str) -> Option<Decimal> {
        key.parse::<BookingDuration>().ok().and_then(|duration| self.rate(duration))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub partner_id: PartnerId,
    pub title: String,
    pub description: String,
    pub asset_type: AssetType,
    pub capacity: u32,
    pub location: Location,
    pub amenities: Vec<String>,
    pub pricing: Pricing,
    pub status: AssetStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Only approved, active assets may be discovered or booked.
    pub fn is_bookable(&self) -> bool {
        self.status == AssetStatus::Approved && self.is_active
    }
}
