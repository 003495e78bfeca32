pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod pricing;
pub mod validation;

pub use domain::asset::{Asset, AssetId, AssetStatus, AssetType, Location, Pricing};
pub use domain::booking::{
    Booking, BookingDetails, BookingDuration, BookingId, BookingListing, BookingSource,
    BookingStatus, CustomerContact, PaymentStatus, PricingSnapshot,
};
pub use domain::partner::{Partner, PartnerId};
pub use errors::DomainError;
pub use flows::{BookingDraft, ConversationState, ConversationStep, Slot, SpaceSelection};
pub use pricing::{price_label, quote_for, PriceBreakdown};
pub use validation::{validate_date, validate_email, validate_time};
