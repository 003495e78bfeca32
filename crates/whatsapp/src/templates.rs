//! Customer-facing chat copy.
//!
//! Short prompts are plain constants. Multi-line summaries are tera templates
//! rendered from already formatted strings, so money always carries its symbol.

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use innerspace_core::domain::asset::Asset;
use innerspace_core::domain::booking::{Booking, BookingListing};
use innerspace_core::flows::BookingDraft;
use innerspace_core::pricing::{format_money, GST_PERCENT};

pub const WELCOME: &str = "Welcome to Innerspace! 🏢\n\nHow can I help you today?";
pub const START_HINT: &str = "Hi! Type \"book\" to browse available workspaces.";
pub const HELP_TEXT: &str = "Here's how to book:\n\n\
1️⃣ Choose space type\n\
2️⃣ Select location\n\
3️⃣ Pick your space\n\
4️⃣ Choose date & time\n\
5️⃣ Confirm booking\n\n\
Type \"book\" to start!";

pub const SPACE_TYPE_PROMPT: &str = "What type of workspace are you looking for?";
pub const CITY_PROMPT: &str = "Which city are you looking for?";
pub const NO_CITIES: &str =
    "❌ No spaces available for this type. Pick another type from the list above.";
pub const NO_SPACES: &str =
    "❌ No spaces available in this city. Pick another city from the list above.";
pub const SPACE_NOT_FOUND: &str = "❌ Space not found. Type \"book\" to start over.";
pub const NO_PRICING: &str = "❌ No pricing available. Please contact us directly.";

pub const DATE_PROMPT: &str =
    "📅 Please enter your preferred date (format: DD/MM/YYYY)\nExample: 25/12/2030";
pub const TIME_PROMPT: &str =
    "⏰ Please enter your preferred time (format: HH:MM)\nExample: 14:30";
pub const NAME_PROMPT: &str = "👤 Please enter your full name:";
pub const EMAIL_PROMPT: &str = "📧 Please enter your email address:";

pub const INVALID_DATE: &str =
    "❌ Invalid date. Please use DD/MM/YYYY for today or a later day (e.g., 25/12/2030)";
pub const INVALID_TIME: &str = "❌ Invalid time format. Please use HH:MM (e.g., 14:30)";
pub const INVALID_EMAIL: &str = "❌ Invalid email format. Please enter a valid email address.";

pub const NO_BOOKINGS: &str =
    "📋 You have no bookings yet. Type \"book\" to make your first booking!";
pub const BOOKING_CANCELLED: &str = "❌ Booking cancelled. Type \"book\" to start over.";
pub const GENERIC_RETRY: &str = "Sorry, something went wrong. Please type \"book\" to try again.";

pub fn spaces_found(count: usize) -> String {
    format!("Found {count} available spaces!")
}

pub fn finalize_failed(reason: &str) -> String {
    format!("❌ Error processing booking: {reason}\n\nPlease try again or contact support.")
}

pub fn space_details(asset: &Asset) -> String {
    format!(
        "📍 {}\n\n{}, {}\n👥 Capacity: {}\n\nSelect booking duration:",
        asset.title, asset.location.address, asset.location.city, asset.capacity
    )
}

const SUMMARY_TEMPLATE: &str = "booking_summary.txt";
const CONFIRMATION_TEMPLATE: &str = "booking_confirmation.txt";
const MY_BOOKINGS_TEMPLATE: &str = "my_bookings.txt";

const SUMMARY_SOURCE: &str = r#"📋 Booking Summary

📍 Space: {{ title }}
🏙️ Location: {{ city }}
📅 Date: {{ date }}
⏰ Time: {{ time }}
⏳ Duration: {{ duration }}

💰 Base: {{ base }}
🧾 Tax ({{ tax_percent }}%): {{ tax }}
💳 Total: {{ total }}

👤 Name: {{ name }}
📧 Email: {{ email }}

Please confirm your booking:"#;

const CONFIRMATION_SOURCE: &str = r#"✅ Booking Confirmed!

🆔 Booking ID: {{ booking_id }}
📍 Space: {{ title }}
🏙️ Location: {{ address }}, {{ city }}
📅 Date: {{ date }}
⏰ Time: {{ time }}
⏳ Duration: {{ duration }}
💰 Total: {{ total }}

📧 Booking details will be sent to {{ email }}

Thank you for choosing Innerspace! 🎉

Type "book" to make another booking or "my_bookings" to view your bookings."#;

const MY_BOOKINGS_SOURCE: &str = r#"📋 Your Recent Bookings:
{% for booking in bookings %}
{{ loop.index }}. {{ booking.title }}
   🆔 ID: {{ booking.id }}
   📅 Date: {{ booking.date }} at {{ booking.time }}
   📊 Status: {{ booking.status }}
   💰 Amount: {{ booking.total }}
{% endfor %}"#;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("message template failed: {0}")]
    Render(#[from] tera::Error),
}

#[derive(Serialize)]
struct BookingLine {
    title: String,
    id: String,
    date: String,
    time: String,
    status: &'static str,
    total: String,
}

pub struct MessageTemplates {
    tera: Tera,
}

impl MessageTemplates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (SUMMARY_TEMPLATE, SUMMARY_SOURCE),
            (CONFIRMATION_TEMPLATE, CONFIRMATION_SOURCE),
            (MY_BOOKINGS_TEMPLATE, MY_BOOKINGS_SOURCE),
        ])?;
        Ok(Self { tera })
    }

    pub fn booking_summary(
        &self,
        draft: &BookingDraft,
        asset: &Asset,
    ) -> Result<String, TemplateError> {
        let currency = &draft.price.currency;
        let mut context = Context::new();
        context.insert("title", &asset.title);
        context.insert("city", &asset.location.city);
        context.insert("date", &draft.slot.date);
        context.insert("time", &draft.slot.time);
        context.insert("duration", &draft.slot.duration);
        context.insert("base", &format_money(draft.price.amount, currency));
        context.insert("tax_percent", &GST_PERCENT);
        context.insert("tax", &format_money(draft.price.tax, currency));
        context.insert("total", &format_money(draft.price.total, currency));
        context.insert("name", &draft.name);
        context.insert("email", &draft.email);

        self.render(SUMMARY_TEMPLATE, &context)
    }

    pub fn booking_confirmation(
        &self,
        booking: &Booking,
        asset: &Asset,
    ) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("booking_id", &booking.id.0);
        context.insert("title", &asset.title);
        context.insert("address", &asset.location.address);
        context.insert("city", &asset.location.city);
        context.insert("date", &booking.details.date);
        context.insert("time", &booking.details.time);
        context.insert("duration", booking.details.duration.as_str());
        context.insert(
            "total",
            &format_money(booking.pricing.total_amount, &booking.pricing.currency),
        );
        context.insert("email", &booking.customer.email);

        self.render(CONFIRMATION_TEMPLATE, &context)
    }

    pub fn my_bookings(&self, listings: &[BookingListing]) -> Result<String, TemplateError> {
        let lines = listings
            .iter()
            .map(|listing| BookingLine {
                title: listing.asset_title.clone().unwrap_or_else(|| "Unknown space".to_string()),
                id: listing.booking.id.0.clone(),
                date: listing.booking.details.date.clone(),
                time: listing.booking.details.time.clone(),
                status: listing.booking.status.as_str(),
                total: format_money(
                    listing.booking.pricing.total_amount,
                    &listing.booking.pricing.currency,
                ),
            })
            .collect::<Vec<_>>();

        let mut context = Context::new();
        context.insert("bookings", &lines);
        self.render(MY_BOOKINGS_TEMPLATE, &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let rendered = self.tera.render(template, context)?;
        Ok(rendered.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use innerspace_core::domain::asset::{
        Asset, AssetId, AssetStatus, AssetType, Location, Pricing,
    };
    use innerspace_core::domain::booking::{
        Booking, BookingDetails, BookingDuration, BookingId, BookingListing, BookingSource,
        BookingStatus, CustomerContact, PaymentStatus, PricingSnapshot,
    };
    use innerspace_core::domain::partner::PartnerId;
    use innerspace_core::flows::{BookingDraft, Slot, SpaceSelection};
    use innerspace_core::pricing::quote_for;

    use super::{space_details, MessageTemplates};

    fn asset() -> Asset {
        let now = Utc::now();
        Asset {
            id: AssetId("asset-1".to_string()),
            partner_id: PartnerId("partner-1".to_string()),
            title: "Koramangala Meeting Room".to_string(),
            description: String::new(),
            asset_type: AssetType::MeetingRoom,
            capacity: 6,
            location: Location {
                address: "80 Feet Road".to_string(),
                city: "Bangalore".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560034".to_string(),
            },
            amenities: Vec::new(),
            pricing: Pricing { hourly: Some(Decimal::from(500)), ..Pricing::default() },
            status: AssetStatus::Approved,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(id: &str) -> Booking {
        let now = Utc::now();
        Booking {
            id: BookingId(id.to_string()),
            asset_id: AssetId("asset-1".to_string()),
            partner_id: PartnerId("partner-1".to_string()),
            customer: CustomerContact {
                name: "asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "919812345678".to_string(),
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
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            source: BookingSource::Whatsapp,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn summary_lists_price_breakdown_and_contact() {
        let templates = MessageTemplates::new().expect("templates");
        let asset = asset();
        let draft = BookingDraft {
            space: SpaceSelection {
                space_type: "meeting_room".to_string(),
                city: "bangalore".to_string(),
                asset_id: "asset-1".to_string(),
            },
            slot: Slot {
                duration: "hourly".to_string(),
                date: "25/12/2099".to_string(),
                time: "14:30".to_string(),
            },
            name: "asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "919812345678".to_string(),
            price: quote_for(&asset.pricing, "hourly"),
        };

        let summary = templates.booking_summary(&draft, &asset).expect("render");
        assert!(summary.starts_with("📋 Booking Summary"));
        assert!(summary.contains("💰 Base: ₹500"));
        assert!(summary.contains("🧾 Tax (18%): ₹90"));
        assert!(summary.contains("💳 Total: ₹590"));
        assert!(summary.contains("📧 Email: asha@example.com"));
        assert!(summary.ends_with("Please confirm your booking:"));
    }

    #[test]
    fn confirmation_repeats_booking_id_and_address() {
        let templates = MessageTemplates::new().expect("templates");
        let text = templates
            .booking_confirmation(&booking("WA1767225600000042"), &asset())
            .expect("render");

        assert!(text.contains("🆔 Booking ID: WA1767225600000042"));
        assert!(text.contains("🏙️ Location: 80 Feet Road, Bangalore"));
        assert!(text.contains("💰 Total: ₹590"));
        assert!(text.contains("Type \"book\" to make another booking"));
    }

    #[test]
    fn my_bookings_numbers_each_entry() {
        let templates = MessageTemplates::new().expect("templates");
        let listings = vec![
            BookingListing {
                booking: booking("WA2"),
                asset_title: Some("BKC Boardroom".to_string()),
                asset_city: Some("Mumbai".to_string()),
            },
            BookingListing { booking: booking("WA1"), asset_title: None, asset_city: None },
        ];

        let text = templates.my_bookings(&listings).expect("render");
        assert!(text.starts_with("📋 Your Recent Bookings:"));
        assert!(text.contains("1. BKC Boardroom\n   🆔 ID: WA2"));
        assert!(text.contains("2. Unknown space\n   🆔 ID: WA1"));
        assert!(text.contains("📅 Date: 25/12/2099 at 14:30"));
        assert!(text.contains("📊 Status: confirmed"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn space_details_end_with_duration_prompt() {
        let details = space_details(&asset());
        assert!(details.starts_with("📍 Koramangala Meeting Room"));
        assert!(details.contains("👥 Capacity: 6"));
        assert!(details.ends_with("Select booking duration:"));
    }
}
