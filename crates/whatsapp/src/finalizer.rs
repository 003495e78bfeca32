use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use innerspace_core::domain::asset::{Asset, AssetId};
use innerspace_core::domain::booking::{
    Booking, BookingDetails, BookingDuration, BookingId, BookingSource, BookingStatus,
    CustomerContact, PaymentStatus,
};
use innerspace_core::errors::DomainError;
use innerspace_core::flows::BookingDraft;
use innerspace_db::repositories::{AssetCatalog, BookingStore, RepositoryError};

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FinalizeError {
    /// Reason shown to the customer after "Error processing booking".
    pub fn user_message(&self) -> String {
        match self {
            Self::AssetNotFound(_) => self.to_string(),
            Self::Domain(error) => error.user_message(),
            Self::Repository(RepositoryError::Conflict(_)) => {
                "A booking with the same reference already exists.".to_string()
            }
            Self::Repository(_) => "The booking could not be saved.".to_string(),
        }
    }
}

/// The persisted booking and the asset it was made against.
#[derive(Clone, Debug)]
pub struct FinalizedBooking {
    pub booking: Booking,
    pub asset: Asset,
}

/// Turns a confirmed draft into exactly one stored booking.
pub struct BookingFinalizer {
    catalog: Arc<dyn AssetCatalog>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingFinalizer {
    pub fn new(catalog: Arc<dyn AssetCatalog>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { catalog, bookings }
    }

    /// Re-reads the asset, then inserts a confirmed, unpaid chat booking priced
    /// from the draft. The price agreed at summary time is never recomputed.
    pub async fn finalize(&self, draft: &BookingDraft) -> Result<FinalizedBooking, FinalizeError> {
        let asset_id = AssetId(draft.space.asset_id.clone());
        let asset = self
            .catalog
            .find_by_id(&asset_id)
            .await?
            .ok_or_else(|| FinalizeError::AssetNotFound(asset_id.0.clone()))?;
        let duration = draft.slot.duration.parse::<BookingDuration>()?;

        let now = Utc::now();
        let booking = Booking {
            id: BookingId::generate(),
            asset_id: asset.id.clone(),
            partner_id: asset.partner_id.clone(),
            customer: CustomerContact {
                name: draft.name.clone(),
                email: draft.email.clone(),
                phone: draft.phone.clone(),
            },
            details: BookingDetails {
                date: draft.slot.date.clone(),
                time: draft.slot.time.clone(),
                duration,
                units: 1,
            },
            pricing: draft.price.snapshot(),
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            source: BookingSource::Whatsapp,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        self.bookings.create(booking.clone()).await?;

        info!(
            event_name = "whatsapp.booking.created",
            booking_id = %booking.id,
            asset_id = %booking.asset_id,
            partner_id = %booking.partner_id,
            phone = %booking.customer.phone,
            total = %booking.pricing.total_amount,
            "chat booking persisted"
        );

        Ok(FinalizedBooking { booking, asset })
    }
}
