use async_trait::async_trait;
use thiserror::Error;

use innerspace_core::domain::asset::{Asset, AssetId};
use innerspace_core::domain::booking::{Booking, BookingId, BookingListing, BookingStatus};
use innerspace_core::domain::partner::{Partner, PartnerId};
use innerspace_core::errors::DomainError;

pub mod asset;
pub mod booking;
mod columns;
pub mod memory;

pub use asset::SqlAssetCatalog;
pub use booking::SqlBookingRepository;
pub use memory::{InMemoryAssetCatalog, InMemoryBookingStore};

/// Upper bound applied to catalog searches when callers ask for more.
pub const MAX_SEARCH_RESULTS: u32 = 10;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A discoverable asset together with the name of the partner that lists it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetListing {
    pub asset: Asset,
    pub partner_name: Option<String>,
}

/// Read side of the space marketplace used by chat discovery.
///
/// `cities_for_type` and `search` only ever return approved, active assets.
/// `find_by_id` returns the asset whatever its status so callers can tell
/// "gone" apart from "not bookable".
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    async fn cities_for_type(&self, asset_type: &str) -> Result<Vec<String>, RepositoryError>;

    /// Case-insensitive substring match on city, at most `limit` (capped at
    /// [`MAX_SEARCH_RESULTS`]) rows.
    async fn search(
        &self,
        asset_type: &str,
        city: &str,
        limit: u32,
    ) -> Result<Vec<AssetListing>, RepositoryError>;

    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, RepositoryError>;

    async fn save(&self, asset: Asset) -> Result<(), RepositoryError>;

    async fn find_partner(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError>;

    async fn save_partner(&self, partner: Partner) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Inserts a new booking. An existing id is a [`RepositoryError::Conflict`].
    async fn create(&self, booking: Booking) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// Newest first, joined with asset title and city.
    async fn list_for_phone(
        &self,
        phone: &str,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError>;

    /// Newest first, joined with asset title and city.
    async fn list_for_partner(
        &self,
        partner_id: &PartnerId,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError>;

    async fn update_status(
        &self,
        id: &BookingId,
        next: BookingStatus,
    ) -> Result<Booking, RepositoryError>;
}

pub(crate) fn search_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SEARCH_RESULTS)
}

#[cfg(test)]
mod tests {
    use super::search_limit;

    #[test]
    fn search_limit_is_clamped() {
        assert_eq!(search_limit(0), 1);
        assert_eq!(search_limit(5), 5);
        assert_eq!(search_limit(500), 10);
    }
}
