use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use innerspace_core::domain::asset::{Asset, AssetId};
use innerspace_core::domain::booking::{Booking, BookingId, BookingListing, BookingStatus};
use innerspace_core::domain::partner::{Partner, PartnerId};

use super::{search_limit, AssetCatalog, AssetListing, BookingStore, RepositoryError};

#[derive(Default)]
pub struct InMemoryAssetCatalog {
    assets: RwLock<HashMap<String, Asset>>,
    partners: RwLock<HashMap<String, Partner>>,
}

impl InMemoryAssetCatalog {
    async fn partner_name(&self, id: &PartnerId) -> Option<String> {
        let partners = self.partners.read().await;
        partners.get(&id.0).map(|partner| partner.display_name().to_string())
    }
}

#[async_trait::async_trait]
impl AssetCatalog for InMemoryAssetCatalog {
    async fn cities_for_type(&self, asset_type: &str) -> Result<Vec<String>, RepositoryError> {
        let assets = self.assets.read().await;
        let mut cities = assets
            .values()
            .filter(|asset| asset.is_bookable() && asset.asset_type.as_str() == asset_type)
            .map(|asset| asset.location.city.clone())
            .collect::<Vec<_>>();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }

    async fn search(
        &self,
        asset_type: &str,
        city: &str,
        limit: u32,
    ) -> Result<Vec<AssetListing>, RepositoryError> {
        let needle = city.to_lowercase();
        let mut matches = {
            let assets = self.assets.read().await;
            assets
                .values()
                .filter(|asset| asset.is_bookable() && asset.asset_type.as_str() == asset_type)
                .filter(|asset| asset.location.city.to_lowercase().contains(&needle))
                .cloned()
                .collect::<Vec<_>>()
        };
        matches.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.0.cmp(&b.id.0)));
        matches.truncate(search_limit(limit) as usize);

        let mut listings = Vec::with_capacity(matches.len());
        for asset in matches {
            let partner_name = self.partner_name(&asset.partner_id).await;
            listings.push(AssetListing { asset, partner_name });
        }
        Ok(listings)
    }

    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, RepositoryError> {
        let assets = self.assets.read().await;
        Ok(assets.get(&id.0).cloned())
    }

    async fn save(&self, asset: Asset) -> Result<(), RepositoryError> {
        let mut assets = self.assets.write().await;
        assets.insert(asset.id.0.clone(), asset);
        Ok(())
    }

    async fn find_partner(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        let partners = self.partners.read().await;
        Ok(partners.get(&id.0).cloned())
    }

    async fn save_partner(&self, partner: Partner) -> Result<(), RepositoryError> {
        let mut partners = self.partners.write().await;
        partners.insert(partner.id.0.clone(), partner);
        Ok(())
    }
}

/// Bookings kept in insertion order. Listings are joined against an optional
/// catalog so tests see the same asset title/city columns as the SQL store.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
    catalog: Option<Arc<InMemoryAssetCatalog>>,
}

impl InMemoryBookingStore {
    pub fn with_catalog(catalog: Arc<InMemoryAssetCatalog>) -> Self {
        Self { bookings: RwLock::default(), catalog: Some(catalog) }
    }

    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }

    async fn listings<F>(&self, predicate: F, limit: Option<u32>) -> Vec<BookingListing>
    where
        F: Fn(&Booking) -> bool,
    {
        let mut matching = {
            let bookings = self.bookings.read().await;
            bookings.iter().filter(|booking| predicate(booking)).cloned().collect::<Vec<_>>()
        };
        // Stable sort keeps later inserts first among equal timestamps.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            matching.truncate(limit as usize);
        }

        let mut listings = Vec::with_capacity(matching.len());
        for booking in matching {
            let asset = match &self.catalog {
                Some(catalog) => catalog.find_by_id(&booking.asset_id).await.ok().flatten(),
                None => None,
            };
            listings.push(BookingListing {
                asset_title: asset.as_ref().map(|asset| asset.title.clone()),
                asset_city: asset.as_ref().map(|asset| asset.location.city.clone()),
                booking,
            });
        }
        listings
    }
}

#[async_trait::async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|existing| existing.id == booking.id) {
            return Err(RepositoryError::Conflict(format!("booking {}", booking.id)));
        }
        bookings.push(booking);
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|booking| &booking.id == id).cloned())
    }

    async fn list_for_phone(
        &self,
        phone: &str,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError> {
        Ok(self.listings(|booking| booking.customer.phone == phone, limit).await)
    }

    async fn list_for_partner(
        &self,
        partner_id: &PartnerId,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError> {
        Ok(self.listings(|booking| &booking.partner_id == partner_id, limit).await)
    }

    async fn update_status(
        &self,
        id: &BookingId,
        next: BookingStatus,
    ) -> Result<Booking, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|booking| &booking.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("booking {id}")))?;
        booking.transition_to(next)?;
        Ok(booking.clone())
    }
}
