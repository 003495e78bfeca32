pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_from_config, connect_with_settings, ping, DbPool};
pub use fixtures::{AssetSeedInfo, DemoDataset, SeedResult, VerificationResult};
pub use repositories::{
    AssetCatalog, AssetListing, BookingStore, InMemoryAssetCatalog, InMemoryBookingStore,
    RepositoryError, SqlAssetCatalog, SqlBookingRepository,
};
