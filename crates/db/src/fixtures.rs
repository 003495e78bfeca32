use chrono::Utc;
use rust_decimal::Decimal;

use innerspace_core::domain::asset::{
    Asset, AssetId, AssetStatus, AssetType, Location, Pricing,
};
use innerspace_core::domain::partner::{Partner, PartnerId};

use crate::repositories::{AssetCatalog, RepositoryError};

pub const DEMO_PARTNER_ID: &str = "partner-demo-001";

/// Deterministic demo listings. Ids are fixed so loading twice upserts in place.
const DEMO_ASSETS: &[DemoAssetContract] = &[
    DemoAssetContract {
        id: "asset-demo-meeting-blr",
        title: "Koramangala Meeting Room",
        description: "Six-seat meeting room with a 65-inch display and whiteboard",
        asset_type: AssetType::MeetingRoom,
        capacity: 6,
        address: "80 Feet Road, Koramangala 4th Block",
        city: "Bangalore",
        state: "Karnataka",
        pincode: "560034",
        amenities: &["wifi", "display", "whiteboard", "coffee"],
        hourly: Some(500),
        daily: Some(3_000),
        weekly: None,
        monthly: None,
        status: AssetStatus::Approved,
    },
    DemoAssetContract {
        id: "asset-demo-hotdesk-blr",
        title: "Indiranagar Hot Desk",
        description: "Open-plan desk near the metro, first come first served",
        asset_type: AssetType::HotDesk,
        capacity: 1,
        address: "100 Feet Road, Indiranagar",
        city: "Bangalore",
        state: "Karnataka",
        pincode: "560038",
        amenities: &["wifi", "locker", "pantry"],
        hourly: None,
        daily: Some(350),
        weekly: Some(2_000),
        monthly: Some(6_500),
        status: AssetStatus::Approved,
    },
    DemoAssetContract {
        id: "asset-demo-cabin-bom",
        title: "Andheri Private Cabin",
        description: "Lockable four-person cabin with reception services",
        asset_type: AssetType::Cabin,
        capacity: 4,
        address: "Veera Desai Road, Andheri West",
        city: "Mumbai",
        state: "Maharashtra",
        pincode: "400053",
        amenities: &["wifi", "reception", "printer", "parking"],
        hourly: Some(800),
        daily: Some(4_500),
        weekly: None,
        monthly: Some(60_000),
        status: AssetStatus::Approved,
    },
    DemoAssetContract {
        id: "asset-demo-boardroom-bom",
        title: "BKC Boardroom",
        description: "Twelve-seat conference room with video conferencing",
        asset_type: AssetType::ConferenceRoom,
        capacity: 12,
        address: "G Block, Bandra Kurla Complex",
        city: "Mumbai",
        state: "Maharashtra",
        pincode: "400051",
        amenities: &["wifi", "video_conferencing", "catering"],
        hourly: Some(1_500),
        daily: None,
        weekly: None,
        monthly: None,
        status: AssetStatus::Approved,
    },
    DemoAssetContract {
        id: "asset-demo-desk-pnq",
        title: "Baner Dedicated Desk",
        description: "Reserved desk awaiting listing review",
        asset_type: AssetType::DedicatedDesk,
        capacity: 1,
        address: "Baner Road, Baner",
        city: "Pune",
        state: "Maharashtra",
        pincode: "411045",
        amenities: &["wifi", "storage"],
        hourly: None,
        daily: Some(450),
        weekly: None,
        monthly: Some(8_000),
        status: AssetStatus::Pending,
    },
];

struct DemoAssetContract {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    asset_type: AssetType,
    capacity: u32,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    pincode: &'static str,
    amenities: &'static [&'static str],
    hourly: Option<i64>,
    daily: Option<i64>,
    weekly: Option<i64>,
    monthly: Option<i64>,
    status: AssetStatus,
}

impl DemoAssetContract {
    fn to_asset(&self) -> Asset {
        let now = Utc::now();
        Asset {
            id: AssetId(self.id.to_string()),
            partner_id: PartnerId(DEMO_PARTNER_ID.to_string()),
            title: self.title.to_string(),
            description: self.description.to_string(),
            asset_type: self.asset_type,
            capacity: self.capacity,
            location: Location {
                address: self.address.to_string(),
                city: self.city.to_string(),
                state: self.state.to_string(),
                pincode: self.pincode.to_string(),
            },
            amenities: self.amenities.iter().map(|amenity| amenity.to_string()).collect(),
            pricing: Pricing {
                hourly: self.hourly.map(Decimal::from),
                daily: self.daily.map(Decimal::from),
                weekly: self.weekly.map(Decimal::from),
                monthly: self.monthly.map(Decimal::from),
                currency: "INR".to_string(),
            },
            status: self.status,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn demo_partner() -> Partner {
    Partner {
        id: PartnerId(DEMO_PARTNER_ID.to_string()),
        name: "Nisha Rao".to_string(),
        email: "partners@innerspace.example".to_string(),
        phone: Some("919900000001".to_string()),
        business_name: Some("Innerspace Demo Spaces".to_string()),
        is_approved: true,
        created_at: Utc::now(),
    }
}

pub fn demo_assets() -> Vec<Asset> {
    DEMO_ASSETS.iter().map(DemoAssetContract::to_asset).collect()
}

/// Demo partner plus listings in two discoverable cities and one pending listing.
pub struct DemoDataset;

impl DemoDataset {
    pub async fn load(catalog: &dyn AssetCatalog) -> Result<SeedResult, RepositoryError> {
        catalog.save_partner(demo_partner()).await?;
        for asset in demo_assets() {
            catalog.save(asset).await?;
        }

        let assets_seeded = DEMO_ASSETS
            .iter()
            .map(|asset| AssetSeedInfo {
                asset_id: asset.id,
                asset_type: asset.asset_type.as_str(),
                city: asset.city,
                discoverable: asset.status == AssetStatus::Approved,
            })
            .collect();

        Ok(SeedResult { assets_seeded })
    }

    pub async fn verify(catalog: &dyn AssetCatalog) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let partner = catalog.find_partner(&PartnerId(DEMO_PARTNER_ID.to_string())).await?;
        checks.push(("demo-partner", partner.is_some_and(|partner| partner.is_approved)));

        for contract in DEMO_ASSETS {
            let stored = catalog.find_by_id(&AssetId(contract.id.to_string())).await?;
            let matches = stored.is_some_and(|asset| {
                asset.status == contract.status
                    && asset.asset_type == contract.asset_type
                    && asset.location.city == contract.city
            });
            checks.push((contract.id, matches));

            let cities = catalog.cities_for_type(contract.asset_type.as_str()).await?;
            let listed = cities.iter().any(|city| city == contract.city);
            let expected_listed = contract.status == AssetStatus::Approved;
            checks.push((contract.discovery_label(), listed == expected_listed));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}

impl DemoAssetContract {
    fn discovery_label(&self) -> &'static str {
        match self.status {
            AssetStatus::Approved => "approved-asset-discoverable",
            _ => "unapproved-asset-hidden",
        }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub assets_seeded: Vec<AssetSeedInfo>,
}

#[derive(Debug)]
pub struct AssetSeedInfo {
    pub asset_id: &'static str,
    pub asset_type: &'static str,
    pub city: &'static str,
    pub discoverable: bool,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
