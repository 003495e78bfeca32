use sqlx::sqlite::SqliteRow;

use innerspace_core::domain::asset::{Asset, AssetId, AssetStatus, AssetType, Location, Pricing};
use innerspace_core::domain::partner::{Partner, PartnerId};

use super::columns::{
    get, like_pattern, parse_named, parse_optional_decimal, parse_timestamp, timestamp,
};
use super::{search_limit, AssetCatalog, AssetListing, RepositoryError};
use crate::DbPool;

const ASSET_COLUMNS: &str = "a.id, a.partner_id, a.title, a.description, a.asset_type, a.capacity,
     a.address, a.city, a.state, a.pincode, a.amenities_json,
     a.price_hourly, a.price_daily, a.price_weekly, a.price_monthly, a.currency,
     a.status, a.is_active, a.created_at, a.updated_at";

pub struct SqlAssetCatalog {
    pool: DbPool,
}

impl SqlAssetCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_asset(row: &SqliteRow) -> Result<Asset, RepositoryError> {
    let asset_type_raw: String = get(row, "asset_type")?;
    let asset_type = AssetType::parse(&asset_type_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("asset_type: `{asset_type_raw}`")))?;
    let capacity: i64 = get(row, "capacity")?;
    let amenities_json: String = get(row, "amenities_json")?;
    let amenities = serde_json::from_str::<Vec<String>>(&amenities_json)
        .map_err(|e| RepositoryError::Decode(format!("amenities_json: {e}")))?;
    let status: String = get(row, "status")?;
    let is_active: bool = get(row, "is_active")?;
    let created_at: String = get(row, "created_at")?;
    let updated_at: String = get(row, "updated_at")?;

    Ok(Asset {
        id: AssetId(get(row, "id")?),
        partner_id: PartnerId(get(row, "partner_id")?),
        title: get(row, "title")?,
        description: get(row, "description")?,
        asset_type,
        capacity: u32::try_from(capacity)
            .map_err(|_| RepositoryError::Decode(format!("capacity: {capacity}")))?,
        location: Location {
            address: get(row, "address")?,
            city: get(row, "city")?,
            state: get(row, "state")?,
            pincode: get(row, "pincode")?,
        },
        amenities,
        pricing: Pricing {
            hourly: parse_optional_decimal("price_hourly", get(row, "price_hourly")?)?,
            daily: parse_optional_decimal("price_daily", get(row, "price_daily")?)?,
            weekly: parse_optional_decimal("price_weekly", get(row, "price_weekly")?)?,
            monthly: parse_optional_decimal("price_monthly", get(row, "price_monthly")?)?,
            currency: get(row, "currency")?,
        },
        status: parse_named("status", &status, AssetStatus::parse)?,
        is_active,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

fn row_to_partner(row: &SqliteRow) -> Result<Partner, RepositoryError> {
    let is_approved: bool = get(row, "is_approved")?;
    let created_at: String = get(row, "created_at")?;

    Ok(Partner {
        id: PartnerId(get(row, "id")?),
        name: get(row, "name")?,
        email: get(row, "email")?,
        phone: get(row, "phone")?,
        business_name: get(row, "business_name")?,
        is_approved,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

#[async_trait::async_trait]
impl AssetCatalog for SqlAssetCatalog {
    async fn cities_for_type(&self, asset_type: &str) -> Result<Vec<String>, RepositoryError> {
        let cities: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT city FROM asset
             WHERE asset_type = ? AND status = 'approved' AND is_active = 1
             ORDER BY city",
        )
        .bind(asset_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }

    async fn search(
        &self,
        asset_type: &str,
        city: &str,
        limit: u32,
    ) -> Result<Vec<AssetListing>, RepositoryError> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS}, p.business_name AS partner_business_name, p.name AS partner_name
             FROM asset a
             LEFT JOIN partner p ON p.id = a.partner_id
             WHERE a.asset_type = ? AND a.status = 'approved' AND a.is_active = 1
               AND LOWER(a.city) LIKE ? ESCAPE '\\'
             ORDER BY a.title, a.id
             LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(asset_type)
            .bind(like_pattern(&city.to_lowercase()))
            .bind(i64::from(search_limit(limit)))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<AssetListing, RepositoryError> {
                let business_name: Option<String> = get(row, "partner_business_name")?;
                let name: Option<String> = get(row, "partner_name")?;
                Ok(AssetListing {
                    asset: row_to_asset(row)?,
                    partner_name: business_name.filter(|value| !value.trim().is_empty()).or(name),
                })
            })
            .collect()
    }

    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, RepositoryError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM asset a WHERE a.id = ?");
        let row = sqlx::query(&sql).bind(&id.0).fetch_optional(&self.pool).await?;

        row.as_ref().map(row_to_asset).transpose()
    }

    async fn save(&self, asset: Asset) -> Result<(), RepositoryError> {
        let amenities_json = serde_json::to_string(&asset.amenities)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let price = |value: Option<rust_decimal::Decimal>| value.map(|amount| amount.to_string());

        sqlx::query(
            "INSERT INTO asset (id, partner_id, title, description, asset_type, capacity,
                                address, city, state, pincode, amenities_json,
                                price_hourly, price_daily, price_weekly, price_monthly, currency,
                                status, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 asset_type = excluded.asset_type,
                 capacity = excluded.capacity,
                 address = excluded.address,
                 city = excluded.city,
                 state = excluded.state,
                 pincode = excluded.pincode,
                 amenities_json = excluded.amenities_json,
                 price_hourly = excluded.price_hourly,
                 price_daily = excluded.price_daily,
                 price_weekly = excluded.price_weekly,
                 price_monthly = excluded.price_monthly,
                 currency = excluded.currency,
                 status = excluded.status,
                 is_active = excluded.is_active,
                 updated_at = excluded.updated_at",
        )
        .bind(&asset.id.0)
        .bind(&asset.partner_id.0)
        .bind(&asset.title)
        .bind(&asset.description)
        .bind(asset.asset_type.as_str())
        .bind(i64::from(asset.capacity))
        .bind(&asset.location.address)
        .bind(&asset.location.city)
        .bind(&asset.location.state)
        .bind(&asset.location.pincode)
        .bind(amenities_json)
        .bind(price(asset.pricing.hourly))
        .bind(price(asset.pricing.daily))
        .bind(price(asset.pricing.weekly))
        .bind(price(asset.pricing.monthly))
        .bind(&asset.pricing.currency)
        .bind(asset.status.as_str())
        .bind(asset.is_active)
        .bind(timestamp(&asset.created_at))
        .bind(timestamp(&asset.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_partner(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, business_name, is_approved, created_at
             FROM partner WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_partner).transpose()
    }

    async fn save_partner(&self, partner: Partner) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO partner (id, name, email, phone, business_name, is_approved, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 phone = excluded.phone,
                 business_name = excluded.business_name,
                 is_approved = excluded.is_approved",
        )
        .bind(&partner.id.0)
        .bind(&partner.name)
        .bind(&partner.email)
        .bind(&partner.phone)
        .bind(&partner.business_name)
        .bind(partner.is_approved)
        .bind(timestamp(&partner.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use innerspace_core::domain::asset::{
        Asset, AssetId, AssetStatus, AssetType, Location, Pricing,
    };
    use innerspace_core::domain::partner::{Partner, PartnerId};

    use super::SqlAssetCatalog;
    use crate::repositories::AssetCatalog;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlAssetCatalog {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let catalog = SqlAssetCatalog::new(pool);
        catalog
            .save_partner(Partner {
                id: PartnerId("partner-1".to_string()),
                name: "Ravi Kumar".to_string(),
                email: "ravi@workhub.example".to_string(),
                phone: None,
                business_name: Some("WorkHub".to_string()),
                is_approved: true,
                created_at: Utc::now(),
            })
            .await
            .expect("save partner");
        catalog
    }

    fn sample_asset(id: &str, asset_type: AssetType, city: &str, status: AssetStatus) -> Asset {
        let now = Utc::now();
        Asset {
            id: AssetId(id.to_string()),
            partner_id: PartnerId("partner-1".to_string()),
            title: format!("Space {id}"),
            description: "Quiet room with a whiteboard".to_string(),
            asset_type,
            capacity: 6,
            location: Location {
                address: "12 MG Road".to_string(),
                city: city.to_string(),
                state: "Karnataka".to_string(),
                pincode: "560001".to_string(),
            },
            amenities: vec!["wifi".to_string(), "projector".to_string()],
            pricing: Pricing {
                hourly: Some(Decimal::from(500)),
                daily: None,
                weekly: None,
                monthly: Some(Decimal::new(4500050, 2)),
                currency: "INR".to_string(),
            },
            status,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn save_and_find_by_id_round_trips_pricing() {
        let catalog = setup().await;
        let asset = sample_asset("a-1", AssetType::MeetingRoom, "Bangalore", AssetStatus::Approved);

        catalog.save(asset.clone()).await.expect("save");
        let found = catalog.find_by_id(&asset.id).await.expect("find").expect("exists");

        assert_eq!(found.pricing, asset.pricing);
        assert_eq!(found.amenities, asset.amenities);
        assert_eq!(found.location, asset.location);
        assert!(found.is_bookable());
        assert_eq!(catalog.find_by_id(&AssetId("missing".into())).await.expect("find"), None);
    }

    #[tokio::test]
    async fn cities_only_include_approved_active_assets_of_type() {
        let catalog = setup().await;
        let mut inactive =
            sample_asset("a-3", AssetType::MeetingRoom, "Chennai", AssetStatus::Approved);
        inactive.is_active = false;

        for asset in [
            sample_asset("a-1", AssetType::MeetingRoom, "Pune", AssetStatus::Approved),
            sample_asset("a-2", AssetType::MeetingRoom, "Bangalore", AssetStatus::Approved),
            sample_asset("a-4", AssetType::MeetingRoom, "Bangalore", AssetStatus::Approved),
            sample_asset("a-5", AssetType::MeetingRoom, "Delhi", AssetStatus::Pending),
            sample_asset("a-6", AssetType::HotDesk, "Mumbai", AssetStatus::Approved),
            inactive,
        ] {
            catalog.save(asset).await.expect("save");
        }

        let cities = catalog.cities_for_type("meeting_room").await.expect("cities");
        assert_eq!(cities, vec!["Bangalore".to_string(), "Pune".to_string()]);
        assert!(catalog.cities_for_type("cabin").await.expect("cities").is_empty());
    }

    #[tokio::test]
    async fn search_matches_city_case_insensitively_and_joins_partner() {
        let catalog = setup().await;
        catalog
            .save(sample_asset("a-1", AssetType::HotDesk, "New Delhi", AssetStatus::Approved))
            .await
            .expect("save");
        catalog
            .save(sample_asset("a-2", AssetType::HotDesk, "Pune", AssetStatus::Approved))
            .await
            .expect("save");

        let results = catalog.search("hot_desk", "new delhi", 10).await.expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].asset.id.0, "a-1");
        assert_eq!(results[0].partner_name.as_deref(), Some("WorkHub"));

        let partial = catalog.search("hot_desk", "DELHI", 10).await.expect("search");
        assert_eq!(partial.len(), 1);
    }

    #[tokio::test]
    async fn search_is_capped_at_ten_results() {
        let catalog = setup().await;
        for index in 0..12 {
            catalog
                .save(sample_asset(
                    &format!("a-{index:02}"),
                    AssetType::Cabin,
                    "Hyderabad",
                    AssetStatus::Approved,
                ))
                .await
                .expect("save");
        }

        let results = catalog.search("cabin", "hyderabad", 50).await.expect("search");
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let catalog = setup().await;
        catalog
            .save(sample_asset("a-1", AssetType::Cabin, "Pune", AssetStatus::Approved))
            .await
            .expect("save");

        assert!(catalog.search("cabin", "%", 10).await.expect("search").is_empty());
        assert!(catalog.search("cabin", "p_ne", 10).await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn save_upserts_status_changes() {
        let catalog = setup().await;
        let mut asset = sample_asset("a-1", AssetType::Cabin, "Pune", AssetStatus::Pending);
        catalog.save(asset.clone()).await.expect("save");
        assert!(catalog.cities_for_type("cabin").await.expect("cities").is_empty());

        asset.status = AssetStatus::Approved;
        asset.updated_at = Utc::now();
        catalog.save(asset).await.expect("upsert");

        assert_eq!(catalog.cities_for_type("cabin").await.expect("cities"), vec!["Pune"]);
    }
}
