use innerspace_db::{
    connect_with_settings, migrations, AssetCatalog, DemoDataset, InMemoryAssetCatalog,
    SqlAssetCatalog,
};

type ParityResult<T = ()> = Result<T, String>;

macro_rules! require_eq {
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

async fn sql_catalog() -> ParityResult<SqlAssetCatalog> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    Ok(SqlAssetCatalog::new(pool))
}

async fn listing_ids(
    catalog: &dyn AssetCatalog,
    asset_type: &str,
    city: &str,
) -> ParityResult<Vec<String>> {
    let listings = catalog
        .search(asset_type, city, 10)
        .await
        .map_err(|error| format!("search {asset_type}/{city}: {error}"))?;
    Ok(listings.into_iter().map(|listing| listing.asset.id.0).collect())
}

#[tokio::test]
async fn sql_and_in_memory_catalogs_agree_on_demo_data() -> ParityResult {
    let sql = sql_catalog().await?;
    let memory = InMemoryAssetCatalog::default();
    DemoDataset::load(&sql).await.map_err(|error| format!("seed sql: {error}"))?;
    DemoDataset::load(&memory).await.map_err(|error| format!("seed memory: {error}"))?;

    for asset_type in ["meeting_room", "conference_room", "hot_desk", "cabin", "dedicated_desk"] {
        let sql_cities = sql.cities_for_type(asset_type).await.map_err(|e| e.to_string())?;
        let memory_cities = memory.cities_for_type(asset_type).await.map_err(|e| e.to_string())?;
        require_eq!(sql_cities, memory_cities, "city lists differ for {asset_type}");

        for city in &sql_cities {
            let token = city.to_lowercase();
            let sql_ids = listing_ids(&sql, asset_type, &token).await?;
            let memory_ids = listing_ids(&memory, asset_type, &token).await?;
            require_eq!(sql_ids, memory_ids, "listings differ for {asset_type} in {city}");
        }
    }

    Ok(())
}

#[tokio::test]
async fn unknown_space_type_has_no_cities() -> ParityResult {
    let sql = sql_catalog().await?;
    DemoDataset::load(&sql).await.map_err(|error| format!("seed sql: {error}"))?;

    let cities = sql.cities_for_type("treehouse").await.map_err(|e| e.to_string())?;
    require_eq!(cities.len(), 0, "unexpected cities for unknown type: {cities:?}");
    Ok(())
}
