use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "partner",
        "asset",
        "booking",
        "idx_asset_type_city",
        "idx_asset_status_active",
        "idx_asset_partner_id",
        "idx_booking_customer_phone",
        "idx_booking_partner_id",
        "idx_booking_created_at",
    ];

    async fn table_count(pool: &sqlx::SqlitePool, table: &str) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(pool)
        .await
        .expect("check table")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(table_count(&pool, "partner").await, 1);
        assert_eq!(table_count(&pool, "asset").await, 1);
        assert_eq!(table_count(&pool, "booking").await, 1);
    }

    #[tokio::test]
    async fn schema_rejects_unknown_booking_source() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query(
            "INSERT INTO partner (id, name, email, created_at)
             VALUES ('p-1', 'Partner', 'p@example.com', '2026-01-01T00:00:00.000000Z')",
        )
        .execute(&pool)
        .await
        .expect("insert partner");
        sqlx::query(
            "INSERT INTO asset (id, partner_id, title, asset_type, capacity, address, city, state,
                                pincode, created_at, updated_at)
             VALUES ('a-1', 'p-1', 'Room', 'cabin', 2, 'addr', 'Pune', 'MH', '411001',
                     '2026-01-01T00:00:00.000000Z', '2026-01-01T00:00:00.000000Z')",
        )
        .execute(&pool)
        .await
        .expect("insert asset");

        let result = sqlx::query(
            "INSERT INTO booking (id, asset_id, partner_id, customer_name, customer_email,
                                  customer_phone, booking_date, booking_time, duration,
                                  base_amount, tax, total_amount, source, created_at, updated_at)
             VALUES ('WA1', 'a-1', 'p-1', 'n', 'e@x.io', '91', '01/01/2099', '10:00', 'daily',
                     '1', '0', '1', 'fax', '2026-01-01T00:00:00.000000Z',
                     '2026-01-01T00:00:00.000000Z')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "CHECK constraint should reject source `fax`");
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        assert_eq!(table_count(&pool, "booking").await, 0);
        assert_eq!(table_count(&pool, "asset").await, 0);
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert!(
            managed_schema_signature(&pool).await.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(
            managed_schema_signature(&pool).await,
            initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            if MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()) {
                Some((row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
            } else {
                None
            }
        })
        .collect();
        signature.sort();
        signature
    }
}
