use sqlx::sqlite::SqliteRow;

use innerspace_core::domain::asset::AssetId;
use innerspace_core::domain::booking::{
    Booking, BookingDetails, BookingDuration, BookingId, BookingListing, BookingSource,
    BookingStatus, CustomerContact, PaymentStatus, PricingSnapshot,
};
use innerspace_core::domain::partner::PartnerId;

use super::columns::{
    get, is_unique_violation, parse_decimal, parse_named, parse_timestamp, timestamp,
};
use super::{BookingStore, RepositoryError};
use crate::DbPool;

const BOOKING_COLUMNS: &str = "b.id, b.asset_id, b.partner_id, b.customer_name, b.customer_email,
     b.customer_phone, b.booking_date, b.booking_time, b.duration, b.units,
     b.base_amount, b.tax, b.total_amount, b.currency, b.status, b.payment_status,
     b.source, b.notes, b.created_at, b.updated_at";

pub struct SqlBookingRepository {
    pool: DbPool,
}

impl SqlBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        column: &str,
        value: &str,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(i64::from).unwrap_or(-1);
        let sql = format!(
            "SELECT {BOOKING_COLUMNS}, a.title AS asset_title, a.city AS asset_city
             FROM booking b
             LEFT JOIN asset a ON a.id = b.asset_id
             WHERE b.{column} = ?
             ORDER BY b.created_at DESC, b.id DESC
             LIMIT ?"
        );
        let rows = sqlx::query(&sql).bind(value).bind(limit).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<BookingListing, RepositoryError> {
                Ok(BookingListing {
                    booking: row_to_booking(row)?,
                    asset_title: get(row, "asset_title")?,
                    asset_city: get(row, "asset_city")?,
                })
            })
            .collect()
    }
}

fn row_to_booking(row: &SqliteRow) -> Result<Booking, RepositoryError> {
    let duration: String = get(row, "duration")?;
    let units: i64 = get(row, "units")?;
    let base_amount: String = get(row, "base_amount")?;
    let tax: String = get(row, "tax")?;
    let total_amount: String = get(row, "total_amount")?;
    let status: String = get(row, "status")?;
    let payment_status: String = get(row, "payment_status")?;
    let source: String = get(row, "source")?;
    let created_at: String = get(row, "created_at")?;
    let updated_at: String = get(row, "updated_at")?;

    Ok(Booking {
        id: BookingId(get(row, "id")?),
        asset_id: AssetId(get(row, "asset_id")?),
        partner_id: PartnerId(get(row, "partner_id")?),
        customer: CustomerContact {
            name: get(row, "customer_name")?,
            email: get(row, "customer_email")?,
            phone: get(row, "customer_phone")?,
        },
        details: BookingDetails {
            date: get(row, "booking_date")?,
            time: get(row, "booking_time")?,
            duration: duration
                .parse::<BookingDuration>()
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            units: u32::try_from(units)
                .map_err(|_| RepositoryError::Decode(format!("units: {units}")))?,
        },
        pricing: PricingSnapshot {
            base_amount: parse_decimal("base_amount", &base_amount)?,
            tax: parse_decimal("tax", &tax)?,
            total_amount: parse_decimal("total_amount", &total_amount)?,
            currency: get(row, "currency")?,
        },
        status: parse_named("status", &status, BookingStatus::parse)?,
        payment_status: parse_named("payment_status", &payment_status, PaymentStatus::parse)?,
        source: parse_named("source", &source, BookingSource::parse)?,
        notes: get(row, "notes")?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait::async_trait]
impl BookingStore for SqlBookingRepository {
    async fn create(&self, booking: Booking) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO booking (id, asset_id, partner_id, customer_name, customer_email,
                                  customer_phone, booking_date, booking_time, duration, units,
                                  base_amount, tax, total_amount, currency, status,
                                  payment_status, source, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.id.0)
        .bind(&booking.asset_id.0)
        .bind(&booking.partner_id.0)
        .bind(&booking.customer.name)
        .bind(&booking.customer.email)
        .bind(&booking.customer.phone)
        .bind(&booking.details.date)
        .bind(&booking.details.time)
        .bind(booking.details.duration.as_str())
        .bind(i64::from(booking.details.units))
        .bind(booking.pricing.base_amount.to_string())
        .bind(booking.pricing.tax.to_string())
        .bind(booking.pricing.total_amount.to_string())
        .bind(&booking.pricing.currency)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.source.as_str())
        .bind(&booking.notes)
        .bind(timestamp(&booking.created_at))
        .bind(timestamp(&booking.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(RepositoryError::Conflict(format!("booking {}", booking.id)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking b WHERE b.id = ?");
        let row = sqlx::query(&sql).bind(&id.0).fetch_optional(&self.pool).await?;

        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list_for_phone(
        &self,
        phone: &str,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError> {
        self.list_where("customer_phone", phone, limit).await
    }

    async fn list_for_partner(
        &self,
        partner_id: &PartnerId,
        limit: Option<u32>,
    ) -> Result<Vec<BookingListing>, RepositoryError> {
        self.list_where("partner_id", &partner_id.0, limit).await
    }

    async fn update_status(
        &self,
        id: &BookingId,
        next: BookingStatus,
    ) -> Result<Booking, RepositoryError> {
        let mut booking = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("booking {id}")))?;
        booking.transition_to(next)?;

        sqlx::query("UPDATE booking SET status = ?, updated_at = ? WHERE id = ?")
            .bind(booking.status.as_str())
            .bind(timestamp(&booking.updated_at))
            .bind(&booking.id.0)
            .execute(&self.pool)
            .await?;

        Ok(booking)
    }
}
