use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};

use bookery_core::domain::reservation::{
    self, NewReservation, Reservation, ReservationId, Slot, DATE_FORMAT, TIME_FORMAT,
};

use super::{LedgerError, ListOrder, ReservationLedger};
use crate::DbPool;

pub struct SqlReservationLedger {
    pool: DbPool,
}

impl SqlReservationLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReservationLedger for SqlReservationLedger {
    async fn book(&self, new: NewReservation) -> Result<ReservationId, LedgerError> {
        // Single statement over the unique slot index: the conflict check
        // and the insert cannot be interleaved by another writer.
        let result = sqlx::query(
            "INSERT INTO reservations (
                subject_name,
                contact,
                resource,
                category,
                date,
                time,
                notes
             ) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(resource, date, time) DO NOTHING",
        )
        .bind(&new.subject_name)
        .bind(&new.contact)
        .bind(&new.resource)
        .bind(&new.category)
        .bind(new.date.format(DATE_FORMAT).to_string())
        .bind(new.time.format(TIME_FORMAT).to_string())
        .bind(new.notes.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::SlotTaken);
        }

        Ok(ReservationId(result.last_insert_rowid()))
    }

    async fn cancel(
        &self,
        subject_name: &str,
        contact: &str,
        date: NaiveDate,
    ) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            "DELETE FROM reservations
             WHERE subject_name = ? AND contact = ? AND date = ?",
        )
        .bind(subject_name)
        .bind(contact)
        .bind(date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Reservation>, LedgerError> {
        let row = sqlx::query(
            "SELECT
                id,
                subject_name,
                contact,
                resource,
                category,
                date,
                time,
                notes,
                created_at
             FROM reservations
             WHERE resource = ? AND date = ? AND time = ?",
        )
        .bind(&slot.resource)
        .bind(slot.date.format(DATE_FORMAT).to_string())
        .bind(slot.time.format(TIME_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(reservation_from_row).transpose()
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<Reservation>, LedgerError> {
        let query = match order {
            ListOrder::Schedule => {
                "SELECT
                    id,
                    subject_name,
                    contact,
                    resource,
                    category,
                    date,
                    time,
                    notes,
                    created_at
                 FROM reservations
                 ORDER BY date ASC, time ASC, id ASC"
            }
            ListOrder::Newest => {
                "SELECT
                    id,
                    subject_name,
                    contact,
                    resource,
                    category,
                    date,
                    time,
                    notes,
                    created_at
                 FROM reservations
                 ORDER BY created_at DESC, id DESC"
            }
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.into_iter().map(reservation_from_row).collect()
    }
}

fn reservation_from_row(row: SqliteRow) -> Result<Reservation, LedgerError> {
    let date_raw = row.get::<String, _>("date");
    let date = reservation::parse_date(&date_raw)
        .ok_or_else(|| LedgerError::Decode(format!("invalid stored date `{date_raw}`")))?;

    let time_raw = row.get::<String, _>("time");
    let time = reservation::parse_time(&time_raw)
        .ok_or_else(|| LedgerError::Decode(format!("invalid stored time `{time_raw}`")))?;

    // created_at is SQLite's CURRENT_TIMESTAMP, always UTC.
    let created_raw = row.get::<String, _>("created_at");
    let created_at = chrono::NaiveDateTime::parse_from_str(&created_raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| LedgerError::Decode(format!("invalid stored timestamp `{created_raw}`")))?;

    Ok(Reservation {
        id: ReservationId(row.get::<i64, _>("id")),
        subject_name: row.get("subject_name"),
        contact: row.get("contact"),
        resource: row.get("resource"),
        category: row.get("category"),
        date,
        time,
        notes: row.get::<Option<String>, _>("notes"),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use bookery_core::domain::reservation::{parse_date, parse_time, NewReservation};

    use super::SqlReservationLedger;
    use crate::migrations::run_pending;
    use crate::repositories::{LedgerError, ListOrder, ReservationLedger};
    use crate::{connect_with_settings, DbPool};

    async fn memory_ledger() -> (SqlReservationLedger, DbPool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        (SqlReservationLedger::new(pool.clone()), pool)
    }

    fn fixture() -> NewReservation {
        NewReservation {
            subject_name: "Jane Doe".to_string(),
            contact: "+15551234567".to_string(),
            resource: "Dr. Smith".to_string(),
            category: "Primary Care".to_string(),
            date: parse_date("2025-03-10").expect("date"),
            time: parse_time("14:00").expect("time"),
            notes: None,
        }
    }

    #[tokio::test]
    async fn booked_slot_is_findable() {
        let (ledger, pool) = memory_ledger().await;

        let id = ledger.book(fixture()).await.expect("book");
        let found = ledger
            .find_by_slot(&fixture().slot())
            .await
            .expect("find")
            .expect("reservation should exist");

        assert_eq!(found.id, id);
        assert_eq!(found.subject_name, "Jane Doe");
        assert_eq!(found.time, parse_time("14:00").expect("time"));

        pool.close().await;
    }

    #[tokio::test]
    async fn double_booking_a_slot_is_rejected() {
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("first book");
        let second = NewReservation { subject_name: "John Roe".to_string(), ..fixture() };
        let error = ledger.book(second).await.expect_err("second book should fail");

        assert!(matches!(error, LedgerError::SlotTaken));

        pool.close().await;
    }

    #[tokio::test]
    async fn same_resource_different_time_books_fine() {
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("first book");
        let later = NewReservation { time: parse_time("15:00").expect("time"), ..fixture() };
        ledger.book(later).await.expect("different time should book");

        pool.close().await;
    }

    #[tokio::test]
    async fn confirmation_ids_strictly_increase() {
        let (ledger, pool) = memory_ledger().await;

        let first = ledger.book(fixture()).await.expect("first");
        let second = ledger
            .book(NewReservation { time: parse_time("15:00").expect("time"), ..fixture() })
            .await
            .expect("second");
        let third = ledger
            .book(NewReservation { resource: "Dr. Brown".to_string(), ..fixture() })
            .await
            .expect("third");

        assert!(first.0 < second.0);
        assert!(second.0 < third.0);

        pool.close().await;
    }

    #[tokio::test]
    async fn cancel_removes_matches_then_reports_nothing() {
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("book");
        let date = parse_date("2025-03-10").expect("date");

        let first = ledger.cancel("Jane Doe", "+15551234567", date).await.expect("cancel");
        assert_eq!(first, 1);

        let second = ledger.cancel("Jane Doe", "+15551234567", date).await.expect("repeat cancel");
        assert_eq!(second, 0);

        pool.close().await;
    }

    #[tokio::test]
    async fn cancel_matching_is_case_sensitive() {
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("book");
        let date = parse_date("2025-03-10").expect("date");

        let removed = ledger.cancel("jane doe", "+15551234567", date).await.expect("cancel");
        assert_eq!(removed, 0);

        pool.close().await;
    }

    #[tokio::test]
    async fn cancel_sweeps_every_booking_on_the_date() {
        // Matching ignores resource and time: one call clears the whole day.
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("morning booking");
        ledger
            .book(NewReservation {
                resource: "Dr. Brown".to_string(),
                time: parse_time("09:00").expect("time"),
                ..fixture()
            })
            .await
            .expect("second booking");

        let date = parse_date("2025-03-10").expect("date");
        let removed = ledger.cancel("Jane Doe", "+15551234567", date).await.expect("cancel");

        assert_eq!(removed, 2);

        pool.close().await;
    }

    #[tokio::test]
    async fn freed_slot_can_be_rebooked() {
        let (ledger, pool) = memory_ledger().await;

        ledger.book(fixture()).await.expect("book");
        let date = parse_date("2025-03-10").expect("date");
        ledger.cancel("Jane Doe", "+15551234567", date).await.expect("cancel");

        ledger.book(fixture()).await.expect("slot should be free again");

        pool.close().await;
    }

    #[tokio::test]
    async fn list_orders_are_caller_selectable() {
        let (ledger, pool) = memory_ledger().await;

        let first = ledger
            .book(NewReservation {
                date: parse_date("2025-03-12").expect("date"),
                ..fixture()
            })
            .await
            .expect("late date first");
        let second = ledger
            .book(NewReservation {
                date: parse_date("2025-03-10").expect("date"),
                time: parse_time("16:00").expect("time"),
                ..fixture()
            })
            .await
            .expect("second");
        let third = ledger.book(fixture()).await.expect("third");

        let schedule = ledger.list(ListOrder::Schedule).await.expect("schedule order");
        let schedule_ids: Vec<_> = schedule.iter().map(|r| r.id).collect();
        assert_eq!(schedule_ids, vec![third, second, first]);

        let newest = ledger.list(ListOrder::Newest).await.expect("newest order");
        let newest_ids: Vec<_> = newest.iter().map(|r| r.id).collect();
        assert_eq!(newest_ids, vec![third, second, first]);

        pool.close().await;
    }

    #[tokio::test]
    async fn concurrent_books_admit_exactly_one() {
        let dir = TempDir::new().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("ledger.db").display());
        let pool = connect_with_settings(&url, 5, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let ledger = Arc::new(SqlReservationLedger::new(pool.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move { ledger.book(fixture()).await }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.expect("task should not panic") {
                Ok(_) => successes += 1,
                Err(LedgerError::SlotTaken) => conflicts += 1,
                Err(other) => panic!("unexpected ledger error: {other}"),
            }
        }

        assert_eq!(successes, 1, "exactly one concurrent booking should win");
        assert_eq!(conflicts, 3);

        pool.close().await;
    }
}
