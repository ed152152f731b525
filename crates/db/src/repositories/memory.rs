use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use bookery_core::domain::reservation::{NewReservation, Reservation, ReservationId, Slot};

use super::{LedgerError, ListOrder, ReservationLedger};

/// Test-oriented ledger with the same conflict semantics as the SQL
/// implementation; the write lock stands in for the unique index.
#[derive(Default)]
pub struct InMemoryReservationLedger {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    rows: Vec<Reservation>,
}

#[async_trait::async_trait]
impl ReservationLedger for InMemoryReservationLedger {
    async fn book(&self, new: NewReservation) -> Result<ReservationId, LedgerError> {
        let mut state = self.state.write().await;

        let slot = new.slot();
        if state.rows.iter().any(|row| row.slot().conflicts_with(&slot)) {
            return Err(LedgerError::SlotTaken);
        }

        state.next_id += 1;
        let id = ReservationId(state.next_id);
        state.rows.push(Reservation {
            id,
            subject_name: new.subject_name,
            contact: new.contact,
            resource: new.resource,
            category: new.category,
            date: new.date,
            time: new.time,
            notes: new.notes,
            created_at: Utc::now(),
        });

        Ok(id)
    }

    async fn cancel(
        &self,
        subject_name: &str,
        contact: &str,
        date: NaiveDate,
    ) -> Result<u64, LedgerError> {
        let mut state = self.state.write().await;

        let before = state.rows.len();
        state.rows.retain(|row| {
            !(row.subject_name == subject_name && row.contact == contact && row.date == date)
        });

        Ok((before - state.rows.len()) as u64)
    }

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Reservation>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.rows.iter().find(|row| row.slot().conflicts_with(slot)).cloned())
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<Reservation>, LedgerError> {
        let state = self.state.read().await;
        let mut rows = state.rows.clone();
        match order {
            ListOrder::Schedule => rows.sort_by(|a, b| {
                (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id))
            }),
            ListOrder::Newest => rows.sort_by(|a, b| {
                (b.created_at, b.id).cmp(&(a.created_at, a.id))
            }),
        }
        Ok(rows)
    }
}
