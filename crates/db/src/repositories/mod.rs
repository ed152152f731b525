use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use bookery_core::domain::reservation::{NewReservation, Reservation, ReservationId, Slot};

pub mod memory;
pub mod reservation;

pub use memory::InMemoryReservationLedger;
pub use reservation::SqlReservationLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("slot is already booked")]
    SlotTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// (`date`, `time`) ascending, the schedule view.
    #[default]
    Schedule,
    /// `created_at` descending, newest booking first.
    Newest,
}

/// Durable store of active reservations and the sole authority for slot
/// conflicts.
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    /// Conflict-checked insert. Exactly one of any set of concurrent calls
    /// for the same slot succeeds; the rest see `LedgerError::SlotTaken`.
    async fn book(&self, reservation: NewReservation) -> Result<ReservationId, LedgerError>;

    /// Removes every active reservation matching the triple with
    /// case-sensitive equality. Zero matches is a normal outcome.
    async fn cancel(
        &self,
        subject_name: &str,
        contact: &str,
        date: NaiveDate,
    ) -> Result<u64, LedgerError>;

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Reservation>, LedgerError>;

    async fn list(&self, order: ListOrder) -> Result<Vec<Reservation>, LedgerError>;
}
