use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use bookery_core::domain::reservation::{Slot, TIME_FORMAT};
use bookery_db::{LedgerError, ReservationLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    pub resource: String,
    pub category: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available: bool,
    /// Requested time first, then nearby alternatives. The alternatives are
    /// a hint only and are not checked against the ledger.
    pub suggested_times: Vec<NaiveTime>,
}

impl AvailabilityReport {
    pub fn narration(&self) -> String {
        let time = self.time.format(TIME_FORMAT);
        if self.available {
            return format!(
                "{} is available for {} on {} at {}.",
                self.resource, self.category, self.date, time
            );
        }

        let alternatives = self
            .suggested_times
            .iter()
            .skip(1)
            .map(|candidate| candidate.format(TIME_FORMAT).to_string())
            .collect::<Vec<_>>()
            .join(", ");

        if alternatives.is_empty() {
            format!("{} is already booked on {} at {}.", self.resource, self.date, time)
        } else {
            format!(
                "{} is already booked on {} at {}. Nearby times to try: {}.",
                self.resource, self.date, time, alternatives
            )
        }
    }
}

/// Reads the ledger for the exact slot; never mutates it.
pub async fn check(
    ledger: &dyn ReservationLedger,
    resource: &str,
    category: &str,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<AvailabilityReport, LedgerError> {
    let conflict =
        ledger.find_by_slot(&Slot { resource: resource.to_string(), date, time }).await?;

    Ok(AvailabilityReport {
        resource: resource.to_string(),
        category: category.to_string(),
        date,
        time,
        available: conflict.is_none(),
        suggested_times: suggest_times(time),
    })
}

/// Requested time plus the requested hour offset by one in each direction,
/// clamped to 0..=23, minutes preserved.
pub fn suggest_times(requested: NaiveTime) -> Vec<NaiveTime> {
    let mut times = vec![requested];
    let hour = requested.hour() as i32;

    for offset in [-1, 1] {
        let candidate = hour + offset;
        if !(0..=23).contains(&candidate) {
            continue;
        }
        if let Some(time) = NaiveTime::from_hms_opt(candidate as u32, requested.minute(), 0) {
            times.push(time);
        }
    }

    times
}
