use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Tag prefixed to the display form of a confirmation id.
pub const CONFIRMATION_TAG: &str = "APT";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub i64);

impl ReservationId {
    /// Display token handed to callers. Presentation only; lookups always
    /// go through the numeric id.
    pub fn confirmation_code(&self) -> String {
        format!("{CONFIRMATION_TAG}{:04}", self.0)
    }
}

/// One bookable unit. Conflict equality is the whole triple and nothing
/// else: `category` does not participate, so two different categories can
/// never share a slot either.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub resource: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn conflicts_with(&self, other: &Slot) -> bool {
        self == other
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub subject_name: String,
    pub contact: String,
    pub resource: String,
    pub category: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot { resource: self.resource.clone(), date: self.date, time: self.time }
    }

    pub fn conflicts_with(&self, other: &Reservation) -> bool {
        self.slot().conflicts_with(&other.slot())
    }
}

/// A validated booking request, ready for the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewReservation {
    pub subject_name: String,
    pub contact: String,
    pub resource: String,
    pub category: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

impl NewReservation {
    pub fn slot(&self) -> Slot {
        Slot { resource: self.resource.clone(), date: self.date, time: self.time }
    }
}

/// Raw booking fields as received from a caller, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationDraft {
    pub subject_name: String,
    pub contact: String,
    pub resource: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}

impl ReservationDraft {
    /// Checks fields in declaration order; the first offending field is the
    /// one reported.
    pub fn validate(self) -> Result<NewReservation, DomainError> {
        let subject_name = require_text("subject_name", &self.subject_name)?;
        let contact = require_text("contact", &self.contact)?;
        let resource = require_text("resource", &self.resource)?;
        let category = require_text("category", &self.category)?;
        let date = parse_date(&self.date)
            .ok_or_else(|| DomainError::MalformedRequest("date".to_string()))?;
        let time = parse_time(&self.time)
            .ok_or_else(|| DomainError::MalformedRequest("time".to_string()))?;

        let notes = self.notes.map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

        Ok(NewReservation { subject_name, contact, resource, category, date, time, notes })
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

fn require_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MalformedRequest(field.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_time, Reservation, ReservationDraft, ReservationId};
    use crate::errors::DomainError;
    use chrono::Utc;

    fn draft() -> ReservationDraft {
        ReservationDraft {
            subject_name: "Jane Doe".to_string(),
            contact: "+15551234567".to_string(),
            resource: "Dr. Smith".to_string(),
            category: "Primary Care".to_string(),
            date: "2025-03-10".to_string(),
            time: "14:00".to_string(),
            notes: None,
        }
    }

    #[test]
    fn valid_draft_produces_parsed_fields() {
        let new = draft().validate().expect("draft should validate");
        assert_eq!(new.date.to_string(), "2025-03-10");
        assert_eq!(new.time.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn first_offending_field_wins() {
        let bad = ReservationDraft { subject_name: "  ".to_string(), date: "nope".to_string(), ..draft() };
        let error = bad.validate().expect_err("blank subject should fail first");
        assert_eq!(error, DomainError::MalformedRequest("subject_name".to_string()));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let bad = ReservationDraft { date: "03/10/2025".to_string(), ..draft() };
        let error = bad.validate().expect_err("US-style date should fail");
        assert_eq!(error, DomainError::MalformedRequest("date".to_string()));
    }

    #[test]
    fn unparseable_time_is_rejected() {
        let bad = ReservationDraft { time: "2pm".to_string(), ..draft() };
        let error = bad.validate().expect_err("12h time should fail");
        assert_eq!(error, DomainError::MalformedRequest("time".to_string()));
    }

    #[test]
    fn blank_notes_collapse_to_none() {
        let new = ReservationDraft { notes: Some("   ".to_string()), ..draft() }
            .validate()
            .expect("draft should validate");
        assert_eq!(new.notes, None);
    }

    #[test]
    fn conflict_ignores_category_and_identity() {
        let new = draft().validate().expect("valid");
        let a = Reservation {
            id: ReservationId(1),
            subject_name: new.subject_name.clone(),
            contact: new.contact.clone(),
            resource: new.resource.clone(),
            category: "Primary Care".to_string(),
            date: new.date,
            time: new.time,
            notes: None,
            created_at: Utc::now(),
        };
        let b = Reservation {
            id: ReservationId(2),
            subject_name: "Someone Else".to_string(),
            category: "Dermatology".to_string(),
            ..a.clone()
        };

        assert!(a.conflicts_with(&b));
    }

    #[test]
    fn different_time_does_not_conflict() {
        let new = draft().validate().expect("valid");
        let a = Reservation {
            id: ReservationId(1),
            subject_name: new.subject_name.clone(),
            contact: new.contact.clone(),
            resource: new.resource.clone(),
            category: new.category.clone(),
            date: new.date,
            time: new.time,
            notes: None,
            created_at: Utc::now(),
        };
        let b = Reservation { time: parse_time("15:00").expect("parse"), ..a.clone() };

        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn confirmation_code_is_zero_padded() {
        assert_eq!(ReservationId(7).confirmation_code(), "APT0007");
        assert_eq!(ReservationId(12345).confirmation_code(), "APT12345");
    }

    #[test]
    fn parse_helpers_accept_padded_input() {
        assert!(parse_date(" 2025-03-10 ").is_some());
        assert!(parse_time(" 09:30 ").is_some());
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_time("9:30pm").is_none());
    }
}
