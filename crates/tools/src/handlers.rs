//! The four booking tools. Each handler converts expected business failures
//! into `success = false` results; storage faults are logged with their raw
//! cause and narrated to the caller in sanitized form.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::error;

use bookery_core::catalog::ServiceCatalog;
use bookery_core::config::ArgumentMode;
use bookery_core::domain::reservation::{
    parse_date, parse_time, ReservationDraft, DATE_FORMAT, TIME_FORMAT,
};
use bookery_core::domain::tool::{ParamSpec, ParamType, ToolArgs, ToolDescriptor, ToolResult};
use bookery_core::errors::{ApplicationError, DomainError};
use bookery_db::{LedgerError, ReservationLedger};

use crate::availability;
use crate::registry::{ToolHandler, ToolRegistry};

// Values substituted for omitted required parameters in permissive mode.
const FALLBACK_DATE: &str = "2024-01-01";
const FALLBACK_TIME: &str = "14:00";
const FALLBACK_RESOURCE: &str = "Dr. Smith";
const FALLBACK_CATEGORY: &str = "Primary Care";
const FALLBACK_SUBJECT: &str = "Test Patient";
const FALLBACK_CONTACT: &str = "+1234567890";

/// Builds the production registry: the four booking tools over one shared
/// ledger handle.
pub fn booking_registry(
    ledger: Arc<dyn ReservationLedger>,
    catalog: ServiceCatalog,
    mode: ArgumentMode,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new(mode);
    registry.register(CheckAvailabilityTool { ledger: Arc::clone(&ledger) });
    registry.register(BookAppointmentTool { ledger: Arc::clone(&ledger) });
    registry.register(GetServicesTool { catalog });
    registry.register(CancelAppointmentTool { ledger });
    registry
}

pub struct CheckAvailabilityTool {
    ledger: Arc<dyn ReservationLedger>,
}

#[async_trait]
impl ToolHandler for CheckAvailabilityTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "check_availability",
            description: "Check whether a provider slot is open and hear nearby alternatives",
            params: vec![
                ParamSpec::required("date", ParamType::String, "Requested date, YYYY-MM-DD", Some(FALLBACK_DATE)),
                ParamSpec::required("time", ParamType::String, "Requested time, HH:MM (24h)", Some(FALLBACK_TIME)),
                ParamSpec::required("resource", ParamType::String, "Provider or asset to check", Some(FALLBACK_RESOURCE)),
                ParamSpec::required("category", ParamType::String, "Service type", Some(FALLBACK_CATEGORY)),
            ],
        }
    }

    async fn execute(&self, args: ToolArgs) -> ToolResult {
        match self.run(args).await {
            Ok(result) => result,
            Err(failure) => ToolResult::failure(failure.user_message()),
        }
    }
}

impl CheckAvailabilityTool {
    async fn run(&self, args: ToolArgs) -> Result<ToolResult, ApplicationError> {
        let resource = required_text(&args, "resource")?;
        let category = required_text(&args, "category")?;
        let date = parse_date(required_text(&args, "date")?)
            .ok_or_else(|| DomainError::MalformedRequest("date".to_string()))?;
        let time = parse_time(required_text(&args, "time")?)
            .ok_or_else(|| DomainError::MalformedRequest("time".to_string()))?;

        let report = availability::check(self.ledger.as_ref(), resource, category, date, time)
            .await
            .map_err(|cause| storage_fault("check_availability", cause))?;

        let narration = report.narration();
        let data = serde_json::to_value(&report).unwrap_or(Value::Null);
        Ok(ToolResult::ok(narration, data))
    }
}

pub struct BookAppointmentTool {
    ledger: Arc<dyn ReservationLedger>,
}

#[async_trait]
impl ToolHandler for BookAppointmentTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "book_appointment",
            description: "Schedule a new appointment in an open slot",
            params: vec![
                ParamSpec::required("subject_name", ParamType::String, "Who the booking is for", Some(FALLBACK_SUBJECT)),
                ParamSpec::required("contact", ParamType::String, "Callback phone number", Some(FALLBACK_CONTACT)),
                ParamSpec::required("date", ParamType::String, "Appointment date, YYYY-MM-DD", Some(FALLBACK_DATE)),
                ParamSpec::required("time", ParamType::String, "Appointment time, HH:MM (24h)", Some(FALLBACK_TIME)),
                ParamSpec::required("category", ParamType::String, "Service type", Some(FALLBACK_CATEGORY)),
                ParamSpec::required("resource", ParamType::String, "Provider or asset to book", Some(FALLBACK_RESOURCE)),
                ParamSpec::optional("notes", ParamType::String, "Extra notes for the booking"),
            ],
        }
    }

    async fn execute(&self, args: ToolArgs) -> ToolResult {
        match self.run(args).await {
            Ok(result) => result,
            Err(failure) => ToolResult::failure(failure.user_message()),
        }
    }
}

impl BookAppointmentTool {
    async fn run(&self, args: ToolArgs) -> Result<ToolResult, ApplicationError> {
        let draft = ReservationDraft {
            subject_name: required_text(&args, "subject_name")?.to_string(),
            contact: required_text(&args, "contact")?.to_string(),
            resource: required_text(&args, "resource")?.to_string(),
            category: required_text(&args, "category")?.to_string(),
            date: required_text(&args, "date")?.to_string(),
            time: required_text(&args, "time")?.to_string(),
            notes: args.text("notes").map(ToString::to_string),
        };
        let new = draft.validate()?;

        let date_text = new.date.format(DATE_FORMAT).to_string();
        let time_text = new.time.format(TIME_FORMAT).to_string();

        match self.ledger.book(new.clone()).await {
            Ok(id) => {
                let code = id.confirmation_code();
                let narration = format!(
                    "Appointment confirmed, confirmation {code}. {} with {} on {} at {} for {}.",
                    new.subject_name, new.resource, date_text, time_text, new.category
                );
                Ok(ToolResult::ok(
                    narration,
                    json!({
                        "confirmation": code,
                        "id": id.0,
                        "subject_name": new.subject_name,
                        "contact": new.contact,
                        "resource": new.resource,
                        "category": new.category,
                        "date": date_text,
                        "time": time_text,
                        "notes": new.notes,
                    }),
                ))
            }
            Err(LedgerError::SlotTaken) => Err(DomainError::SlotTaken {
                resource: new.resource,
                date: date_text,
                time: time_text,
            }
            .into()),
            Err(cause) => Err(storage_fault("book_appointment", cause)),
        }
    }
}

pub struct GetServicesTool {
    catalog: ServiceCatalog,
}

#[async_trait]
impl ToolHandler for GetServicesTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_services",
            description: "List available services, providers, and opening hours",
            params: Vec::new(),
        }
    }

    async fn execute(&self, _args: ToolArgs) -> ToolResult {
        let data = serde_json::to_value(&self.catalog).unwrap_or(Value::Null);
        ToolResult::ok(self.catalog.narration(), data)
    }
}

pub struct CancelAppointmentTool {
    ledger: Arc<dyn ReservationLedger>,
}

#[async_trait]
impl ToolHandler for CancelAppointmentTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cancel_appointment",
            description: "Cancel a caller's appointments on a date",
            params: vec![
                ParamSpec::required("subject_name", ParamType::String, "Who the booking is for", Some(FALLBACK_SUBJECT)),
                ParamSpec::required("contact", ParamType::String, "Callback phone number", Some(FALLBACK_CONTACT)),
                ParamSpec::required("date", ParamType::String, "Date to cancel, YYYY-MM-DD", Some(FALLBACK_DATE)),
            ],
        }
    }

    async fn execute(&self, args: ToolArgs) -> ToolResult {
        match self.run(args).await {
            Ok(result) => result,
            Err(failure) => ToolResult::failure(failure.user_message()),
        }
    }
}

impl CancelAppointmentTool {
    async fn run(&self, args: ToolArgs) -> Result<ToolResult, ApplicationError> {
        let subject_name = required_text(&args, "subject_name")?;
        let contact = required_text(&args, "contact")?;
        let date_raw = required_text(&args, "date")?;
        let date = parse_date(date_raw)
            .ok_or_else(|| DomainError::MalformedRequest("date".to_string()))?;

        let removed = self
            .ledger
            .cancel(subject_name, contact, date)
            .await
            .map_err(|cause| storage_fault("cancel_appointment", cause))?;

        if removed == 0 {
            // Normal outcome, not a fault: there was simply nothing to cancel.
            return Ok(ToolResult::failure(format!(
                "No appointments found for {subject_name} on {date_raw}."
            )));
        }

        let noun = if removed == 1 { "appointment" } else { "appointments" };
        Ok(ToolResult::ok(
            format!("Cancelled {removed} {noun} for {subject_name} on {date_raw}."),
            json!({ "cancelled": removed }),
        ))
    }
}

fn required_text<'a>(args: &'a ToolArgs, name: &str) -> Result<&'a str, ApplicationError> {
    args.text(name)
        .ok_or_else(|| ApplicationError::from(DomainError::MalformedRequest(name.to_string())))
}

fn storage_fault(operation: &'static str, cause: LedgerError) -> ApplicationError {
    error!(
        event_name = "tool.storage_error",
        operation,
        error = %cause,
        "ledger operation failed"
    );
    ApplicationError::Storage(cause.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Map, Value};

    use bookery_core::catalog::ServiceCatalog;
    use bookery_core::config::ArgumentMode;
    use bookery_db::InMemoryReservationLedger;

    use super::booking_registry;
    use crate::registry::ToolRegistry;

    fn registry(mode: ArgumentMode) -> ToolRegistry {
        booking_registry(
            Arc::new(InMemoryReservationLedger::default()),
            ServiceCatalog::default(),
            mode,
        )
    }

    fn booking_args() -> Map<String, Value> {
        [
            ("subject_name", json!("Jane Doe")),
            ("contact", json!("+15551234567")),
            ("date", json!("2025-03-10")),
            ("time", json!("14:00")),
            ("category", json!("Primary Care")),
            ("resource", json!("Dr. Smith")),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }

    #[tokio::test]
    async fn booking_narrates_the_confirmation_token() {
        let registry = registry(ArgumentMode::Strict);

        let result =
            registry.dispatch("book_appointment", &booking_args()).await.expect("dispatch");

        assert!(result.success);
        assert!(result.narration.contains("confirmation APT0001"));
        assert_eq!(result.data["confirmation"], "APT0001");
        assert_eq!(result.data["subject_name"], "Jane Doe");
    }

    #[tokio::test]
    async fn taken_slot_is_a_failed_result_not_an_error() {
        let registry = registry(ArgumentMode::Strict);

        registry.dispatch("book_appointment", &booking_args()).await.expect("first booking");
        let second =
            registry.dispatch("book_appointment", &booking_args()).await.expect("second dispatch");

        assert!(!second.success);
        assert!(second.narration.contains("already booked"));
    }

    #[tokio::test]
    async fn malformed_date_names_the_field() {
        let registry = registry(ArgumentMode::Strict);

        let mut args = booking_args();
        args.insert("date".to_string(), json!("next tuesday"));
        let result = registry.dispatch("book_appointment", &args).await.expect("dispatch");

        assert!(!result.success);
        assert!(result.narration.contains("`date`"));
    }

    #[tokio::test]
    async fn cancel_with_no_match_reports_nothing_to_cancel() {
        let registry = registry(ArgumentMode::Strict);

        let args: Map<String, Value> = [
            ("subject_name", json!("Jane Doe")),
            ("contact", json!("+15551234567")),
            ("date", json!("2025-03-10")),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        let result = registry.dispatch("cancel_appointment", &args).await.expect("dispatch");

        assert!(!result.success);
        assert!(result.narration.contains("No appointments found"));
    }

    #[tokio::test]
    async fn get_services_reads_the_catalog() {
        let registry = registry(ArgumentMode::Strict);

        let result = registry.dispatch("get_services", &Map::new()).await.expect("dispatch");

        assert!(result.success);
        assert!(result.narration.contains("Wellness Partners"));
        assert_eq!(result.data["services"][0]["category"], "Primary Care");
    }

    #[tokio::test]
    async fn permissive_booking_fills_in_fallback_identity() {
        let registry = registry(ArgumentMode::Permissive);

        let result =
            registry.dispatch("book_appointment", &Map::new()).await.expect("dispatch");

        assert!(result.success);
        assert_eq!(result.data["subject_name"], "Test Patient");
        assert_eq!(result.data["date"], "2024-01-01");
    }
}
