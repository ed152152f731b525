pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{ServiceCatalog, ServiceEntry};
pub use domain::reservation::{NewReservation, Reservation, ReservationDraft, ReservationId, Slot};
pub use domain::tool::{
    ArgValue, ParamSpec, ParamType, ToolArgs, ToolCall, ToolDescriptor, ToolResult,
};
pub use errors::{ApplicationError, DispatchError, DomainError};

pub use chrono;
