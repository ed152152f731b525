pub mod availability;
pub mod format;
pub mod handlers;
pub mod registry;

pub use availability::AvailabilityReport;
pub use handlers::booking_registry;
pub use registry::{ToolHandler, ToolRegistry};
