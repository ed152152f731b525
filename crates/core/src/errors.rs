use thiserror::Error;

/// Expected business outcomes. These are returned to callers as failed tool
/// results, never raised past the dispatcher.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("field `{0}` is missing or invalid")]
    MalformedRequest(String),
    #[error("{resource} is already booked on {date} at {time}")]
    SlotTaken { resource: String, date: String, time: String },
}

/// Routing failures raised by the dispatcher before any handler runs.
/// Transport adapters map these to client errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("tool name is missing")]
    MissingToolName,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("required parameter `{0}` is missing")]
    MissingParameter(String),
    #[error("parameter `{name}` must be {expected}")]
    InvalidArgument { name: String, expected: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ApplicationError {
    /// Caller-safe narration. Storage detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(error) => error.to_string(),
            Self::Storage(_) => {
                "The reservation system is temporarily unavailable. Please try again shortly."
                    .to_string()
            }
        }
    }
}
