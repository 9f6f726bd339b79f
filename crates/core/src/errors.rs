use thiserror::Error;

/// Failures raised by the lookup, completion, and ingestion paths.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    ExtractionFailed(String),
    #[error("knowledge store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("completion provider unavailable: {0}")]
    CompletionUnavailable(String),
    #[error("article fetch failed: {0}")]
    FetchFailed(String),
}

impl ApplicationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::CompletionUnavailable(_) => "completion_unavailable",
            Self::FetchFailed(_) => "fetch_failed",
        }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Text placed in the `error` field of HTTP error bodies.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let message = value.to_string();
        match value {
            ApplicationError::InvalidInput(_) | ApplicationError::ExtractionFailed(_) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::StoreUnavailable(_)
            | ApplicationError::CompletionUnavailable(_)
            | ApplicationError::FetchFailed(_) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
