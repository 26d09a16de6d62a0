//! # Error Handling
//!
//! Error types for the MongoDB REST façade, defined with `thiserror`.
//! Handlers convert these into HTTP responses through [`crate::api::error::ApiError`].

/// Custom result type for mongorest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mongorest
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// MongoDB driver errors with the operation that failed
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: mongodb::error::Error,
        context: String,
    },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Invalid caller input (bad body, bad parameter, unconvertible document)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing resource (collection, document, index)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network transport errors (listener bind, serve loop)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a driver error with a description of the failed operation
    pub fn database<S: Into<String>>(source: mongodb::error::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Server error code reported by MongoDB, if the failure came from the server.
    pub fn server_code(&self) -> Option<i32> {
        match self {
            Error::Database { source, .. } => server_error_code(source),
            _ => None,
        }
    }
}

/// Extract the numeric server error code from a driver error.
fn server_error_code(error: &mongodb::error::Error) -> Option<i32> {
    use mongodb::error::{ErrorKind, WriteFailure};

    match error.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern_error)) => {
            Some(concern_error.code)
        }
        ErrorKind::InsertMany(insert_error) => insert_error
            .write_errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|write_error| write_error.code)
            .or_else(|| insert_error.write_concern_error.as_ref().map(|concern| concern.code)),
        _ => None,
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(error: mongodb::error::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
