//! Error types for satchel operations.
//!
//! Only [`SatchelError::InvalidPayload`] and [`SatchelError::Configuration`]
//! leave the mapper. The remaining variants belong to the host-side index
//! adapter.

use thiserror::Error;

/// Result type alias for satchel operations.
pub type SatchelResult<T> = Result<T, SatchelError>;

/// Main error type for all satchel operations.
#[derive(Error, Debug)]
pub enum SatchelError {
    /// The field value could not be mapped.
    #[error("Invalid payload for field [{field}]: {message}")]
    InvalidPayload {
        message: String,
        field: String,
        code: ErrorCode,
    },

    /// A mapping definition or settings source was rejected.
    #[error("Configuration error: {message}")]
    Configuration { message: String, code: ErrorCode },

    /// Index engine failure.
    #[error("Index error: {message}")]
    Index {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Payload (PAY_xxx)
    PayMissingContent,
    PayWrongShape,
    PayBadEncoding,
    PayEmpty,
    PayNoExtractableContent,
    PayExtractionFailed,

    // Configuration (CFG_xxx)
    CfgUnsupportedOption,
    CfgConflictingSettings,
    CfgUnknownAnalyzer,
    CfgSettingsFile,

    // Index (IDX_xxx)
    IdxOperationFailed,
    IdxUnknownField,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PayMissingContent => "PAY_001",
            ErrorCode::PayWrongShape => "PAY_002",
            ErrorCode::PayBadEncoding => "PAY_003",
            ErrorCode::PayEmpty => "PAY_004",
            ErrorCode::PayNoExtractableContent => "PAY_005",
            ErrorCode::PayExtractionFailed => "PAY_006",
            ErrorCode::CfgUnsupportedOption => "CFG_001",
            ErrorCode::CfgConflictingSettings => "CFG_002",
            ErrorCode::CfgUnknownAnalyzer => "CFG_003",
            ErrorCode::CfgSettingsFile => "CFG_004",
            ErrorCode::IdxOperationFailed => "IDX_001",
            ErrorCode::IdxUnknownField => "IDX_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SatchelError {
    /// Create an invalid payload error for `field`.
    pub fn invalid_payload(
        field: impl Into<String>,
        message: impl Into<String>,
        code: ErrorCode,
    ) -> Self {
        Self::InvalidPayload {
            message: message.into(),
            field: field.into(),
            code,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Configuration {
            message: message.into(),
            code,
        }
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
            code: ErrorCode::IdxOperationFailed,
            source: None,
        }
    }

    /// Whether this is an [`SatchelError::InvalidPayload`].
    pub fn is_invalid_payload(&self) -> bool {
        matches!(self, Self::InvalidPayload { .. })
    }

    /// Whether this is a [`SatchelError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPayload { code, .. } => *code,
            Self::Configuration { code, .. } => *code,
            Self::Index { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self.code() {
            ErrorCode::PayMissingContent | ErrorCode::PayEmpty => {
                Some("Send the document as a base64 string or as an object with a `content` key")
            }
            ErrorCode::PayBadEncoding => Some("Encode the attachment bytes with standard base64"),
            ErrorCode::PayExtractionFailed => {
                Some("Set `ignore_errors` to true to index unreadable attachments with empty content")
            }
            ErrorCode::CfgUnknownAnalyzer => {
                Some("Use one of the registered analyzers: default, raw, en_stem, whitespace")
            }
            _ => None,
        }
    }
}

impl From<tantivy::TantivyError> for SatchelError {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index {
            message: err.to_string(),
            code: ErrorCode::IdxOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

impl From<tantivy::query::QueryParserError> for SatchelError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        Self::Index {
            message: format!("Invalid query: {}", err),
            code: ErrorCode::IdxOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
