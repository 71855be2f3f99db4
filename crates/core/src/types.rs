use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Free-form parameters handed to an operation.
pub type Params = Map<String, Value>;

/// Message attached to the result of a successful placeholder run.
pub const SUCCESS_MESSAGE: &str = "Operação concluída com sucesso";

/// Standardized envelope returned by every wrapped operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    pub timestamp: DateTime<Utc>,
}

impl OperationResult {
    /// Builds a successful result stamped with the current time.
    pub fn success<S: Into<String>>(data: Option<Value>, message: S) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
            error: None,
            error_type: None,
            timestamp: Utc::now(),
        }
    }

    /// Builds a failed result stamped with the current time.
    pub fn failure<S: Into<String>>(kind: ErrorKind, error: S) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            error_type: Some(kind),
            timestamp: Utc::now(),
        }
    }

    /// Checks that exactly one of the success or failure shapes is populated.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.success {
            if self.error.is_some() {
                return Err(EnvelopeError::ErrorOnSuccess);
            }
            if self.error_type.is_some() {
                return Err(EnvelopeError::ErrorTypeOnSuccess);
            }
        } else {
            match self.error.as_deref() {
                None | Some("") => return Err(EnvelopeError::MissingError),
                Some(_) => {}
            }
            if self.error_type.is_none() {
                return Err(EnvelopeError::MissingErrorType);
            }
        }
        Ok(())
    }

    /// Serializes the envelope into its JSON interchange form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an envelope from JSON, rejecting payloads that break the invariant.
    pub fn from_json(raw: &str) -> Result<Self, EnvelopeError> {
        let result: Self = serde_json::from_str(raw)?;
        result.validate()?;
        Ok(result)
    }
}

/// Reasons an envelope can be rejected.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("successful result carries an error message")]
    ErrorOnSuccess,
    #[error("successful result carries an error type")]
    ErrorTypeOnSuccess,
    #[error("failed result has no error message")]
    MissingError,
    #[error("failed result has no error type")]
    MissingErrorType,
    #[error("failed to parse result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse failure category reported through `error_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation produced no result, or an inconsistent one.
    Validation,
    /// The operation panicked.
    RuntimeFault,
    /// The operation returned an [`OperationError`](crate::OperationError).
    Execution,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::RuntimeFault => "RuntimeFault",
            Self::Execution => "ExecutionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ValidationError" => Ok(Self::Validation),
            "RuntimeFault" => Ok(Self::RuntimeFault),
            "ExecutionError" => Ok(Self::Execution),
            _ => Err(()),
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        ErrorKind::from_str(&value).map_err(|_| D::Error::custom("unknown error type"))
    }
}
