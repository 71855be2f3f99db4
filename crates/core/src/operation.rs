use thiserror::Error;

use crate::types::{OperationResult, Params, SUCCESS_MESSAGE};

/// Errors an operation body can report instead of a result.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },
    #[error("{0}")]
    Failed(String),
}

/// Unit of work executed inside a [`SafeOperation`](crate::SafeOperation).
///
/// Returning `Ok(None)` signals that the body produced no result; the wrapper
/// turns that into a validation failure.
pub trait Operation {
    /// Name used to tag log records.
    fn name(&self) -> &str;

    fn execute(&self, params: &Params) -> Result<Option<OperationResult>, OperationError>;
}

/// Default body awaiting real logic. Always succeeds with an empty payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct Placeholder;

impl Operation for Placeholder {
    fn name(&self) -> &str {
        "process_data"
    }

    fn execute(&self, _params: &Params) -> Result<Option<OperationResult>, OperationError> {
        Ok(Some(OperationResult::success(None, SUCCESS_MESSAGE)))
    }
}

/// Adapts a closure into an [`Operation`].
pub struct FnOperation<F> {
    name: String,
    body: F,
}

impl<F> FnOperation<F>
where
    F: Fn(&Params) -> Result<Option<OperationResult>, OperationError>,
{
    pub fn new<S: Into<String>>(name: S, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn(&Params) -> Result<Option<OperationResult>, OperationError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, params: &Params) -> Result<Option<OperationResult>, OperationError> {
        (self.body)(params)
    }
}
