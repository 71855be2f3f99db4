use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use tracing::info_span;
use uuid::Uuid;

use crate::log::{ExecutionLog, TracingLog};
use crate::operation::Operation;
use crate::types::{ErrorKind, OperationResult, Params};

const NULL_RESULT: &str = "Resultado nulo";
const INVALID_RESULT: &str = "Resultado inválido";
const NON_STRING_PANIC: &str = "panic with non-string payload";
const EMPTY_ERROR: &str = "operation failed without a message";

/// Runs an [`Operation`] behind a fault boundary and always hands back an
/// [`OperationResult`].
///
/// Missing parameters are treated as an empty map. Panics raised by the body
/// are caught and reported as [`ErrorKind::RuntimeFault`], typed errors as
/// [`ErrorKind::Execution`], and missing or inconsistent results as
/// [`ErrorKind::Validation`].
pub struct SafeOperation<O, L = TracingLog> {
    operation: O,
    log: L,
}

impl<O: Operation> SafeOperation<O> {
    pub fn new(operation: O) -> Self {
        Self::with_log(operation, TracingLog)
    }
}

impl<O: Operation, L: ExecutionLog> SafeOperation<O, L> {
    pub fn with_log(operation: O, log: L) -> Self {
        Self { operation, log }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn run(&self, params: Option<Params>) -> OperationResult {
        let started_at = Utc::now();
        let params = params.unwrap_or_default();
        let name = self.operation.name();

        let span = info_span!("operation", operation = name, invocation_id = %Uuid::new_v4());
        let _entered = span.enter();

        self.log.started(name, &params);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.operation.execute(&params)));

        let mut result = match outcome {
            Ok(Ok(Some(result))) => match result.validate() {
                Ok(()) => result,
                Err(err) => {
                    OperationResult::failure(ErrorKind::Validation, format!("{INVALID_RESULT}: {err}"))
                }
            },
            Ok(Ok(None)) => OperationResult::failure(ErrorKind::Validation, NULL_RESULT),
            Ok(Err(err)) => {
                let message = non_empty(err.to_string(), EMPTY_ERROR);
                self.log.failed(name, &message);
                OperationResult::failure(ErrorKind::Execution, message)
            }
            Err(payload) => {
                let message = non_empty(panic_message(payload.as_ref()), NON_STRING_PANIC);
                self.log.fault(name, &message);
                OperationResult::failure(ErrorKind::RuntimeFault, message)
            }
        };

        // The wall clock may step backwards mid-call.
        if result.timestamp < started_at {
            result.timestamp = started_at;
        }

        self.log.completed(name, &result);
        result
    }
}

/// Extracts the text of a panic payload raised by `panic!` with a literal or
/// formatted message.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        NON_STRING_PANIC.to_string()
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
