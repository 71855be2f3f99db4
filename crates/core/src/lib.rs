pub mod log;
pub mod operation;
pub mod types;
pub mod wrapper;

pub use log::{ExecutionLog, TracingLog};
pub use operation::{FnOperation, Operation, OperationError, Placeholder};
pub use types::{EnvelopeError, ErrorKind, OperationResult, Params, SUCCESS_MESSAGE};
pub use wrapper::{panic_message, SafeOperation};

/// Runs the placeholder operation with the tracing log.
///
/// A missing parameter map is treated as empty. The call never panics.
pub fn process_data(params: Option<Params>) -> OperationResult {
    SafeOperation::new(Placeholder).run(params)
}
