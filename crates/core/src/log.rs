use tracing::{error, info};

use crate::types::{ErrorKind, OperationResult, Params};

/// Sink for the diagnostic records a wrapped call emits.
///
/// The wrapper receives this as a dependency so callers can swap the
/// process-wide tracing output for something else.
pub trait ExecutionLog {
    fn started(&self, operation: &str, params: &Params);
    fn completed(&self, operation: &str, result: &OperationResult);
    fn failed(&self, operation: &str, error: &str);
    fn fault(&self, operation: &str, message: &str);
}

/// Forwards records to the global `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ExecutionLog for TracingLog {
    fn started(&self, operation: &str, params: &Params) {
        info!(stage = "operation", operation, params = ?params, "starting execution");
    }

    fn completed(&self, operation: &str, result: &OperationResult) {
        info!(
            stage = "operation",
            operation,
            success = result.success,
            error_type = result.error_type.map(ErrorKind::as_str).unwrap_or("none"),
            result = ?result,
            "execution finished"
        );
    }

    fn failed(&self, operation: &str, error: &str) {
        error!(stage = "operation", operation, error, "execution returned an error");
    }

    fn fault(&self, operation: &str, message: &str) {
        error!(stage = "operation", operation, panic = message, "recovered from panic");
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;

    use super::ExecutionLog;
    use crate::types::{OperationResult, Params};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Record {
        Started(Params),
        Completed(OperationResult),
        Failed(String),
        Fault(String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingLog {
        records: RefCell<Vec<Record>>,
    }

    impl RecordingLog {
        pub fn records(&self) -> Vec<Record> {
            self.records.borrow().clone()
        }
    }

    impl ExecutionLog for RecordingLog {
        fn started(&self, _operation: &str, params: &Params) {
            self.records.borrow_mut().push(Record::Started(params.clone()));
        }

        fn completed(&self, _operation: &str, result: &OperationResult) {
            self.records
                .borrow_mut()
                .push(Record::Completed(result.clone()));
        }

        fn failed(&self, _operation: &str, error: &str) {
            self.records
                .borrow_mut()
                .push(Record::Failed(error.to_string()));
        }

        fn fault(&self, _operation: &str, message: &str) {
            self.records
                .borrow_mut()
                .push(Record::Fault(message.to_string()));
        }
    }
}
