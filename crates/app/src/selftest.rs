use std::fmt;

use opguard_core::{process_data, OperationResult, Params};

/// Outcome of a single smoke run of the wrapper.
#[derive(Debug, Clone)]
pub struct SelfTestReport {
    pub result: OperationResult,
}

impl SelfTestReport {
    pub fn passed(&self) -> bool {
        self.result.success
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            match self.result.to_json() {
                Ok(json) => write!(f, "self-test passed: {json}"),
                Err(_) => write!(f, "self-test passed: {:?}", self.result),
            }
        } else {
            write!(
                f,
                "self-test failed: {}",
                self.result.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// Runs the default operation once with an empty parameter map.
pub fn run_self_test() -> SelfTestReport {
    SelfTestReport {
        result: process_data(Some(Params::new())),
    }
}
