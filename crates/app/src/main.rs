mod selftest;
mod telemetry;

use std::process::ExitCode;

use opguard_util::{load_env_file, AppConfig};
use tracing::info;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    telemetry::install_panic_hook();
    info!(stage = "app", env = %config.environment.as_str(), "running self-test");

    let report = selftest::run_self_test();
    println!("{report}");

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
