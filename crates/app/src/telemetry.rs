use std::{io, panic, sync::OnceLock};

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::ParseError,
    fmt::{self as tracing_fmt, time::UtcTime, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use opguard_core::panic_message;
use opguard_util::{AppConfig, LogFormat};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to initialize tracing: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),
}

static TRACING_INIT: OnceLock<()> = OnceLock::new();

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Installs the global subscriber writing to stderr. Later calls return `Ok`
/// without touching the installed subscriber.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryError> {
    if TRACING_INIT.get().is_some() {
        return Ok(());
    }

    build_subscriber(config, io::stderr)?.try_init()?;

    TRACING_INIT.set(()).ok();
    tracing::info!(stage = "telemetry", env = %config.environment.as_str(), version = BUILD_VERSION, "tracing initialized");
    Ok(())
}

pub fn build_subscriber<W>(
    config: &AppConfig,
    writer: W,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_new(&config.log_filter)?;

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format {
        LogFormat::Json => Box::new(
            tracing_subscriber::registry().with(env_filter).with(
                tracing_fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer)
                    .json(),
            ),
        ),
        LogFormat::Pretty => Box::new(
            tracing_subscriber::registry().with(env_filter).with(
                tracing_fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(writer)
                    .event_format(tracing_fmt::format().pretty()),
            ),
        ),
    };

    Ok(subscriber)
}

/// Replaces the default panic hook so panics, recovered or not, are reported
/// as tracing events instead of raw stderr lines.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|location| location.to_string())
            .unwrap_or_default();
        tracing::error!(stage = "panic", panic = %message, %location, "thread panicked");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use opguard_util::Environment;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("capture poisoned").clone())
                .expect("log output is utf-8")
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_with(config: &AppConfig) -> (Box<dyn Subscriber + Send + Sync>, Capture) {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = build_subscriber(config, move || writer.clone()).expect("subscriber builds");
        (subscriber, capture)
    }

    #[test]
    fn repeated_init_is_a_noop() {
        let config = AppConfig::for_environment(Environment::Test);

        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn json_format_writes_one_object_per_line() {
        let mut config = AppConfig::for_environment(Environment::Production);
        config.log_format = LogFormat::Json;
        let (subscriber, capture) = capture_with(&config);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(stage = "test", "json line");
        });

        let output = capture.contents();
        let line = output.lines().next().expect("one line logged");
        let value: Value = serde_json::from_str(line).expect("line is json");
        assert_eq!(value["fields"]["message"], "json line");
        assert_eq!(value["fields"]["stage"], "test");
        assert_eq!(value["level"], "INFO");
    }

    #[test]
    fn pretty_format_is_not_json() {
        let config = AppConfig::for_environment(Environment::Development);
        let (subscriber, capture) = capture_with(&config);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(stage = "test", "pretty line");
        });

        let output = capture.contents();
        assert!(output.contains("pretty line"));
        assert!(serde_json::from_str::<Value>(output.trim()).is_err());
    }

    #[test]
    fn filter_drops_lower_levels() {
        let mut config = AppConfig::for_environment(Environment::Production);
        config.log_filter = "warn".to_string();
        let (subscriber, capture) = capture_with(&config);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::warn!("shown");
        });

        let output = capture.contents();
        assert!(!output.contains("hidden"));
        assert!(output.contains("shown"));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let mut config = AppConfig::for_environment(Environment::Test);
        config.log_filter = "opguard_core=loud".to_string();

        assert!(matches!(
            build_subscriber(&config, io::sink),
            Err(TelemetryError::Filter(_))
        ));
    }

    #[test]
    fn panic_hook_reports_through_tracing() {
        let config = AppConfig::for_environment(Environment::Production);
        let (subscriber, capture) = capture_with(&config);

        install_panic_hook();
        tracing::subscriber::with_default(subscriber, || {
            let _ = panic::catch_unwind(|| panic!("hooked panic"));
        });

        let output = capture.contents();
        let value: Value = serde_json::from_str(output.lines().next().expect("panic logged"))
            .expect("panic line is json");
        assert_eq!(value["fields"]["panic"], "hooked panic");
        assert_eq!(value["fields"]["stage"], "panic");
        assert_eq!(value["level"], "ERROR");
    }
}
