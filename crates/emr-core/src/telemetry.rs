use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const OVERRIDE_VAR: &str = "RUST_LOG";
const CONFIGURED_VAR: &str = "APP_LOG_LEVEL";

#[derive(Debug)]
pub enum TelemetryError {
    /// `variable` names where the rejected filter came from.
    EnvFilter {
        variable: &'static str,
        value: String,
        source: ParseError,
    },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter {
                variable, value, ..
            } => write!(f, "{variable}='{value}' is not a valid tracing filter"),
            TelemetryError::Subscriber(err) => {
                write!(f, "clinical service logging was already initialized: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// A non-empty `RUST_LOG` overrides the configured level for a single run. A
/// malformed override is rejected rather than silently ignored.
pub fn filter_for(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match env::var(OVERRIDE_VAR) {
        Ok(raw) if !raw.trim().is_empty() => parse_filter(OVERRIDE_VAR, &raw),
        _ => parse_filter(CONFIGURED_VAR, &config.log_level),
    }
}

fn parse_filter(variable: &'static str, value: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(value).map_err(|source| TelemetryError::EnvFilter {
        variable,
        value: value.to_string(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = filter_for(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
