use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

/// Outbound HTTP stacks are noisy at `debug`; keep them at `warn` unless the
/// operator names them explicitly.
const QUIET_DEPENDENCIES: [&str; 2] = ["hyper=warn", "reqwest=warn"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{value}': unable to build EnvFilter")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
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

/// Build the filter from `RUST_LOG` when set, otherwise from the configured
/// level with dependency noise suppressed.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let invalid = |source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    };

    let mut filter = EnvFilter::try_new(&config.log_level).map_err(invalid)?;
    for directive in QUIET_DEPENDENCIES {
        if config.log_level.contains(directive.split('=').next().unwrap_or_default()) {
            continue;
        }
        let directive: Directive = directive.parse().map_err(invalid)?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_target(false)
        .compact()
        .with_ansi(config.ansi)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
