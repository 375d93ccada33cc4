//! Logging subscriber initialisation.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{
    ServerConfig,
    logging::{LogFormat, LoggingConfig},
};

use super::ObservabilityError;

/// Transport crates that log every frame at `info`.
const NOISY_TARGETS: [&str; 5] = ["h2", "hyper", "tower", "tonic", "opentelemetry"];

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.logging.log_format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
    };

    let otel_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(config.observability.otel_service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::new(filter_directives(&config.logging)))
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

fn filter_directives(logging: &LoggingConfig) -> String {
    let sqlx_level = if logging.log_sql { "debug" } else { "warn" };

    let mut directives = vec![logging.log_level.clone(), format!("sqlx={sqlx_level}")];

    directives.extend(NOISY_TARGETS.iter().map(|target| format!("{target}=warn")));

    directives.join(",")
}
