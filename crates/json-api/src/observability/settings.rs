//! Request-tracing settings resolved once at startup.

use std::sync::OnceLock;

use tracing::debug;

use crate::config::observability::ObservabilityConfig;

static REQUEST_TRACING: OnceLock<RequestTracing> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RequestTracing {
    pub(super) slow_request_threshold_ms: u64,
    pub(super) propagate_parent_context: bool,
}

impl Default for RequestTracing {
    fn default() -> Self {
        Self {
            slow_request_threshold_ms: 1_000,
            propagate_parent_context: false,
        }
    }
}

impl From<&ObservabilityConfig> for RequestTracing {
    fn from(config: &ObservabilityConfig) -> Self {
        Self {
            slow_request_threshold_ms: config.slow_request_threshold_ms,
            // Incoming trace headers are meaningless without an exporter.
            propagate_parent_context: config.otel_enabled
                && config.otel_parent_propagation_enabled,
        }
    }
}

/// First call wins; later calls are ignored.
pub(super) fn install(config: &ObservabilityConfig) {
    if REQUEST_TRACING.set(RequestTracing::from(config)).is_err() {
        debug!("request tracing settings already installed");
    }
}

pub(super) fn request_tracing() -> RequestTracing {
    REQUEST_TRACING.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use crate::config::observability::ObservabilityConfig;

    use super::RequestTracing;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        observability: ObservabilityConfig,
    }

    fn parse(args: &[&str]) -> Result<ObservabilityConfig, clap::Error> {
        let mut argv = vec!["storefront-json"];
        argv.extend_from_slice(args);

        TestCli::try_parse_from(argv).map(|cli| cli.observability)
    }

    #[test]
    fn parent_propagation_requires_otel() -> TestResult {
        let config = parse(&["--otel-parent-propagation-enabled"])?;

        assert!(
            !RequestTracing::from(&config).propagate_parent_context,
            "expected propagation to stay off without an exporter"
        );

        Ok(())
    }

    #[test]
    fn parent_propagation_follows_flag_when_otel_enabled() -> TestResult {
        let config = parse(&[
            "--otel-enabled",
            "--otel-parent-propagation-enabled",
            "--slow-request-threshold-ms",
            "250",
        ])?;

        assert_eq!(
            RequestTracing::from(&config),
            RequestTracing {
                slow_request_threshold_ms: 250,
                propagate_parent_context: true,
            },
            "expected both settings to come from the config"
        );

        Ok(())
    }
}
