//! OTLP trace export.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    config: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(
            config.otel_exporter_otlp_timeout_seconds,
        ))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(config.otel_trace_sample_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(service_resource(config))
        .with_batch_exporter(exporter)
        .build())
}

fn service_resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(config.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", config.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                config.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

/// Root spans follow the configured ratio; child spans follow their parent.
fn sampler(ratio: f64) -> Sampler {
    let root = if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else {
        Sampler::TraceIdRatioBased(ratio)
    };

    Sampler::ParentBased(Box::new(root))
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::trace::Sampler;

    use super::sampler;

    fn root_of(parent_based: Sampler) -> Option<Sampler> {
        match parent_based {
            Sampler::ParentBased(root) => Some(*root),
            _ => None,
        }
    }

    #[test]
    fn boundary_ratios_avoid_the_ratio_sampler() {
        assert!(
            matches!(root_of(sampler(0.0)), Some(Sampler::AlwaysOff)),
            "expected a zero ratio to drop root spans"
        );
        assert!(
            matches!(root_of(sampler(1.0)), Some(Sampler::AlwaysOn)),
            "expected a full ratio to keep root spans"
        );
    }

    #[test]
    fn fractional_ratio_samples_by_trace_id() {
        assert!(
            matches!(root_of(sampler(0.25)), Some(Sampler::TraceIdRatioBased(_))),
            "expected a fractional ratio to sample by trace id"
        );
    }
}
