//! Parent trace context extraction from HTTP headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

/// Upstream trace context carried by the request, if any.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| extract_with(propagator, headers))
}

fn extract_with(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    // Fresh base context: a request without trace headers must not join
    // whatever span happens to be active in this task.
    let context = propagator.extract_with_context(&Context::new(), &Headers(headers));

    let is_valid = context.span().span_context().is_valid();

    is_valid.then_some(context)
}

#[derive(Debug)]
struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::HeaderValue;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn valid_traceparent_becomes_the_parent() {
        let mut headers = HeaderMap::new();

        headers.insert("traceparent", HeaderValue::from_static(TRACEPARENT));

        let context = extract_with(&TraceContextPropagator::new(), &headers);

        let trace_id = context.map(|context| context.span().span_context().trace_id().to_string());

        assert_eq!(trace_id.as_deref(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
    }

    #[test]
    fn missing_or_garbled_headers_start_a_new_trace() {
        let propagator = TraceContextPropagator::new();
        let mut headers = HeaderMap::new();

        assert!(extract_with(&propagator, &headers).is_none(), "expected no parent");

        headers.insert("traceparent", HeaderValue::from_static("not-a-trace"));

        assert!(extract_with(&propagator, &headers).is_none(), "expected no parent");
    }
}
