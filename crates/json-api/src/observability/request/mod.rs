//! Request-level logging, request IDs, and parent trace extraction.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, field, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::extensions::*;

use super::{metrics, settings};

/// Probe endpoints polled often enough to drown out real traffic.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/api/health"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let names = spans::request_span_name(&method, &path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        user_uuid = field::Empty,
        role = field::Empty,
        status = field::Empty,
        duration_ms = field::Empty
    );

    let tracing_settings = settings::request_tracing();

    if tracing_settings.propagate_parent_context
        && let Some(parent_context) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    // The auth hoop runs inside this one, so the caller is only known now.
    if let Some(identity) = depot.identity() {
        span.record("user_uuid", field::display(identity.user));
        span.record("role", field::display(identity.role));
    }

    let elapsed = started.elapsed();

    let completion = Completion {
        status: request_ids::response_status_or_ok(res.status_code),
        duration_ms: elapsed.as_millis(),
        threshold_ms: u128::from(tracing_settings.slow_request_threshold_ms),
    };

    metrics::observe_request(
        &method,
        &names.otel_path,
        completion.status.as_u16(),
        elapsed.as_secs_f64(),
    );

    completion.log(&span);
}

#[derive(Debug)]
struct Completion {
    status: StatusCode,
    duration_ms: u128,
    threshold_ms: u128,
}

impl Completion {
    fn log(&self, span: &Span) {
        let status = self.status.as_u16();
        let duration_ms = self.duration_ms;

        span.record("status", status);
        span.record("duration_ms", duration_ms);

        span.in_scope(|| {
            info!(status, duration_ms, "request.completed");

            if self.status.is_server_error() {
                error!(status, "server error response");
            } else if self.status.is_client_error() {
                warn!(status, "client error response");
            }

            if self.is_slow() {
                warn!(duration_ms, threshold_ms = self.threshold_ms, "slow request detected");
            }
        });
    }

    fn is_slow(&self) -> bool {
        self.duration_ms > self.threshold_ms
    }
}
