/*!
 * Structured Tracing
 * Subscriber setup and timed operation spans for sandbox lifecycle work
 */

use crate::core::config::ENV_TRACE_JSON;
use crate::core::limits::SLOW_OPERATION_THRESHOLD;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Install the global subscriber
///
/// `RUST_LOG` selects the filter (default `info`). `log` records from the
/// subsystems are bridged into the same subscriber. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    match installed {
        Ok(()) => info!(json, "Structured tracing initialized"),
        Err(e) => debug!("Tracing subscriber already installed: {}", e),
    }
}

/// Install the subscriber, reading JSON mode from `SANDBOX_TRACE_JSON`
pub fn init_tracing_from_env() {
    let json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    init_tracing(json);
}

/// Generate a unique trace ID for correlating one operation's events
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Timed span around one sandbox operation
///
/// Logs its duration on drop and warns when the operation was slow.
pub struct OperationSpan {
    span: Span,
    start: Instant,
    trace_id: String,
}

impl OperationSpan {
    pub fn new(operation: &str, app: Option<&str>) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "operation",
            trace_id = %trace_id,
            operation = operation,
            app = app.unwrap_or("-"),
            duration_us = tracing::field::Empty,
            items = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record how many items the operation touched
    pub fn record_items(&self, count: usize) {
        self.span.record("items", count);
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_OPERATION_THRESHOLD {
            warn!(
                trace_id = %self.trace_id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow operation detected"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                duration_us = duration.as_micros() as u64,
                "operation completed"
            );
        }
    }
}

/// Span for a host-wide operation
pub fn span_operation(name: &str) -> OperationSpan {
    OperationSpan::new(name, None)
}

/// Span for an operation on one application
pub fn span_app_operation(name: &str, app: &str) -> OperationSpan {
    OperationSpan::new(name, Some(app))
}
