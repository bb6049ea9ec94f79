/*!
 * Monitoring
 * Structured tracing and frame telemetry
 */

mod telemetry;
mod tracer;

pub use telemetry::{fps_from_delta, FrameRateMeter};
pub use tracer::{
    generate_trace_id, init_tracing, init_tracing_from_env, span_app_operation, span_operation,
    OperationSpan,
};
