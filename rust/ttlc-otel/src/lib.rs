// rust/ttlc-otel/src/lib.rs
// Telemetry for the compilation pipeline
// Per-phase cycle counts and tick-budget accounting; never gates
// functional behavior

mod cycle;
mod phase;
mod tracer;

pub use cycle::{cycles_to_ticks, read_cycles, read_cycles_precise};
pub use phase::{PhaseMetrics, PhaseTimer, PipelineMetrics};
pub use tracer::{Attributes, Metric, MetricValue, Span, SpanStatus, Tracer};
