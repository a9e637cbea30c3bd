pub mod predicate;
pub mod snapshot;

pub use predicate::counters_converged;
pub use snapshot::{CounterRecord, MetricScope, MetricsRequest, MetricsSnapshot};
