pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod runner;
pub mod topology;

pub use client::{HttpClient, TrafficClient};
pub use config::{ConfigLoader, RunConfig};
pub use error::{Error, Result};
pub use metrics::predicate::counters_converged;
pub use metrics::snapshot::{CounterRecord, MetricScope, MetricsRequest, MetricsSnapshot};
pub use poller::{PollOutcome, Poller};
pub use runner::TestRunner;
pub use topology::Topology;
