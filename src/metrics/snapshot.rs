use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregation dimension for convergence checks. Chosen once per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricScope {
    #[default]
    Port,
    Flow,
}

impl fmt::Display for MetricScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricScope::Port => write!(f, "port"),
            MetricScope::Flow => write!(f, "flow"),
        }
    }
}

/// Transmit/receive frame counters for one monitored port or flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterRecord {
    pub name: String,
    #[serde(default)]
    pub frames_tx: u64,
    #[serde(default)]
    pub frames_rx: u64,
}

/// One telemetry read from the controller. Produced fresh on every fetch and
/// never mutated afterwards; entities absent from the scope simply have no
/// record here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub records: Vec<CounterRecord>,
}

impl MetricsSnapshot {
    pub fn total_tx(&self) -> u64 {
        self.records.iter().map(|r| r.frames_tx).sum()
    }

    pub fn total_rx(&self) -> u64 {
        self.records.iter().map(|r| r.frames_rx).sum()
    }
}

/// Scope selector plus entity name filter for a metrics fetch. The requested
/// columns are always frames_tx and frames_rx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRequest {
    pub scope: MetricScope,
    pub names: Vec<String>,
}

impl MetricsRequest {
    pub fn new(scope: MetricScope, names: Vec<String>) -> Self {
        Self { scope, names }
    }
}
