use crate::metrics::snapshot::MetricScope;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Run-level settings. Every field has a hardcoded fallback so a run can
/// start from environment variables alone, with no config file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    /// Controller endpoint URL.
    #[serde(default = "default_api")]
    #[validate(length(min = 1))]
    pub api: String,

    /// Location of the first test port on the generator.
    #[serde(default = "default_p1_location")]
    #[validate(length(min = 1))]
    pub p1_location: String,

    /// Location of the second test port.
    #[serde(default = "default_p2_location")]
    #[validate(length(min = 1))]
    pub p2_location: String,

    /// Aggregation dimension to verify: port or flow counters.
    #[serde(default)]
    pub metric: MetricScope,

    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    #[serde(default = "default_interval_secs")]
    #[validate(range(min = 1))]
    pub interval_secs: u64,

    #[serde(default = "default_packets_per_flow")]
    #[validate(range(min = 1))]
    pub packets_per_flow: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            p1_location: default_p1_location(),
            p2_location: default_p2_location(),
            metric: MetricScope::default(),
            timeout_secs: default_timeout_secs(),
            interval_secs: default_interval_secs(),
            packets_per_flow: default_packets_per_flow(),
        }
    }
}

fn default_api() -> String {
    "https://10.61.37.199:8443".to_string()
}

fn default_p1_location() -> String {
    "//10.109.114.121/1/1".to_string()
}

fn default_p2_location() -> String {
    "//10.109.116.178/1/1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    2
}

fn default_packets_per_flow() -> u64 {
    1000
}
