use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal for a run; the variants exist so the operator
/// can tell "controller rejected config" from "traffic never arrived" from
/// "the metrics endpoint broke mid-poll".
#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("topology error: {0}")]
    Topology(String),

    #[error("controller rejected configuration: {0}")]
    ConfigRejected(String),

    #[error("failed to start transmit: {0}")]
    TransmitStartFailed(String),

    #[error("metrics fetch failed: {0}")]
    MetricsFetchFailed(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
