use crate::error::{Error, Result};
use crate::metrics::snapshot::{CounterRecord, MetricScope, MetricsRequest, MetricsSnapshot};
use crate::topology::Topology;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

/// Seam to the traffic generator controller. One outstanding call at a time;
/// transport-level timeout and retry semantics live inside the
/// implementation, not in the callers.
#[async_trait]
pub trait TrafficClient: Send + Sync {
    /// Pushes the topology descriptor. An error means the controller refused
    /// the configuration; there is no retry.
    async fn apply_configuration(&self, topology: &Topology) -> Result<()>;

    /// Starts transmitting the previously applied flows.
    async fn start_transmit(&self) -> Result<()>;

    /// Reads fresh counters for the requested scope and entity names.
    async fn fetch_metrics(&self, request: &MetricsRequest) -> Result<MetricsSnapshot>;
}

/// Controller client over the OTG-style REST surface. Thin glue: JSON in,
/// JSON out, no auth, no transport retries.
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid api endpoint {endpoint}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::Config(format!("invalid api path {path}: {e}")))
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        Ok(self.http.post(url).json(&body).send().await?)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MetricsResponse {
    #[serde(default)]
    port_metrics: Vec<CounterRecord>,
    #[serde(default)]
    flow_metrics: Vec<CounterRecord>,
}

#[async_trait]
impl TrafficClient for HttpClient {
    async fn apply_configuration(&self, topology: &Topology) -> Result<()> {
        let response = self
            .post("config", wire_config(topology))
            .await
            .map_err(|e| Error::ConfigRejected(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ConfigRejected(format!("{status}: {body}")));
        }
        Ok(())
    }

    async fn start_transmit(&self) -> Result<()> {
        let body = json!({
            "choice": "traffic",
            "traffic": {
                "choice": "flow_transmit",
                "flow_transmit": { "state": "start" }
            }
        });
        let response = self
            .post("control/state", body)
            .await
            .map_err(|e| Error::TransmitStartFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TransmitStartFailed(format!("{status}: {body}")));
        }
        Ok(())
    }

    async fn fetch_metrics(&self, request: &MetricsRequest) -> Result<MetricsSnapshot> {
        let body = match request.scope {
            MetricScope::Port => json!({
                "choice": "port",
                "port": {
                    "port_names": request.names,
                    "column_names": ["frames_tx", "frames_rx"],
                }
            }),
            MetricScope::Flow => json!({
                "choice": "flow",
                "flow": { "flow_names": request.names }
            }),
        };
        let response = self
            .post("monitor/metrics", body)
            .await
            .map_err(|e| Error::MetricsFetchFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::MetricsFetchFailed(format!("{status}: {body}")));
        }
        let parsed: MetricsResponse = response
            .json()
            .await
            .map_err(|e| Error::MetricsFetchFailed(e.to_string()))?;
        let records = match request.scope {
            MetricScope::Port => parsed.port_metrics,
            MetricScope::Flow => parsed.flow_metrics,
        };
        Ok(MetricsSnapshot { records })
    }
}

/// Maps the wire-agnostic topology onto the controller's config document.
fn wire_config(topology: &Topology) -> Value {
    let ports: Vec<Value> = topology
        .ports
        .iter()
        .map(|p| json!({ "name": p.name, "location": p.location }))
        .collect();

    let flows: Vec<Value> = topology
        .flows
        .iter()
        .map(|f| {
            let mut packet = vec![
                json!({
                    "choice": "ethernet",
                    "ethernet": {
                        "src": { "choice": "value", "value": f.packet.ethernet.src },
                        "dst": { "choice": "value", "value": f.packet.ethernet.dst },
                    }
                }),
                json!({
                    "choice": "ipv4",
                    "ipv4": {
                        "src": { "choice": "value", "value": f.packet.ipv4.src },
                        "dst": { "choice": "value", "value": f.packet.ipv4.dst },
                    }
                }),
            ];
            if let Some(udp) = &f.packet.udp {
                packet.push(json!({
                    "choice": "udp",
                    "udp": {
                        "src_port": { "choice": "value", "value": udp.src_port },
                        "dst_port": { "choice": "value", "value": udp.dst_port },
                    }
                }));
            }
            json!({
                "name": f.name,
                "tx_rx": {
                    "choice": "port",
                    "port": { "tx_name": f.tx_port, "rx_names": [f.rx_port] }
                },
                "size": { "choice": "fixed", "fixed": f.size },
                "duration": {
                    "choice": "fixed_packets",
                    "fixed_packets": { "packets": f.packets }
                },
                "metrics": { "enable": f.metrics_enabled },
                "packet": packet,
            })
        })
        .collect();

    json!({ "ports": ports, "flows": flows })
}
