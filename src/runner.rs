use crate::client::TrafficClient;
use crate::error::Result;
use crate::metrics::predicate::counters_converged;
use crate::metrics::snapshot::{MetricScope, MetricsRequest};
use crate::poller::{PollOutcome, Poller};
use crate::topology::Topology;

/// Run progression. Configuration and transmit failures are terminal, so the
/// only states that outlive `execute` are the poll outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Configured,
    Pushed,
    Transmitting,
}

/// Sequences one end-to-end run: push config, start transmit, poll counters
/// for the selected scope until they converge on the expected total.
pub struct TestRunner<C: TrafficClient> {
    client: C,
    poller: Poller,
}

impl<C: TrafficClient> TestRunner<C> {
    pub fn new(client: C, poller: Poller) -> Self {
        Self { client, poller }
    }

    pub async fn execute(&self, topology: &Topology, scope: MetricScope) -> Result<PollOutcome> {
        topology.validate()?;
        let expected = topology.expected_total();
        let mut phase = RunPhase::Configured;
        log::debug!("run phase: {:?}", phase);

        self.client.apply_configuration(topology).await?;
        phase = RunPhase::Pushed;
        log::debug!("run phase: {:?}", phase);

        self.client.start_transmit().await?;
        phase = RunPhase::Transmitting;
        log::debug!("run phase: {:?}", phase);

        let request = MetricsRequest::new(
            scope,
            match scope {
                MetricScope::Port => topology.port_names(),
                MetricScope::Flow => topology.flow_names(),
            },
        );
        log::info!("expected total frames: {}", expected);

        let client = &self.client;
        let request = &request;
        let outcome = self
            .poller
            .wait_for(move || async move {
                let snapshot = client.fetch_metrics(request).await?;
                Ok(counters_converged(&snapshot, expected))
            })
            .await?;

        match outcome {
            PollOutcome::Passed => log::info!("--- PASS: {} counters converged", scope),
            PollOutcome::TimedOut => log::error!("--- FAILED: {} counters never converged", scope),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::metrics::snapshot::{CounterRecord, MetricsSnapshot};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Scripted controller double: a queue of canned metrics responses, with
    /// call counters for every operation.
    struct ScriptedClient {
        reject_config: bool,
        fail_start: bool,
        responses: Mutex<Vec<Result<MetricsSnapshot>>>,
        apply_calls: AtomicU32,
        start_calls: AtomicU32,
        fetch_calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<MetricsSnapshot>>) -> Self {
            Self {
                reject_config: false,
                fail_start: false,
                responses: Mutex::new(responses),
                apply_calls: AtomicU32::new(0),
                start_calls: AtomicU32::new(0),
                fetch_calls: AtomicU32::new(0),
            }
        }

        fn rejecting() -> Self {
            let mut client = Self::new(vec![]);
            client.reject_config = true;
            client
        }

        fn failing_start() -> Self {
            let mut client = Self::new(vec![]);
            client.fail_start = true;
            client
        }
    }

    #[async_trait]
    impl<'a> TrafficClient for &'a ScriptedClient {
        async fn apply_configuration(&self, _topology: &Topology) -> Result<()> {
            self.apply_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_config {
                return Err(Error::ConfigRejected("unsupported header".into()));
            }
            Ok(())
        }

        async fn start_transmit(&self) -> Result<()> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(Error::TransmitStartFailed("flows not configured".into()));
            }
            Ok(())
        }

        async fn fetch_metrics(&self, _request: &MetricsRequest) -> Result<MetricsSnapshot> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                // keep reporting "still in flight" once the script runs out
                return Ok(counters(&[("p1", 1500, 1500), ("p2", 400, 400)]));
            }
            responses.remove(0)
        }
    }

    fn counters(records: &[(&str, u64, u64)]) -> MetricsSnapshot {
        MetricsSnapshot {
            records: records
                .iter()
                .map(|(name, tx, rx)| CounterRecord {
                    name: name.to_string(),
                    frames_tx: *tx,
                    frames_rx: *rx,
                })
                .collect(),
        }
    }

    fn topology() -> Topology {
        Topology::back_to_back("//a/1/1", "//b/1/1", 1000)
    }

    #[tokio::test(start_paused = true)]
    async fn passes_once_port_counters_match_expected() {
        let client = ScriptedClient::new(vec![
            Ok(counters(&[("p1", 500, 300), ("p2", 400, 200)])),
            Ok(counters(&[("p1", 1000, 900), ("p2", 1000, 900)])),
            Ok(counters(&[("p1", 1000, 1000), ("p2", 1000, 1000)])),
        ]);
        let runner = TestRunner::new(&client, Poller::default());

        let outcome = runner
            .execute(&topology(), MetricScope::Port)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Passed);
        assert_eq!(client.apply_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_flow_counters_never_converge() {
        let client = ScriptedClient::new(vec![]);
        let poller = Poller::new(Duration::from_secs(6), Duration::from_secs(2));
        let runner = TestRunner::new(&client, poller);

        let outcome = runner
            .execute(&topology(), MetricScope::Flow)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        // probes at t=0,2,4,6
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_config_stops_the_run_before_transmit() {
        let client = ScriptedClient::rejecting();
        let runner = TestRunner::new(&client, Poller::default());

        let err = runner
            .execute(&topology(), MetricScope::Port)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ConfigRejected(_)));
        assert_eq!(client.apply_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.start_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_transmit_start_stops_the_run_before_polling() {
        let client = ScriptedClient::failing_start();
        let runner = TestRunner::new(&client, Poller::default());

        let err = runner
            .execute(&topology(), MetricScope::Port)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TransmitStartFailed(_)));
        assert_eq!(client.apply_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_surfaces_instead_of_timing_out() {
        let client = ScriptedClient::new(vec![
            Ok(counters(&[("p1", 500, 500)])),
            Err(Error::MetricsFetchFailed("controller unreachable".into())),
        ]);
        let runner = TestRunner::new(&client, Poller::default());

        let err = runner
            .execute(&topology(), MetricScope::Port)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MetricsFetchFailed(_)));
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_topology_never_reaches_the_controller() {
        let client = ScriptedClient::new(vec![]);
        let runner = TestRunner::new(&client, Poller::default());
        let mut topo = topology();
        topo.flows[0].tx_port = "p9".into();

        let err = runner.execute(&topo, MetricScope::Port).await.unwrap_err();

        assert!(matches!(err, Error::Topology(_)));
        assert_eq!(client.apply_calls.load(Ordering::SeqCst), 0);
    }
}
