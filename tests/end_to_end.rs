use flowcheck::client::HttpClient;
use flowcheck::metrics::snapshot::MetricScope;
use flowcheck::poller::{PollOutcome, Poller};
use flowcheck::runner::TestRunner;
use flowcheck::topology::Topology;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_control_plane(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/control/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn run_passes_once_counters_converge() {
    let server = MockServer::start().await;
    mount_control_plane(&server).await;

    // two stale reads, then converged counters on the third fetch
    Mock::given(method("POST"))
        .and(path("/monitor/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "port_metrics": [
                { "name": "p1", "frames_tx": 900, "frames_rx": 700 },
                { "name": "p2", "frames_tx": 600, "frames_rx": 500 }
            ]
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/monitor/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "port_metrics": [
                { "name": "p1", "frames_tx": 1000, "frames_rx": 1000 },
                { "name": "p2", "frames_tx": 1000, "frames_rx": 1000 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let topology = Topology::back_to_back("//10.0.0.1/1/1", "//10.0.0.2/1/1", 1000);
    let client = HttpClient::new(&server.uri()).unwrap();
    let poller = Poller::new(Duration::from_secs(5), Duration::from_millis(10));
    let runner = TestRunner::new(client, poller);

    let outcome = runner.execute(&topology, MetricScope::Port).await.unwrap();
    assert_eq!(outcome, PollOutcome::Passed);
}

#[tokio::test]
async fn run_times_out_when_traffic_never_arrives() {
    let server = MockServer::start().await;
    mount_control_plane(&server).await;

    Mock::given(method("POST"))
        .and(path("/monitor/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flow_metrics": [
                { "name": "flow p1->p2", "frames_tx": 1000, "frames_rx": 0 },
                { "name": "flow p2->p1", "frames_tx": 1000, "frames_rx": 0 }
            ]
        })))
        .mount(&server)
        .await;

    let topology = Topology::back_to_back("//10.0.0.1/1/1", "//10.0.0.2/1/1", 1000);
    let client = HttpClient::new(&server.uri()).unwrap();
    let poller = Poller::new(Duration::from_millis(50), Duration::from_millis(10));
    let runner = TestRunner::new(client, poller);

    let outcome = runner.execute(&topology, MetricScope::Flow).await.unwrap();
    assert_eq!(outcome, PollOutcome::TimedOut);
}
