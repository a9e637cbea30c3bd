use clap::{Parser, Subcommand};
use flowcheck::config::ConfigLoader;
use flowcheck::metrics::snapshot::MetricScope;
use flowcheck::poller::{PollOutcome, Poller};
use flowcheck::runner::TestRunner;
use flowcheck::topology::Topology;
use flowcheck::{Error, HttpClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flowcheck")]
#[command(version = "0.1.0")]
#[command(about = "Drive OTG traffic flows and verify counter convergence", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a traffic test against the controller
    Run {
        /// Path to a run configuration file (JSON/YAML/TOML); env vars and
        /// defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Metrics to monitor, overriding the config file: port | flow
        #[arg(short, long)]
        metric: Option<MetricScope>,

        /// Show a progress spinner (stderr)
        #[arg(short, long, default_value_t = true)]
        progress: bool,
    },
    /// Validate a run configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = Arc::new(indicatif::MultiProgress::new());

    match cli.command {
        Commands::Run {
            config,
            metric,
            progress,
        } => {
            if progress {
                let multi_clone = multi.clone();
                indicatif_log_bridge::LogWrapper::new((*multi_clone).clone(), logger)
                    .try_init()
                    .unwrap();
            } else {
                log::set_boxed_logger(Box::new(logger)).unwrap();
                log::set_max_level(log::LevelFilter::Info);
            }

            let run_config = match &config {
                Some(path) => {
                    log::info!("Loading config from {:?}", path);
                    ConfigLoader::load(path)?
                }
                None => ConfigLoader::from_env()?,
            };
            let scope = metric.unwrap_or(run_config.metric);

            log::info!("API = {}", run_config.api);
            log::info!("P1 = {}", run_config.p1_location);
            log::info!("P2 = {}", run_config.p2_location);
            log::info!("scope = {}", scope);

            let topology = Topology::back_to_back(
                &run_config.p1_location,
                &run_config.p2_location,
                run_config.packets_per_flow,
            );
            let client = HttpClient::new(&run_config.api)?;
            let poller = Poller::new(
                Duration::from_secs(run_config.timeout_secs),
                Duration::from_secs(run_config.interval_secs),
            );
            let runner = TestRunner::new(client, poller);

            let mut spinner: Option<ProgressBar> = None;
            if progress {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?);
                pb.set_message(format!(
                    "Waiting for {} counters to reach {}...",
                    scope,
                    topology.expected_total()
                ));
                pb.enable_steady_tick(Duration::from_millis(100));
                spinner = Some(pb);
            }

            let result = runner.execute(&topology, scope).await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match result {
                Ok(PollOutcome::Passed) => {
                    println!("✅ Test {} passed:", scope);
                    println!("   Expected Frames: {}", topology.expected_total());
                    println!("   Flows: {}", topology.flows.len());
                }
                Ok(PollOutcome::TimedOut) => {
                    eprintln!(
                        "❌ Test {} failed: counters never reached {} within {}s",
                        scope,
                        topology.expected_total(),
                        run_config.timeout_secs
                    );
                    std::process::exit(1);
                }
                Err(e @ Error::ConfigRejected(_)) => {
                    eprintln!("❌ Controller rejected the configuration: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Test run failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { config } => match ConfigLoader::load(&config) {
            Ok(cfg) => {
                println!("✅ Config is valid:");
                println!("   API: {}", cfg.api);
                println!("   P1: {}", cfg.p1_location);
                println!("   P2: {}", cfg.p2_location);
                println!("   Metric: {}", cfg.metric);
                println!("   Timeout: {}s / Interval: {}s", cfg.timeout_secs, cfg.interval_secs);
            }
            Err(e) => {
                eprintln!("❌ Config error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
