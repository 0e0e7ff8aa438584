use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use signalbus::config::{load_config, AppConfig};
use signalbus::kernel::event::{LogEvent, LogLevel};
use signalbus::kernel::telemetry::metrics::{Metric, NumberDataPoint, ResourceMetrics};
use signalbus::kernel::telemetry::{MetricCollector, MetricProvider};
use signalbus::{Bus, Pulled, Registry};

#[derive(Parser, Debug)]
#[command(author, version, about = "Metrics scatter-gather over an in-process signal bus")]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many flushed rounds (overrides `demo.rounds`)
    #[arg(long)]
    rounds: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("failed to load {path:?}"))?,
        None => AppConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.demo.rounds = rounds;
    }

    let registry = Arc::new(Registry::standard().context("building event registry")?);
    let bus = Bus::new(registry);

    // Every loop subscribes before anything is emitted.
    let mut collector = MetricCollector::new(&bus, config.collector.clone()).on_flush({
        let bus = bus.clone();
        let limit = config.demo.rounds;
        let mut flushed = 0u64;
        move |data| {
            println!("{}", data.to_value());
            flushed += 1;
            if limit > 0 && flushed >= limit {
                bus.terminate();
            }
        }
    });

    let log_echo = tokio::spawn(echo_logs(bus.subscribe()));

    let mut providers = Vec::with_capacity(config.demo.publishers.len());
    for service in &config.demo.publishers {
        let publisher_id = format!("{service}-{}", Uuid::new_v4());
        let provider = MetricProvider::new(&bus, publisher_id, demo_source(service.clone()));
        providers.push(tokio::spawn(provider.run()));
    }

    tokio::spawn({
        let bus = bus.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                bus.log(LogLevel::Warning, "interrupted; shutting down");
                bus.terminate();
            }
        }
    });

    bus.log(
        LogLevel::Info,
        format!("collecting from {} publishers", config.demo.publishers.len()),
    );
    collector.run().await.context("metric collector failed")?;

    for provider in providers {
        if let Err(e) = provider.await? {
            warn!(error = %e, kind = e.as_label(), "metric provider exited with error");
        }
    }
    log_echo.await?;

    let stats = collector.stats();
    info!(
        rounds = stats.rounds,
        timed_out = stats.timed_out,
        samples = stats.total_samples,
        avg_response_ratio = stats.avg_response_ratio,
        "shutdown complete"
    );
    Ok(())
}

/// One gauge per service carrying the request id, stamped with the collection time.
fn demo_source(service: String) -> impl FnMut(u64, u64) -> Option<Vec<serde_json::Value>> + Send {
    move |request_id, collection_time_unix_nano| {
        let metric = Metric::gauge(
            "demo.request_id",
            "1",
            vec![NumberDataPoint::int(collection_time_unix_nano, request_id as i64)],
        );
        match ResourceMetrics::for_service(&service, "signalbus.demo", vec![metric]).into_sample() {
            Ok(sample) => Some(vec![sample]),
            Err(e) => {
                error!(%service, error = %e, "failed to encode sample");
                None
            }
        }
    }
}

/// Mirrors `log` signals onto the tracing subscriber until shutdown.
async fn echo_logs(mut puller: signalbus::EventPuller) {
    loop {
        match puller.pull_as::<LogEvent>().await {
            Ok(Pulled::Matched(log)) => match log.level {
                LogLevel::Debug => debug!(target: "signal", "{}", log.message),
                LogLevel::Info => info!(target: "signal", "{}", log.message),
                LogLevel::Warning => warn!(target: "signal", "{}", log.message),
                LogLevel::Error => error!(target: "signal", "{}", log.message),
            },
            Ok(Pulled::Other(event)) if event.is_terminate() => break,
            Ok(Pulled::Other(_)) => {}
            Err(e) => {
                warn!(error = %e, "log echo stopped");
                break;
            }
        }
    }
}
