//! airwatch: air-quality dashboard backend.
//!
//! Single-binary Tokio application that:
//! 1. Produces per-city readings through a cache-first retrieval chain
//! 2. Runs a periodic anomaly-detection pass over each batch
//! 3. Refreshes LLM insights when an API key is configured
//! 4. Serves the dashboard HTTP API

mod config;
mod error;
mod routes;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::time::sleep;
use tracing::{error, info, warn};

use state::AppState;

/// Air-quality dashboard backend
#[derive(Parser)]
#[command(name = "airwatch", about = "Air-quality dashboard backend")]
struct Cli {
    /// Run a single batch refresh and evaluation, print a summary, exit.
    #[arg(long)]
    dry_run: bool,

    /// Override the configured HTTP port.
    #[arg(long)]
    port: Option<u16>,
}

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airwatch=info,analytics=info,aqi_feed=info,cache_store=info,deepseek_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("🌫️  airwatch starting up...");

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    info!("Monitoring {} registered cities", aqi_feed::registry::profiles().len());
    info!(
        "Timing: refresh={}s insights={}s cache_ttl={}s fan_out={}x{}ms",
        cfg.timing.refresh_interval_secs,
        cfg.timing.insight_interval_secs,
        cfg.timing.cache_ttl_secs,
        cfg.timing.batch_width,
        cfg.timing.batch_delay_ms,
    );
    info!(
        "AI endpoints: {}",
        if cfg.deepseek_api_key.trim().is_empty() {
            "degraded (no DEEPSEEK_API_KEY)"
        } else {
            "enabled"
        }
    );

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let state = match AppState::new(cfg).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize state: {}", e);
            std::process::exit(1);
        }
    };

    // ── Dry-run mode ─────────────────────────────────────────────────
    if cli.dry_run {
        info!("Running single batch refresh (dry-run)...");
        run_batch_refresh(&state).await;

        let snapshot = state.snapshot.read().await;
        match analytics::aggregator::summarize(&snapshot) {
            Ok(summary) => info!(
                "Summary: avg_aqi={} alerts={} best={} worst={} countries={}",
                summary.average_aqi,
                summary.cities_with_alerts,
                summary.best_city,
                summary.worst_city,
                summary.country_diversity,
            ),
            Err(e) => warn!("No summary: {}", e),
        }
        let anomaly_count = state.anomalies.lock().await.len();
        info!(
            "Dry run complete: {} readings, {} anomaly insights",
            snapshot.len(),
            anomaly_count
        );
        return;
    }

    // ── Spawn tasks ──────────────────────────────────────────────────
    info!("Spawning tasks...");

    // Background loops stop by checking this flag at the top of each
    // iteration; in-flight requests are never forcibly aborted.
    let shutdown = Arc::new(AtomicBool::new(false));

    // Task 1: Batch refresh
    let refresh_state = state.clone();
    let refresh_shutdown = shutdown.clone();
    let refresh_handle = tokio::spawn(async move {
        loop {
            if refresh_shutdown.load(Ordering::Relaxed) {
                break;
            }
            run_batch_refresh(&refresh_state).await;
            sleep(Duration::from_secs(
                refresh_state.config.timing.refresh_interval_secs,
            ))
            .await;
        }
    });

    // Task 2: LLM insight refresh
    let insight_state = state.clone();
    let insight_shutdown = shutdown.clone();
    let insight_handle = tokio::spawn(async move {
        // Wait for the first batch to land.
        sleep(Duration::from_secs(10)).await;
        loop {
            if insight_shutdown.load(Ordering::Relaxed) {
                break;
            }
            run_insight_refresh(&insight_state).await;
            sleep(Duration::from_secs(
                insight_state.config.timing.insight_interval_secs,
            ))
            .await;
        }
    });

    // Task 3: Heartbeat
    let hb_state = state.clone();
    let heartbeat_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let snapshot_len = hb_state.snapshot.read().await.len();
            let anomaly_count = hb_state.anomalies.lock().await.len();
            let cached_rows = hb_state.store.row_count().await.unwrap_or(-1);
            info!(
                "HEARTBEAT: readings={} memory_cache={} anomalies={} db_rows={}",
                snapshot_len,
                hb_state.chain.memory_len(),
                anomaly_count,
                cached_rows,
            );
        }
    });

    // Task 4: HTTP server
    let app = routes::router(state.clone());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("🚀 airwatch listening on {}. Press Ctrl+C to stop.", addr);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    // ── Wait for shutdown ────────────────────────────────────────────
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = refresh_handle => {
            error!("Refresh task exited: {:?}", r);
        }
        r = insight_handle => {
            error!("Insight task exited: {:?}", r);
        }
        r = heartbeat_handle => {
            error!("Heartbeat task exited: {:?}", r);
        }
        r = server_handle => {
            error!("HTTP server task exited: {:?}", r);
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    info!("airwatch shut down.");
}

// ── Task implementations ────────────────────────────────────────────

/// Fetch every registered city through the retrieval chain, fan-out in
/// fixed-width chunks with a delay between chunks, then run one
/// anomaly-detection pass and publish the batch snapshot.
async fn run_batch_refresh(state: &Arc<AppState>) {
    let timing = &state.config.timing;
    let names: Vec<&str> = aqi_feed::registry::profiles()
        .iter()
        .map(|p| p.name)
        .collect();

    let mut readings = Vec::with_capacity(names.len());
    let mut chunks = names.chunks(timing.batch_width.max(1)).peekable();
    while let Some(chunk) = chunks.next() {
        let results =
            futures::future::join_all(chunk.iter().map(|name| state.chain.get(name))).await;
        for (name, result) in chunk.iter().zip(results) {
            match result {
                Ok(reading) => readings.push(reading),
                Err(e) => warn!("Failed to fetch reading for {}: {}", name, e),
            }
        }
        if chunks.peek().is_some() {
            sleep(Duration::from_millis(timing.batch_delay_ms)).await;
        }
    }

    let insights = analytics::detect(&readings);
    if !insights.is_empty() {
        info!("Detected {} anomaly insight(s) this pass", insights.len());
    }
    state.anomalies.lock().await.extend(insights);

    info!("Batch refresh complete: {} readings", readings.len());
    *state.snapshot.write().await = readings;
}

/// Refresh the LLM insight lines. A missing key or empty snapshot is a
/// quiet no-op; upstream failures keep the previous lines.
async fn run_insight_refresh(state: &Arc<AppState>) {
    let Some(llm) = state.llm.as_ref() else {
        return;
    };

    let snapshot = state.snapshot.read().await.clone();
    if snapshot.is_empty() {
        return;
    }

    let context = routes::build_data_context(&snapshot);
    match llm.generate_insights(&context).await {
        Ok(insights) => {
            info!("Refreshed {} LLM insight line(s)", insights.len());
            *state.llm_insights.write().await = insights;
        }
        Err(e) => {
            warn!("LLM insight refresh failed, keeping previous: {}", e);
        }
    }
}
