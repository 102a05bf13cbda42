//! # DEX State Server
//!
//! Serves the DEX state cache over line-delimited JSON on stdin/stdout.
//!
//! ## Overview
//!
//! This service:
//! - Loads settings from `Config.toml` (or `--config`) plus `DEX_STATE_*` overrides
//! - Loads and publishes a snapshot file at startup when one is configured
//! - Reloads that snapshot every `snapshot.reload_interval_seconds` (0 disables)
//! - Answers one request per line: `{"id", "method", "params"}` in,
//!   `{"id", "result"}` or `{"id", "error": {"status", "message"}}` out
//! - Stops on EOF or Ctrl+C
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dex_state_server -- --snapshot tests/fixtures/snapshot.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use dex_state_cache::{
    cache_state::StateStore,
    initializer,
    rpc::{messages::InitStateRequest, DexStateService},
    settings::Settings,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "dex_state_server", about = "Line-delimited JSON RPC server for the DEX state cache")]
struct Args {
    /// Settings file (defaults to Config.toml in the working directory)
    #[arg(long)]
    config: Option<String>,
    /// Snapshot file to publish at startup; overrides snapshot.path
    #[arg(long)]
    snapshot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct RpcErrorBody {
    status: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcErrorBody>,
}

fn handle_line(service: &DexStateService, line: &str) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return RpcResponse {
                id: Value::Null,
                result: None,
                error: Some(RpcErrorBody {
                    status: "INVALID_ARGUMENT",
                    message: format!("malformed request line: {}", e),
                }),
            }
        }
    };

    match service.dispatch(&request.method, request.params) {
        Ok(result) => RpcResponse {
            id: request.id,
            result: Some(result),
            error: None,
        },
        Err(e) => RpcResponse {
            id: request.id,
            result: None,
            error: Some(RpcErrorBody {
                status: e.status().as_str(),
                message: e.to_string(),
            }),
        },
    }
}

async fn publish_snapshot(service: &DexStateService, path: &str) -> Result<()> {
    let snapshot = initializer::load_snapshot_file(path).await?;
    let response = service
        .init_state(InitStateRequest { snapshot })
        .with_context(|| format!("initializing state from {}", path))?;
    info!(
        path,
        generation = response.generation,
        pairs = response.counts.pairs,
        tokens = response.counts.tokens,
        "snapshot published"
    );
    Ok(())
}

#[cfg(feature = "observability")]
fn init_observability(settings: &Settings) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr);
    if settings.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let addr: SocketAddr = settings
        .metrics
        .prometheus_listen_addr
        .parse()
        .context("parsing metrics.prometheus_listen_addr")?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus exporter")?;
    dex_state_cache::metrics::describe_metrics();
    dex_state_cache::metrics::set_up();
    info!(%addr, "prometheus exporter listening");
    Ok(())
}

#[cfg(not(feature = "observability"))]
fn init_observability(_settings: &Settings) -> Result<()> {
    env_logger::init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new()?,
    };
    init_observability(&settings)?;
    info!("starting dex state server");

    let store = Arc::new(StateStore::new());
    let service = DexStateService::new(store, settings.compute);

    let snapshot_path = args.snapshot.or_else(|| settings.snapshot.path.clone());
    match &snapshot_path {
        Some(path) => publish_snapshot(&service, path).await?,
        None => warn!("no snapshot configured; waiting for InitState"),
    }

    let reload_seconds = settings.snapshot.reload_interval_seconds;
    if let (Some(path), true) = (snapshot_path.clone(), reload_seconds > 0) {
        let reload_service = service.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(reload_seconds));
            // the first tick fires immediately; startup already published
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = publish_snapshot(&reload_service, &path).await {
                    let reason = format!("{:#}", e);
                    error!(error = %reason, "snapshot reload failed; keeping current generation");
                }
            }
        });
        info!(reload_seconds, "periodic snapshot reload enabled");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_line(&service, &line);
                let mut encoded = serde_json::to_vec(&response)?;
                encoded.push(b'\n');
                stdout.write_all(&encoded).await?;
                stdout.flush().await?;
            }
            _ = &mut shutdown => {
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_state_cache::settings::ComputeSettings;

    #[test]
    fn test_handle_line_echoes_id_and_status() {
        let service = DexStateService::new(Arc::new(StateStore::new()), ComputeSettings::default());

        let response = handle_line(&service, r#"{"id": 7, "method": "GetPairsCount"}"#);
        assert_eq!(response.id, 7);
        assert_eq!(response.error.unwrap().status, "UNAVAILABLE");

        let response = handle_line(&service, "{not json");
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().status, "INVALID_ARGUMENT");
    }
}
