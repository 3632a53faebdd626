//! Gateway entry point: flag parsing, config assembly, startup.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use image_gateway::config::{loader, GatewayConfig};
use image_gateway::observability::{logging, metrics};
use image_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "image-gateway", version)]
#[command(about = "Admission gateway for an image-processing backend", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Flags are applied on top.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host to allow for the `url` query parameter
    /// (e.g. "d2dktr6aauwgqs.cloudfront.net"). Repeatable, or a
    /// comma-separated list.
    #[arg(long = "allow-hosts", value_name = "HOSTS")]
    allow_hosts: Vec<String>,

    /// Query parameter allowed to be sent upstream. Repeatable, or a
    /// comma-separated list. If empty, everything is allowed.
    #[arg(long = "allowed-params", value_name = "PARAMS")]
    allowed_params: Vec<String>,

    /// Action (first path segment) allowed upstream. Repeatable, or a
    /// comma-separated list. If empty, everything is allowed.
    #[arg(long = "allowed-actions", value_name = "ACTIONS")]
    allowed_actions: Vec<String>,

    /// Path prefix stripped from incoming requests, must begin with "/".
    #[arg(long = "strip-path", value_name = "PREFIX")]
    strip_path: Option<String>,

    /// Path answered directly with the status code, without touching the
    /// backend. Repeatable, or a comma-separated list.
    #[arg(long = "status-paths", value_name = "PATHS")]
    status_paths: Vec<String>,

    /// Status code served for status paths.
    #[arg(long = "status-code", value_name = "CODE")]
    status_code: Option<u16>,

    /// URL of the image-processing backend.
    #[arg(long = "backend-url", value_name = "URL")]
    backend_url: Option<String>,

    /// Port to listen on.
    #[arg(long = "listen-port", value_name = "PORT")]
    listen_port: Option<u16>,

    /// Rate limiter bucket fill rate (tokens/second).
    #[arg(long = "bucket-rate", value_name = "RATE")]
    bucket_rate: Option<f64>,

    /// Rate limiter bucket size (burst capacity).
    #[arg(long = "bucket-size", value_name = "SIZE")]
    bucket_size: Option<u64>,
}

/// Apply CLI flags on top of a (file- or default-sourced) configuration.
/// List flags append; scalar flags replace.
fn apply_cli(mut config: GatewayConfig, cli: &Cli) -> GatewayConfig {
    for occurrence in &cli.allow_hosts {
        config.policy.allowed_hosts.append(occurrence);
    }
    for occurrence in &cli.allowed_params {
        config.policy.allowed_params.append(occurrence);
    }
    for occurrence in &cli.allowed_actions {
        config.policy.allowed_actions.append(occurrence);
    }
    for occurrence in &cli.status_paths {
        config.policy.status_paths.append(occurrence);
    }
    if let Some(prefix) = &cli.strip_path {
        config.policy.strip_path = prefix.clone();
    }
    if let Some(code) = cli.status_code {
        config.policy.status_code = code;
    }
    if let Some(url) = &cli.backend_url {
        config.backend.url = url.clone();
    }
    if let Some(port) = cli.listen_port {
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }
    if let Some(rate) = cli.bucket_rate {
        config.rate_limit.fill_rate = rate;
    }
    if let Some(size) = cli.bucket_size {
        config.rate_limit.burst_size = size;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => GatewayConfig::default(),
    };
    let config = apply_cli(config, &cli);

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        allowed_hosts = %config.policy.allowed_hosts.pretty(),
        allowed_params = %config.policy.allowed_params.pretty(),
        allowed_actions = %config.policy.allowed_actions.pretty(),
        status_paths = %config.policy.status_paths.pretty(),
        backend = %config.backend.url,
        "Starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_append_and_override() {
        let cli = Cli::parse_from([
            "image-gateway",
            "--allow-hosts",
            "a.example.com,b.example.com",
            "--allow-hosts",
            "c.example.com",
            "--strip-path",
            "/static",
            "--listen-port",
            "8181",
            "--bucket-rate",
            "2.5",
        ]);

        let config = apply_cli(GatewayConfig::default(), &cli);
        assert_eq!(config.policy.allowed_hosts.len(), 3);
        assert_eq!(config.policy.strip_path, "/static");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8181");
        assert_eq!(config.rate_limit.fill_rate, 2.5);
        // Untouched values keep their defaults.
        assert_eq!(config.rate_limit.burst_size, 500);
    }
}
