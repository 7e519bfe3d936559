//! Serve command implementation
//!
//! Runs the HTTP API until SIGINT/SIGTERM, then drains in-flight requests
//! for at most `server.shutdown_timeout_secs`.

use crate::api::{build_router, AppState};
use crate::config::load_config;
use clap::Args;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the bind host
    #[arg(long, env = "CLINIC_SERVER_HOST")]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if !config.server.static_dir.is_dir() {
            tracing::warn!(
                static_dir = %config.server.static_dir.display(),
                "Static directory not found, only API routes will answer"
            );
        }
        if config.sqlserver.allow_raw_sql {
            tracing::warn!("Raw SQL execution is enabled");
        }

        let app = build_router(AppState::from_config(&config), &config.server.static_dir);
        let address = config.server.bind_address();
        let listener = match TcpListener::bind(&address).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Failed to bind");
                eprintln!("Failed to bind {address}: {e}");
                return Ok(5);
            }
        };

        tracing::info!(address = %address, environment = ?config.environment, "Server listening");
        println!("Server chạy tại http://{address}");

        let drain_signal = shutdown_signal.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(wait_for_shutdown(drain_signal))
                .await
        });

        tokio::select! {
            result = &mut server => return finish(result),
            () = wait_for_shutdown(shutdown_signal) => {}
        }

        let limit = Duration::from_secs(config.server.shutdown_timeout_secs);
        tracing::info!(timeout_secs = limit.as_secs(), "Draining in-flight requests");
        match tokio::time::timeout(limit, server).await {
            Ok(result) => finish(result),
            Err(_) => {
                tracing::warn!("Shutdown timeout reached, abandoning open requests");
                Ok(0)
            }
        }
    }
}

fn finish(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> anyhow::Result<i32> {
    match result {
        Ok(Ok(())) => {
            tracing::info!("Server stopped");
            Ok(0)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Server error");
            Ok(5)
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolves once the flag turns true; never if the sender goes away
async fn wait_for_shutdown(mut signal: watch::Receiver<bool>) {
    while !*signal.borrow_and_update() {
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
