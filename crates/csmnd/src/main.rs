// # csmnd - CSMN Configuration Daemon
//
// Thin integration layer: all configuration semantics live in csmn-core.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the key-value store through the store registry
// 4. Serving the HTTP API until SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Server
// - `CSMN_BIND_ADDR`: Listen address (default `127.0.0.1:5000`)
// - `CSMN_SHUTDOWN_TIMEOUT_SECS`: Drain time after a shutdown signal (default 30)
//
// ### Store
// - `CSMN_STORE_TYPE`: `redis` (default), `file` or `memory`
// - `CSMN_REDIS_URL`: Redis URL (default `redis://127.0.0.1:6379/0`)
// - `CSMN_STORE_PATH`: Path to the store file (for file store)
//
// ### Fallback
// - `CSMN_FALLBACK_VIDEO_URL`: Video served while no URL or mirror is set
//
// ### Logging
// - `CSMN_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export CSMN_STORE_TYPE=redis
// export CSMN_REDIS_URL=redis://127.0.0.1:6379/0
// export CSMN_BIND_ADDR=0.0.0.0:5000
//
// csmnd
// ```

mod routes;

use anyhow::Result;
use csmn_core::{
    ConfigService, ConfigStore, FallbackConfig, FallbackTable, ServerConfig, ServiceConfig,
    StoreConfig, StoreRegistry,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum CsmnExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<CsmnExitCode> for ExitCode {
    fn from(code: CsmnExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    service: ServiceConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let store_type = env::var("CSMN_STORE_TYPE").unwrap_or_else(|_| "redis".to_string());
        let store = match store_type.as_str() {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File {
                path: env::var("CSMN_STORE_PATH").map_err(|_| {
                    anyhow::anyhow!(
                        "CSMN_STORE_PATH is required when CSMN_STORE_TYPE=file. \
                        Set it via: export CSMN_STORE_PATH=/var/lib/csmn/store.json"
                    )
                })?,
            },
            "redis" => StoreConfig::Redis {
                url: env::var("CSMN_REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            },
            other => anyhow::bail!(
                "CSMN_STORE_TYPE '{}' is not supported. \
                Supported types: redis, file, memory",
                other
            ),
        };

        let mut server = ServerConfig::default();
        if let Ok(addr) = env::var("CSMN_BIND_ADDR") {
            server.bind_addr = addr;
        }
        if let Ok(secs) = env::var("CSMN_SHUTDOWN_TIMEOUT_SECS") {
            server.shutdown_timeout_secs = secs.parse().map_err(|_| {
                anyhow::anyhow!("CSMN_SHUTDOWN_TIMEOUT_SECS must be a number. Got: {}", secs)
            })?;
        }

        let mut fallback = FallbackConfig::default();
        if let Ok(url) = env::var("CSMN_FALLBACK_VIDEO_URL") {
            fallback.video_url = url;
        }

        Ok(Self {
            service: ServiceConfig {
                server,
                store,
                fallback,
            },
            log_level: env::var("CSMN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.service.validate()?;

        if !(1..=300).contains(&self.service.server.shutdown_timeout_secs) {
            anyhow::bail!(
                "CSMN_SHUTDOWN_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.service.server.shutdown_timeout_secs
            );
        }

        let fallback_url = &self.service.fallback.video_url;
        if !fallback_url.starts_with("https://") && !fallback_url.starts_with("http://") {
            anyhow::bail!(
                "CSMN_FALLBACK_VIDEO_URL must use HTTP or HTTPS scheme. Got: {}",
                fallback_url
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CSMN_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CsmnExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CsmnExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CsmnExitCode::ConfigError.into();
    }

    info!("Starting csmnd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CsmnExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let state = match build_state(&config.service).await {
            Ok(state) => state,
            Err(e) => {
                error!("Startup error: {}", e);
                return CsmnExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(&config.service.server, state).await {
            error!("Daemon error: {}", e);
            CsmnExitCode::RuntimeError
        } else {
            CsmnExitCode::CleanShutdown
        }
    })
    .into()
}

/// Build the store from configuration and wire the service around it
async fn build_state(config: &ServiceConfig) -> Result<routes::AppState> {
    let registry = StoreRegistry::with_builtin();

    #[cfg(feature = "redis")]
    {
        info!("Registering Redis store");
        csmn_store_redis::register(&registry);
    }

    info!("Store type: {}", config.store.type_name());
    let kv = registry.create_store(&config.store).await?;

    let fallback = FallbackTable::from_config(&config.fallback);
    let store = ConfigStore::new(kv, fallback);

    Ok(routes::AppState {
        service: ConfigService::new(Arc::new(store)),
    })
}

/// Serve until a shutdown signal, then drain within the grace period
async fn run_daemon(server: &ServerConfig, state: routes::AppState) -> Result<()> {
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;
    info!("Listening on {}", server.bind_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let serve = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    let mut server_task = tokio::spawn(async move { serve.await });

    let received = tokio::select! {
        received = wait_for_shutdown_signal() => received?,
        result = &mut server_task => {
            result??;
            anyhow::bail!("Server stopped without a shutdown signal");
        }
    };

    info!("Received shutdown signal: {}", received);
    let _ = shutdown_tx.send(());

    let grace = Duration::from_secs(server.shutdown_timeout_secs);
    match tokio::time::timeout(grace, server_task).await {
        Ok(result) => {
            result??;
            info!("Shut down cleanly");
            Ok(())
        }
        Err(_) => Err(anyhow::anyhow!("Shutdown timeout after {:?}", grace)),
    }
}

/// Wait for SIGTERM or SIGINT
///
/// # Returns
///
/// The name of the signal received
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
