use anyhow::Context;
use clap::Parser;
use oauth2_server::http::{router, AppState};
use oauth2_server::telemetry::{init_tracing, TracingConfig};
use oauth2_server::{Config, KeyManager};
use std::sync::Arc;
use tracing::info;

/// OAuth2 server issuing RS256 access tokens.
#[derive(Debug, Parser)]
#[command(name = "oauth2-server", version, about)]
struct Cli {
    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Write the PEM-encoded public key to stdout after key generation
    #[arg(long)]
    print_public_key: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    let tracing_config = TracingConfig::from_config(&config);
    init_tracing(&tracing_config);

    info!(
        service = %tracing_config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting OAuth2 Server"
    );

    let keys = Arc::new(
        KeyManager::generate(config.rsa_key_bits).context("failed to generate signing key")?,
    );

    if cli.print_public_key {
        print!("{}", keys.export_public_key_pem()?);
    }

    let state = Arc::new(AppState::new(keys, &config));
    let app = router(Arc::clone(&state));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        issuer = state.issuer.issuer(),
        ttl_seconds = state.issuer.ttl_seconds(),
        expiry_policy = state.verifier.expiry_policy().as_str(),
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("OAuth2 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
