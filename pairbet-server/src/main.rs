use anyhow::Context;
use clap::Parser;
use pairbet_core::RoomService;
use pairbet_server::{router, AppState, BitcoinRpc, IpfsClient, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pairbet")]
#[command(about = "Coordination server for two-party commit-and-reveal wagers")]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(short, long, env = "PAIRBET_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "PAIRBET_LISTEN")]
    listen: Option<SocketAddr>,

    /// Bitcoin node JSON-RPC URL
    #[arg(long, env = "PAIRBET_RPC_URL")]
    rpc_url: Option<String>,

    #[arg(long, env = "PAIRBET_RPC_USER")]
    rpc_user: Option<String>,

    #[arg(long, env = "PAIRBET_RPC_PASSWORD", hide_env_values = true)]
    rpc_password: Option<String>,

    /// IPFS API base URL
    #[arg(long, env = "PAIRBET_IPFS_URL")]
    ipfs_url: Option<String>,

    /// Token required by the room release endpoint
    #[arg(long, env = "PAIRBET_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(user) = &self.rpc_user {
            config.rpc_user = user.clone();
        }
        if let Some(password) = &self.rpc_password {
            config.rpc_password = password.clone();
        }
        if let Some(url) = &self.ipfs_url {
            config.ipfs_url = url.clone();
        }
        if let Some(token) = &self.admin_token {
            config.admin_token = Some(token.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
            signal(SignalKind::quit()),
        ) {
            (Ok(mut term), Ok(mut hup), Ok(mut quit)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = hup.recv() => {},
                    _ = quit.recv() => {},
                }
            }
            _ => {
                tracing::error!("failed to install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pairbet={},pairbet_server={},tower_http={}",
            log_level, log_level, log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.build_config()?;

    let broadcaster = Arc::new(BitcoinRpc::new(&config).context("failed to build RPC client")?);
    let messages = Arc::new(IpfsClient::new(&config).context("failed to build IPFS client")?);
    let state = AppState::new(
        Arc::new(RoomService::new()),
        broadcaster,
        messages,
        config.admin_token.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(
        listen = %config.listen_addr,
        rpc = %config.rpc_url,
        ipfs = %config.ipfs_url,
        "pairbet server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
