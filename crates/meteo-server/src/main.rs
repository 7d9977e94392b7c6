use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use meteo_core::Config;
use meteo_server::Service;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Cached Open-Meteo forecast service")]
struct Cli {
    /// Config file. Defaults to $XDG_CONFIG_HOME/meteo/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the HTTP API will listen, e.g. 127.0.0.1:9000. Overrides the config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    meteo_core::init()?;

    let cli = Cli::parse();

    let (mut config, _) = Config::load_validated(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    let addr = config.server.listen_addr()?;

    let service = Service::from_config(&config)?;

    let cancel = CancellationToken::new();
    let refresher = service.refresher.spawn(cancel.clone());

    let app = meteo_server::router(service.state);

    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    refresher.await?;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
