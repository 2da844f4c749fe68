use std::sync::Arc;

use clap::Parser;
use rsc_http::{serve, RscService, ServerConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    if let Err(e) = run(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> rsc_http::Result<()> {
    let shutdown = CancellationToken::new();
    let service = Arc::new(RscService::from_config(&config).with_cancellation(shutdown.child_token()));
    let listener = TcpListener::bind(config.addr).await?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    serve(listener, service, shutdown).await
}
