//! The hyper listener loop.

use std::convert::Infallible;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::service::RscService;

/// Accept connections on `listener` until `shutdown` is cancelled.
///
/// Each connection is served on its own task. Connections still open at
/// shutdown are dropped.
pub async fn serve(
    listener: TcpListener,
    service: Arc<RscService>,
    shutdown: CancellationToken,
) -> Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote) = accepted?;
                let service = service.clone();
                let shutdown = shutdown.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        result = handle_connection(stream, service) => {
                            if let Err(err) = result {
                                tracing::debug!(%remote, error = %err, "connection error");
                            }
                        }
                        _ = shutdown.cancelled() => {}
                    }
                });
            }
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

/// Serve HTTP/1 requests arriving on one connection.
pub async fn handle_connection(stream: TcpStream, service: Arc<RscService>) -> Result<()> {
    let io = TokioIo::new(stream);
    let handler = service_fn(move |request| {
        let service = service.clone();
        async move { Ok::<_, Infallible>(service.respond(request).await) }
    });

    http1::Builder::new().serve_connection(io, handler).await?;
    Ok(())
}
