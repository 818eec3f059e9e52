use anyhow::{Context, Result};
use mcptool::{api, config, logging, runtime::ToolRuntime};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();

    let config = config::get_config();
    let runtime = ToolRuntime::from_config(config).context("failed to build tool runtime")?;
    let app = api::create_router(Arc::new(runtime), config.function_key.clone());

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 7071..=7099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 7071-7099",
    ))
}
