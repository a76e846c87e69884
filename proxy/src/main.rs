use clap::Parser;
use giza_proxy::{create_router, ProxyState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CORS-forwarding relay for the Giza pyramid device
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Statically configured device address; omit to set it at runtime
    /// via POST /set-ip
    #[arg(long)]
    target: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let state = ProxyState::new(args.target.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("Proxy server running at http://localhost:{}", args.port);
    match &args.target {
        Some(ip) => info!("Proxying requests to device at {}", ip),
        None => info!("Waiting for target IP to be set..."),
    }

    axum::serve(listener, app).await?;
    Ok(())
}
