use anyhow::Result;
use axum::Router;
use clap::Parser;
use crawler::FetchArgs;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    fetch: FetchArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(args.fetch.into_config())?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
