use std::net::SocketAddr;

use clap::Parser;
use mock_api_server::{app, AppState, Envelope};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the mock API server
#[derive(Parser, Debug)]
#[command(name = "mock-api-server")]
#[command(about = "Serves the fixture portfolio over the dashboard REST API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Shape of list responses
    #[arg(long, value_enum, default_value = "items")]
    envelope: Envelope,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::seeded(args.envelope);
    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Mock API listening on http://{}", addr);
    info!("List envelope: {:?}", args.envelope);

    axum::serve(listener, app).await?;

    Ok(())
}
