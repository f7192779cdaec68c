//! parley-server - routes chat datagrams between subscribed endpoints

use anyhow::Result;
use clap::Parser;

use parley::config::Config;
use parley::server;

#[derive(Parser)]
#[command(name = "parley-server")]
#[command(about = "parley chat server")]
#[command(version)]
struct Cli {
    /// Address to bind
    host: String,

    /// UDP port to bind
    port: u16,

    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    server::run(&cli.host, cli.port, &config).await
}
