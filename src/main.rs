//! parley - interactive multi-channel chat client

use anyhow::Result;
use clap::Parser;

use parley::client;
use parley::config::Config;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "A minimal multi-channel chat client with a unified prompt interface")]
#[command(version)]
struct Cli {
    /// Server hostname or address
    host: String,

    /// Server UDP port
    port: u16,

    /// Display name to log in under
    username: String,

    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they cannot corrupt the prompt line.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    client::run(&cli.host, cli.port, &cli.username, &config).await
}
