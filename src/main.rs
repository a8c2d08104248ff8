// Entry point; the server itself lives in the library.
use anyhow::Result;
use clap::{Parser, Subcommand};
use gesture_coach_lib::core::config::Config;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "gesture-coach", about = "Body-language gesture analysis service")]
struct Cli {
    /// Config file (defaults to ~/.gesture_coach/config/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Write the effective configuration to the config path
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path().map_err(|e| anyhow::anyhow!(e))?,
    };

    let mut config = Config::load(&path).map_err(|e| anyhow::anyhow!(e))?;
    config.apply_env().map_err(|e| anyhow::anyhow!(e))?;

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => gesture_coach_lib::run(config).await,
        Command::InitConfig => {
            config.save(&path).map_err(|e| anyhow::anyhow!(e))?;
            info!(path = %path.display(), "configuration written");
            Ok(())
        }
    }
}
