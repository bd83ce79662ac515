//! dbot-gpt: run the Telegram bot. Config from env (and `.env`) plus optional CLI args.

use anyhow::Result;
use clap::Parser;
use dbot_gpt::{run_bot, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
    }
}
