use anyhow::Result;
use clap::{Parser, Subcommand};

use telegram_bot::config::BotConfig;
use telegram_bot::runner;

#[derive(Parser)]
#[command(name = "telegram-bot", about = "Gemini-backed Telegram chatbot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bot (default).
    Run {
        /// Override BOT_TOKEN from the environment.
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = BotConfig::load()?;
    if let Some(Command::Run { token: Some(token) }) = cli.command {
        config.bot_token = token;
    }

    runner::run(config).await
}
