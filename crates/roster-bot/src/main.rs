mod backend;
mod cmd;
mod discord;
mod settings;

use clap::{Parser, Subcommand};
use roster_core::config::RegisterMode;
use settings::ConfigArgs;

#[derive(Parser)]
#[command(
    name = "roster-bot",
    about = "Guild roster bot: slash commands over a Google Sheets roster, attachment backups to Drive",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register commands, start the health server and connect to the gateway (default)
    Run,

    /// Register slash commands and exit
    Register {
        /// Overrides REGISTER_MODE
        #[arg(long)]
        mode: Option<RegisterMode>,
    },

    /// Validate configuration and print a summary
    CheckConfig,
}

fn main() {
    // A missing .env is not an error.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd::run::run(cli.config),
        Commands::Register { mode } => cmd::register::run(cli.config, mode),
        Commands::CheckConfig => cmd::check_config::run(cli.config),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
