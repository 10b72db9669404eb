//! DramaTUI - short dramas in the terminal
//!
//! # Usage
//!
//! ```bash
//! dramatui home
//! dramatui search "ceo" --json
//! dramatui play 41000102 --episode 3
//! ```

use anyhow::Result;
use clap::Parser;

use dramatui::api::DramaClient;
use dramatui::cli::{Cli, Command, ExitCode, Output};
use dramatui::commands;
use dramatui::config::Config;
use dramatui::logging::{self, LogTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    // The player installs its own file logger once it owns the terminal
    if !cli.is_interactive() {
        let level = logging::level_for_verbosity(cli.verbose);
        if let Err(e) = logging::init(level, &LogTarget::Stderr) {
            output.info(format!("Logging disabled: {}", e));
        }
    }

    let config = match &cli.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
        },
        None => Config::load(),
    };
    tracing::debug!(base_url = %config.base_url(), lang = %config.lang, "configuration loaded");

    let client = DramaClient::from_config(&config);

    match cli.command {
        Command::Home => commands::home_cmd(&client, &output).await,
        Command::ForYou => commands::for_you_cmd(&client, &output).await,
        Command::Latest => commands::latest_cmd(&client, &output).await,
        Command::Rank => commands::rank_cmd(&client, &output).await,
        Command::Classify(cmd) => commands::classify_cmd(cmd, &client, &output).await,
        Command::Suggest(cmd) => commands::suggest_cmd(cmd, &client, &output).await,
        Command::Search(cmd) => commands::search_cmd(cmd, &client, &output).await,
        Command::Episodes(cmd) => commands::episodes_cmd(cmd, &client, &output).await,
        Command::Resolve(cmd) => commands::resolve_cmd(cmd, &client, &output).await,
        Command::Ping => commands::ping_cmd(&client, &output).await,
        Command::Play(cmd) => commands::play_cmd(cmd, &config, &output, cli.verbose).await,
    }
}
