//! CLI - Command Line Interface for DramaTUI
//!
//! Every catalog call is scriptable and all output is JSON-parseable.
//! `play` opens the terminal player.
//!
//! # Examples
//!
//! ```bash
//! # Browse
//! dramatui home --json
//! dramatui classify --genre romance --sort latest
//!
//! # Find and watch
//! dramatui search "ceo" --page 2
//! dramatui episodes 41000102
//! dramatui play 41000102 --episode 3
//! ```

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::{Genre, SortOrder};
use crate::stream::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Episode could not be resolved or played
    PlaybackFailed = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// DramaTUI - short dramas in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "dramatui",
    version,
    author = "Gorka & Hermes",
    about = "Browse and watch short dramas from the terminal",
    long_about = "Browse the short-drama catalog, list episodes and play them \
                  in mpv or VLC with automatic retry and auto-advance.",
    after_help = "EXAMPLES:\n\
                  dramatui home                       Home feed sections\n\
                  dramatui search \"ceo\"               Search titles\n\
                  dramatui episodes 41000102          List episodes\n\
                  dramatui play 41000102 -e 3         Watch episode 3"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }

    /// Whether this invocation takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Command::Play(_))
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Home feed: for-you, latest and ranking sections
    Home,

    /// Personalised recommendations
    #[command(name = "foryou", visible_alias = "fy")]
    ForYou,

    /// Newest titles
    Latest,

    /// Ranking list
    Rank,

    /// Browse by genre and sort order
    #[command(visible_alias = "browse")]
    Classify(ClassifyCmd),

    /// Search-as-you-type suggestions
    Suggest(SuggestCmd),

    /// Search titles by keyword
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Title detail with its episode list
    #[command(visible_alias = "ep")]
    Episodes(EpisodesCmd),

    /// Resolve an episode to a playable URL
    Resolve(ResolveCmd),

    /// Check that the backend answers
    Ping,

    /// Watch a title in the terminal player
    #[command(visible_alias = "p")]
    Play(PlayCmd),
}

// =============================================================================
// Browse Commands
// =============================================================================

/// Browse by genre and sort order
#[derive(Args, Debug)]
pub struct ClassifyCmd {
    /// Page number (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Genre filter
    #[arg(long, short = 'g', value_enum, default_value = "all")]
    pub genre: GenreFilter,

    /// Sort order
    #[arg(long, short = 's', value_enum, default_value = "popular")]
    pub sort: SortFilter,
}

/// Genre filter for classify
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Romance,
    Action,
    Costume,
    Modern,
    Short,
}

impl From<GenreFilter> for Genre {
    fn from(filter: GenreFilter) -> Self {
        match filter {
            GenreFilter::All => Genre::All,
            GenreFilter::Romance => Genre::Romance,
            GenreFilter::Action => Genre::Action,
            GenreFilter::Costume => Genre::Costume,
            GenreFilter::Modern => Genre::Modern,
            GenreFilter::Short => Genre::Short,
        }
    }
}

/// Sort order for classify
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortFilter {
    #[default]
    Popular,
    Latest,
}

impl From<SortFilter> for SortOrder {
    fn from(filter: SortFilter) -> Self {
        match filter {
            SortFilter::Popular => SortOrder::Popular,
            SortFilter::Latest => SortOrder::Latest,
        }
    }
}

/// Search-as-you-type suggestions
#[derive(Args, Debug)]
pub struct SuggestCmd {
    /// Partial keyword
    #[arg(required = true)]
    pub keyword: String,
}

/// Search titles by keyword
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search keyword
    #[arg(required = true)]
    pub keyword: String,

    /// Page number (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,
}

// =============================================================================
// Episode Commands
// =============================================================================

/// Title detail with its episode list
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// Title ID
    #[arg(required = true)]
    pub title_id: String,
}

/// Resolve an episode to a playable URL
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Title ID
    #[arg(required = true)]
    pub title_id: String,

    /// Episode number (1-based)
    #[arg(long, short = 'e', default_value = "1")]
    pub episode: usize,
}

/// Watch a title in the terminal player
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Title ID
    #[arg(required = true)]
    pub title_id: String,

    /// Episode number to start from (1-based)
    #[arg(long, short = 'e', default_value = "1")]
    pub episode: usize,

    /// Player to use (overrides config)
    #[arg(long, value_enum)]
    pub player: Option<PlayerType>,

    /// Stop after this episode instead of moving to the next one
    #[arg(long)]
    pub no_auto_advance: bool,
}

/// Convert a 1-based episode number from the command line to an index
pub fn episode_index(number: usize) -> Result<usize, &'static str> {
    number
        .checked_sub(1)
        .ok_or("Episode numbers start at 1")
}

/// Validate a title id argument
pub fn validate_title_id(id: &str) -> Result<&str, &'static str> {
    let id = id.trim();
    if id.is_empty() {
        Err("Title ID must not be empty")
    } else if id.contains('/') || id.chars().any(char::is_whitespace) {
        Err("Title ID must not contain slashes or whitespace")
    } else {
        Ok(id)
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Resolve command response
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub title_id: String,
    pub episode: usize,
    pub url: String,
}

/// Ping command response
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub base_url: String,
    pub latency_ms: u128,
}

/// Summary printed when the player closes
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaySummary {
    pub title_id: String,
    pub episodes_started: usize,
    pub last_episode: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            // For non-JSON, caller should handle formatting
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
