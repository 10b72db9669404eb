//! CLI Command Handlers
//!
//! Each handler takes its CLI args, a configured client and the Output,
//! and returns an ExitCode.

use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

use crate::api::{ApiError, DramaClient, MediaResolver, Resolve};
use crate::app::{ExitReason, WatchApp};
use crate::cli::{
    episode_index, validate_title_id, ClassifyCmd, EpisodesCmd, ExitCode, Output, PingResponse,
    PlayCmd, PlaySummary, ResolveCmd, ResolveResponse, SearchCmd, SuggestCmd,
};
use crate::config::Config;
use crate::logging::{self, LogTarget};
use crate::models::{CatalogItem, Genre, PlaybackTarget, SortOrder};
use crate::stream::LocalPlayer;
use crate::tui;

// =============================================================================
// Helpers
// =============================================================================

/// Print a list: JSON envelope in JSON mode, one line per entry otherwise
fn print_list<T: Serialize + Display>(items: &[T], output: &Output) -> ExitCode {
    if output.json {
        if let Err(e) = output.print(items) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    } else if items.is_empty() {
        output.info("No results");
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    ExitCode::Success
}

/// Print a single serializable value
fn print_value<T: Serialize>(value: T, output: &Output) -> ExitCode {
    match output.print(value) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn network_error(what: &str, e: ApiError, output: &Output) -> ExitCode {
    output.error(format!("{} failed: {}", what, e), ExitCode::NetworkError)
}

fn list_cmd(
    what: &str,
    result: Result<Vec<CatalogItem>, ApiError>,
    output: &Output,
) -> ExitCode {
    match result {
        Ok(items) => print_list(&items, output),
        Err(e) => network_error(what, e, output),
    }
}

// =============================================================================
// Catalog Commands
// =============================================================================

pub async fn home_cmd(client: &DramaClient, output: &Output) -> ExitCode {
    output.info("Loading home feed...");
    let feed = client.home().await;

    if feed.is_empty() {
        return output.error(
            "Connection issue: every home section came back empty",
            ExitCode::NetworkError,
        );
    }

    if output.json {
        return print_value(&feed, output);
    }

    for (label, items) in [
        ("For You", &feed.for_you),
        ("Latest", &feed.latest),
        ("Ranking", &feed.rank),
    ] {
        println!("== {} ({}) ==", label, items.len());
        for item in items {
            println!("{}", item);
        }
        println!();
    }
    ExitCode::Success
}

pub async fn for_you_cmd(client: &DramaClient, output: &Output) -> ExitCode {
    list_cmd("For-you feed", client.for_you().await, output)
}

pub async fn latest_cmd(client: &DramaClient, output: &Output) -> ExitCode {
    list_cmd("Latest feed", client.latest().await, output)
}

pub async fn rank_cmd(client: &DramaClient, output: &Output) -> ExitCode {
    list_cmd("Ranking", client.rank().await, output)
}

pub async fn classify_cmd(cmd: ClassifyCmd, client: &DramaClient, output: &Output) -> ExitCode {
    if cmd.page == 0 {
        return output.error("Pages start at 1", ExitCode::InvalidArgs);
    }
    let genre: Genre = cmd.genre.into();
    let sort: SortOrder = cmd.sort.into();
    output.info(format!("Browsing {} (page {})...", genre, cmd.page));
    list_cmd("Browse", client.classify(cmd.page, genre, sort).await, output)
}

pub async fn suggest_cmd(cmd: SuggestCmd, client: &DramaClient, output: &Output) -> ExitCode {
    match client.suggest(&cmd.keyword).await {
        Ok(suggestions) => print_list(&suggestions, output),
        Err(e) => network_error("Suggest", e, output),
    }
}

pub async fn search_cmd(cmd: SearchCmd, client: &DramaClient, output: &Output) -> ExitCode {
    if cmd.keyword.trim().is_empty() {
        return output.error("Search keyword must not be empty", ExitCode::InvalidArgs);
    }
    if cmd.page == 0 {
        return output.error("Pages start at 1", ExitCode::InvalidArgs);
    }
    output.info(format!("Searching for: {}", cmd.keyword));
    list_cmd("Search", client.search(&cmd.keyword, cmd.page).await, output)
}

// =============================================================================
// Episode Commands
// =============================================================================

pub async fn episodes_cmd(cmd: EpisodesCmd, client: &DramaClient, output: &Output) -> ExitCode {
    let title_id = match validate_title_id(&cmd.title_id) {
        Ok(id) => id,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let detail = match client.title_detail(title_id).await {
        Ok(detail) => detail,
        Err(e) => return network_error("Title detail", e, output),
    };

    if output.json {
        return print_value(&detail, output);
    }

    println!("{}", detail);
    for episode in &detail.episodes {
        println!("  {}", episode);
    }
    ExitCode::Success
}

pub async fn resolve_cmd(cmd: ResolveCmd, client: &DramaClient, output: &Output) -> ExitCode {
    let title_id = match validate_title_id(&cmd.title_id) {
        Ok(id) => id,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };
    let index = match episode_index(cmd.episode) {
        Ok(index) => index,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let target = PlaybackTarget::new(title_id, index);
    output.info(format!("Resolving episode {} of {}...", cmd.episode, title_id));

    let resolver = MediaResolver::new(client.clone());
    match resolver.resolve(&target).await {
        Ok(location) => {
            if output.json {
                print_value(
                    ResolveResponse {
                        title_id: target.title_id,
                        episode: cmd.episode,
                        url: location.as_str().to_string(),
                    },
                    output,
                )
            } else {
                println!("{}", location);
                ExitCode::Success
            }
        }
        Err(e) => output.error(e.to_string(), ExitCode::PlaybackFailed),
    }
}

pub async fn ping_cmd(client: &DramaClient, output: &Output) -> ExitCode {
    match client.ping().await {
        Ok(latency) => {
            if output.json {
                print_value(
                    PingResponse {
                        status: "ok".into(),
                        base_url: client.base_url().to_string(),
                        latency_ms: latency.as_millis(),
                    },
                    output,
                )
            } else {
                println!("{} answered in {} ms", client.base_url(), latency.as_millis());
                ExitCode::Success
            }
        }
        Err(e) => network_error("Ping", e, output),
    }
}

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(cmd: PlayCmd, config: &Config, output: &Output, verbose: u8) -> ExitCode {
    let title_id = match validate_title_id(&cmd.title_id) {
        Ok(id) => id.to_string(),
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };
    let index = match episode_index(cmd.episode) {
        Ok(index) => index,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let client = DramaClient::from_config(config);
    output.info(format!("Loading {}...", title_id));
    let detail = match client.title_detail(&title_id).await {
        Ok(detail) => detail,
        Err(e) => return network_error("Title detail", e, output),
    };

    let count = detail.episode_count();
    if count > 0 && index >= count {
        return output.error(
            format!("Episode {} out of range (1-{})", cmd.episode, count),
            ExitCode::InvalidArgs,
        );
    }

    let player_type = cmd.player.unwrap_or(config.player);
    let player = LocalPlayer::new(player_type);
    if !player.is_available().await {
        return output.error(
            format!("{} not found. Install it first.", player_type.display_name()),
            ExitCode::Error,
        );
    }

    // The watch screen owns the terminal; logs go to a file meanwhile
    let log_file = logging::default_log_file();
    if let Err(e) = logging::init(logging::level_for_verbosity(verbose), &LogTarget::File(log_file)) {
        output.info(format!("Logging disabled: {}", e));
    }

    let resolver: Arc<dyn Resolve> = Arc::new(MediaResolver::new(client));
    let auto_advance = config.auto_advance && !cmd.no_auto_advance;
    let mut app = WatchApp::start(detail, resolver, player, index, auto_advance).await;

    if let Err(e) = tui::run(&mut app).await {
        return output.error(format!("Terminal error: {}", e), ExitCode::Error);
    }

    let summary = PlaySummary {
        title_id,
        episodes_started: app.started().len(),
        last_episode: app.target().episode_index + 1,
        error: app.last_error.clone(),
    };

    if !output.quiet {
        if app.exit_reason == Some(ExitReason::EndOfSeries) {
            output.info("End of series.");
        }
        if let Err(e) = output.print(&summary) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    }

    if app.started().is_empty() && summary.error.is_some() {
        ExitCode::PlaybackFailed
    } else {
        ExitCode::Success
    }
}
