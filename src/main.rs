//! # Moodmix
//!
//! Offline mood-based playlist recommendations from a CSV track catalog.
//!
//! ## Usage
//!
//! ```bash
//! # One-off request against a random 5-track starting playlist
//! moodmix recommend tracks.csv "chill acoustic evening"
//!
//! # Interactive session
//! moodmix chat tracks.csv --seed 7
//!
//! # Track details
//! moodmix info tracks.csv 42
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use moodmix::cli::{self, SessionArgs};
use moodmix::config::RuntimeConfig;
use moodmix::{chat, completion, Catalog, MoodEngine, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::sync::Arc;

/// Loads the catalog and seeds a session from the shared CLI options.
fn open_session(args: &SessionArgs, config: &RuntimeConfig) -> Result<Session> {
    let catalog = Catalog::from_path(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;
    let engine = Arc::new(MoodEngine::load(catalog).context("Catalog is not usable")?);

    let display_count = args.count.unwrap_or(config.display_count);
    let retrieve_count = config.retrieve_count.max(display_count);
    let mut session = Session::new(engine).with_counts(retrieve_count, display_count);

    if args.select.is_empty() {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        session.seed_random_selection(&mut rng, config.initial_selection)?;
    } else {
        session.set_initial_selection(&args.select)?;
    }
    debug!("Starting playlist: {:?}", session.selection());
    Ok(session)
}

/// Main entry point.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug moodmix chat tracks.csv`
/// - `RUST_LOG=moodmix::constraints=trace moodmix recommend tracks.csv sad`
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = RuntimeConfig::load(args.config.as_deref())?;

    match args.command {
        cli::Command::Recommend { session, message, json } => {
            let session = open_session(&session, &config)?;
            let adjustments = config.keyword_table().extract(&message);
            info!("Recommending for: {message}");
            let turn = session.turn(&adjustments)?;

            if json {
                let body = serde_json::json!({
                    "interpretation": chat::interpretation(&turn.adjustments),
                    "adjustments": turn.adjustments,
                    "playlist": session.recent(config.recent_count)?,
                    "new_recommendations": turn.recommendations,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Playlist:");
                for item in session.recent(config.recent_count)? {
                    println!("  {}", chat::format_item(&item));
                }
                println!("{}", chat::interpretation(&turn.adjustments));
                print!("{}", chat::format_recommendations(&turn.recommendations));
            }
        }
        cli::Command::Chat { session } => {
            let mut session = open_session(&session, &config)?;
            let stdin = io::stdin();
            chat::run(
                &mut session,
                &config.keyword_table(),
                config.recent_count,
                stdin.lock(),
                io::stdout(),
            )?;
        }
        cli::Command::Info { catalog, index, json } => {
            let catalog = Catalog::from_path(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let engine = MoodEngine::load(catalog)?;
            let item = engine.item_summary(index)?;
            if json {
                println!("{}", serde_json::to_string_pretty(item)?);
            } else {
                println!("{}", chat::format_item(item));
            }
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}
