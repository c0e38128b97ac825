//! Line-oriented chat front end over a [`Session`].
//!
//! Each input line is one of:
//!
//! - `add <index> [index ...]` - commit tracks to the playlist
//! - `playlist` - show the most recent playlist entries
//! - `help` - list commands
//! - `quit` / `exit` - leave
//! - anything else - a mood request, translated through the keyword table

use crate::catalog::Item;
use crate::engine::Recommendation;
use crate::features::Adjustments;
use crate::keywords::KeywordTable;
use crate::session::Session;
use anyhow::{Context, Result};
use log::warn;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Message(String),
    Add(Vec<usize>),
    Playlist,
    Help,
    Quit,
    Empty,
}

impl ChatCommand {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns a message when `add` has no indices or a non-numeric one.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(ChatCommand::Empty);
        };

        match head.to_lowercase().as_str() {
            "quit" | "exit" => Ok(ChatCommand::Quit),
            "playlist" => Ok(ChatCommand::Playlist),
            "help" => Ok(ChatCommand::Help),
            "add" => {
                let indices = words
                    .flat_map(|w| w.split(','))
                    .filter(|w| !w.is_empty())
                    .map(|w| w.parse::<usize>().map_err(|_| format!("not a track index: `{w}`")))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if indices.is_empty() {
                    Err("No tracks specified".to_string())
                } else {
                    Ok(ChatCommand::Add(indices))
                }
            }
            _ => Ok(ChatCommand::Message(line.to_string())),
        }
    }
}

/// Short description of what a turn is looking for
#[must_use]
pub fn interpretation(adjustments: &Adjustments) -> String {
    let active: Vec<&str> = adjustments.active().map(|(f, _)| f.name()).collect();
    if active.is_empty() {
        "I'm looking for tracks similar to your current playlist...".to_string()
    } else {
        format!("Looking for {} vibes...", active.join(", "))
    }
}

/// One line per item: `[index] name - artist (genre, popularity N)`
#[must_use]
pub fn format_item(item: &Item) -> String {
    format!(
        "[{}] {} - {} ({}, popularity {})",
        item.index, item.name, item.artist, item.genre, item.popularity
    )
}

#[must_use]
pub fn format_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return "  No matching tracks left in the catalog.\n".to_string();
    }
    let mut out = String::new();
    for rec in recommendations {
        let _ = writeln!(out, "  {}  similarity {:.3}", format_item(&rec.item), rec.similarity);
    }
    out
}

const HELP: &str = "Describe a mood (e.g. \"something sad and acoustic\"), or:\n  \
                    add <index> [index ...]  add tracks to the playlist\n  \
                    playlist                 show recent playlist tracks\n  \
                    quit                     leave\n";

/// Runs the chat loop until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    keywords: &KeywordTable,
    recent_count: usize,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(
        output,
        "Playlist has {} tracks. Type `help` for commands.",
        session.selection().len()
    )?;
    write_playlist(session, recent_count, &mut output)?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let command = match ChatCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };

        match command {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => output.write_all(HELP.as_bytes())?,
            ChatCommand::Playlist => write_playlist(session, recent_count, &mut output)?,
            ChatCommand::Add(indices) => match session.commit(&indices) {
                Ok(added) => writeln!(
                    output,
                    "Added {added} tracks. Playlist size: {}",
                    session.selection().len()
                )?,
                Err(e) => {
                    warn!("Rejected add: {e}");
                    writeln!(output, "Error: {e}")?;
                }
            },
            ChatCommand::Message(message) => {
                let adjustments = keywords.extract(&message);
                let turn = session.turn(&adjustments)?;
                writeln!(output, "{}", interpretation(&turn.adjustments))?;
                output.write_all(format_recommendations(&turn.recommendations).as_bytes())?;
            }
        }
        output.flush()?;
    }
    Ok(())
}

fn write_playlist<W: Write>(session: &Session, recent_count: usize, output: &mut W) -> Result<()> {
    let recent = session.recent(recent_count)?;
    if recent.is_empty() {
        writeln!(output, "No tracks yet")?;
    }
    for item in recent {
        writeln!(output, "  {}", format_item(&item))?;
    }
    Ok(())
}
