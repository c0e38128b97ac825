//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `moodmix` binary.
//!
//! ## Commands
//!
//! - `recommend`: run a single mood request against a catalog
//! - `chat`: interactive playlist session on stdin/stdout
//! - `info`: show one track's display attributes
//! - `completion`: generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! moodmix recommend tracks.csv "something sad and acoustic" --seed 42
//! moodmix chat tracks.csv
//! moodmix info tracks.csv 17 --json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "moodmix")]
#[command(about = "Moodmix: offline mood-vector playlist recommendations")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "MOODMIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by commands that start a playlist session
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// Path to the track catalog (CSV with a header row)
    pub catalog: PathBuf,

    /// Seed for the random starting playlist
    #[arg(long)]
    pub seed: Option<u64>,

    /// Explicit starting playlist, e.g. `--select 3,8,12` (overrides the random pick)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Number of recommendations to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend tracks for a single mood request
    ///
    /// Builds a starting playlist (random, or from --select), translates the
    /// message into feature adjustments and prints the best matching tracks
    /// not already in the playlist.
    Recommend {
        #[command(flatten)]
        session: SessionArgs,

        /// Free-text mood request, e.g. "more upbeat"
        message: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive playlist session
    ///
    /// Reads mood requests and commands from stdin. Type `help` in the
    /// session for the command list.
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show display attributes of one track
    Info {
        /// Path to the track catalog (CSV with a header row)
        catalog: PathBuf,

        /// Track index (0-based, file order)
        index: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Usage: moodmix completion bash > ~/.local/share/bash-completion/completions/moodmix
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
