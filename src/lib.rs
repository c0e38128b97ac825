//! Offline playlist recommendations from a mood vector.
//!
//! Every track is a point in a normalized, standardized audio-feature space.
//! A turn averages the current playlist into a mood vector, nudges it with
//! the listener's requested adjustments (propagating the implied changes to
//! correlated features) and returns the closest unseen tracks by cosine
//! similarity.
//!
//! Core modules:
//! - [`features`] - Canonical features, normalization and the feature matrix
//! - [`standardize`] - Zero-mean / unit-variance transform
//! - [`constraints`] - Adjustment propagation between correlated features
//! - [`similarity`] - Cosine scoring and ranked retrieval
//! - [`engine`] - The aggregate → adjust → retrieve pipeline
//! - [`session`] - Per-listener playlist and exclusion state
//!
//! ### Supporting Modules
//!
//! - [`catalog`] - CSV catalog loading
//! - [`keywords`] - Free-text keyword table to adjustment maps
//! - [`chat`] - Interactive line-based front end
//! - [`config`] - Runtime configuration
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use moodmix::{Catalog, KeywordTable, MoodEngine, Session};
//! use std::sync::Arc;
//!
//! let csv = "track_name,artist_name,acousticness,energy,valence\n\
//!            Rain,Ann,0.9,0.2,0.1\n\
//!            Sun,Bob,0.1,0.9,0.9\n\
//!            Fog,Cat,0.8,0.3,0.2\n\
//!            Fire,Dan,0.2,0.8,0.7\n";
//! let engine = Arc::new(MoodEngine::load(Catalog::from_reader(csv.as_bytes())?)?);
//!
//! let mut session = Session::new(Arc::clone(&engine));
//! session.set_initial_selection(&[0])?;
//!
//! let adjustments = KeywordTable::default().extract("something sad");
//! let turn = session.turn(&adjustments)?;
//! assert!(turn.recommendations.iter().all(|r| r.item.index != 0));
//!
//! if let Some(best) = turn.recommendations.first() {
//!     session.commit(&[best.item.index])?;
//! }
//! # Ok::<(), moodmix::EngineError>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::Result`]. Zero-range and zero-variance
//! columns never produce NaN: they collapse to 0.0 with a logged warning.
//! Unknown feature names in adjustment maps are ignored.

pub mod catalog;
pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod features;
pub mod keywords;
pub mod session;
pub mod similarity;
pub mod standardize;

pub use catalog::{Catalog, Item};
pub use engine::{MoodEngine, Recommendation};
pub use error::EngineError;
pub use features::{Adjustments, Feature, FeatureMatrix};
pub use keywords::KeywordTable;
pub use session::{Session, SharedSession, Turn};
pub use similarity::Scored;
