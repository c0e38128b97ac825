//! # Session State
//!
//! A [`Session`] is one listener's working playlist against a shared
//! [`MoodEngine`]. It keeps:
//!
//! - the ordered selection (display order; irrelevant for aggregation)
//! - the exclusion set, a superset of everything ever selected
//!
//! Both only grow. Every index stored here has been validated against the
//! engine, so they stay valid for the session's lifetime.
//!
//! ## Concurrency
//!
//! The engine is immutable and shared through an `Arc`. A session is
//! mutated through `&mut self`; to drive one session from several threads
//! wrap it in [`SharedSession`] so its mutations are serialized. Separate
//! sessions never share selection state.

use crate::catalog::Item;
use crate::engine::{MoodEngine, Recommendation};
use crate::error::Result;
use crate::features::Adjustments;
use log::{debug, info};
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Default number of tracks retrieved per turn
pub const DEFAULT_RETRIEVE_COUNT: usize = 10;

/// Default number of retrieved tracks shown to the listener
pub const DEFAULT_DISPLAY_COUNT: usize = 5;

/// A session that may be driven from several threads
pub type SharedSession = Arc<Mutex<Session>>;

/// Outcome of one conversational turn
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// The adjustment map the turn was run with
    pub adjustments: Adjustments,
    /// Ranked recommendations, best first
    pub recommendations: Vec<Recommendation>,
}

/// One listener's selection against a shared engine
#[derive(Debug)]
pub struct Session {
    engine: Arc<MoodEngine>,
    selection: Vec<usize>,
    excluded: HashSet<usize>,
    retrieve_count: usize,
    display_count: usize,
}

impl Session {
    /// Empty session with the default retrieve/display counts
    #[must_use]
    pub fn new(engine: Arc<MoodEngine>) -> Self {
        Self {
            engine,
            selection: Vec::new(),
            excluded: HashSet::new(),
            retrieve_count: DEFAULT_RETRIEVE_COUNT,
            display_count: DEFAULT_DISPLAY_COUNT,
        }
    }

    /// Sets how many tracks a turn retrieves and how many of those it returns
    #[must_use]
    pub fn with_counts(mut self, retrieve_count: usize, display_count: usize) -> Self {
        self.retrieve_count = retrieve_count;
        self.display_count = display_count;
        self
    }

    #[must_use]
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<MoodEngine> {
        &self.engine
    }

    /// Current selection, in the order items were added
    #[must_use]
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Indices barred from retrieval
    #[must_use]
    pub fn excluded(&self) -> &HashSet<usize> {
        &self.excluded
    }

    /// Seeds the selection with caller-chosen indices.
    ///
    /// Every index is validated before anything is stored; duplicates are
    /// kept once, in first-seen order. Items already excluded stay excluded.
    pub fn set_initial_selection(&mut self, indices: &[usize]) -> Result<()> {
        for &index in indices {
            self.engine.check_index(index)?;
        }

        let mut seen = HashSet::new();
        self.selection = indices
            .iter()
            .copied()
            .filter(|index| seen.insert(*index))
            .collect();
        self.excluded.extend(self.selection.iter().copied());

        info!("Playlist set with {} tracks", self.selection.len());
        Ok(())
    }

    /// Seeds the selection with `min(count, catalog size)` distinct random items.
    pub fn seed_random_selection<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Result<()> {
        let len = self.engine.len();
        let picks = rand::seq::index::sample(rng, len, count.min(len)).into_vec();
        debug!("Randomly picked initial selection {picks:?}");
        self.set_initial_selection(&picks)
    }

    /// Aggregates the selection, applies `adjustments`, and returns the
    /// best unseen tracks.
    ///
    /// Retrieves `retrieve_count` candidates and keeps the first
    /// `display_count`. The session itself is not modified.
    pub fn turn(&self, adjustments: &Adjustments) -> Result<Turn> {
        let mut recommendations = self.engine.interpret(
            &self.selection,
            &self.excluded,
            adjustments,
            self.retrieve_count,
        )?;
        recommendations.truncate(self.display_count);

        debug!(
            "Turn with {} active adjustments produced {} recommendations",
            adjustments.active().count(),
            recommendations.len()
        );
        Ok(Turn {
            adjustments: adjustments.clone(),
            recommendations,
        })
    }

    /// Appends accepted tracks to the selection.
    ///
    /// All indices are validated first, so an invalid one leaves the
    /// session untouched. Indices already excluded are skipped. Returns how
    /// many tracks were actually added.
    pub fn commit(&mut self, indices: &[usize]) -> Result<usize> {
        for &index in indices {
            self.engine.check_index(index)?;
        }

        let before = self.selection.len();
        for &index in indices {
            if self.excluded.insert(index) {
                self.selection.push(index);
            }
        }

        let added = self.selection.len() - before;
        info!(
            "Added {added} tracks. Playlist size: {}",
            self.selection.len()
        );
        Ok(added)
    }

    /// Display records of the last `count` selected tracks, oldest first
    pub fn recent(&self, count: usize) -> Result<Vec<Item>> {
        let start = self.selection.len().saturating_sub(count);
        self.selection[start..]
            .iter()
            .map(|&index| self.engine.item_summary(index).cloned())
            .collect()
    }
}
