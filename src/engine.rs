//! # Mood Engine
//!
//! Owns a loaded catalog in standardized feature space and runs the
//! aggregate → adjust → retrieve pipeline.
//!
//! ## Lifecycle
//!
//! 1. [`MoodEngine::load`] normalizes unbounded columns, assembles the
//!    feature matrix and fits the [`Standardizer`] exactly once.
//! 2. Every later operation reads the standardized matrix and the fitted
//!    parameters; nothing is mutated after construction.
//!
//! The engine is `Send + Sync` and meant to be shared behind an `Arc` by
//! any number of sessions. Per-user state lives in [`crate::session`].
//!
//! ## Example
//!
//! ```
//! use moodmix::{Adjustments, Catalog, Feature, MoodEngine};
//! use std::collections::HashSet;
//!
//! let catalog = Catalog::from_reader(
//!     "track_name,energy,valence\nA,0.9,0.8\nB,0.1,0.2\nC,0.5,0.4\n".as_bytes(),
//! )?;
//! let engine = MoodEngine::load(catalog)?;
//!
//! let mood = engine.aggregate(&[2])?;
//! let adjusted = engine.adjust(&mood, &Adjustments::new().with(Feature::Energy, 1.0))?;
//! let exclude: HashSet<usize> = [2].into_iter().collect();
//! let hits = engine.retrieve(&adjusted, &exclude, 5)?;
//! assert_eq!(hits[0].index, 0);
//! # Ok::<(), moodmix::EngineError>(())
//! ```

use crate::catalog::{Catalog, Item};
use crate::constraints;
use crate::error::{EngineError, Result};
use crate::features::{Adjustments, Feature, FeatureMatrix};
use crate::similarity::{self, Scored};
use crate::standardize::Standardizer;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

/// One ranked result of a turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: Item,
    pub similarity: f64,
}

/// Immutable recommendation engine over one loaded catalog
#[derive(Debug, Clone)]
pub struct MoodEngine {
    items: Vec<Item>,
    scaler: Standardizer,
    matrix: FeatureMatrix,
}

impl MoodEngine {
    /// Builds the engine from a loaded catalog.
    ///
    /// # Errors
    ///
    /// [`EngineError::Schema`] if the catalog shares no column with the
    /// canonical feature set.
    pub fn load(catalog: Catalog) -> Result<Self> {
        let raw = FeatureMatrix::build(&catalog)?;
        let engine = Self::from_matrix(catalog.into_items(), &raw)?;
        info!(
            "Mood engine ready: {} tracks over {:?}",
            engine.len(),
            engine.columns()
        );
        Ok(engine)
    }

    /// Builds the engine from display records and an unstandardized matrix.
    pub fn from_matrix(items: Vec<Item>, raw: &FeatureMatrix) -> Result<Self> {
        if items.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        if items.len() != raw.len() {
            return Err(EngineError::DimensionMismatch {
                expected: items.len(),
                actual: raw.len(),
            });
        }
        let scaler = Standardizer::fit(raw);
        let matrix = scaler.transform_matrix(raw);
        Ok(Self {
            items,
            scaler,
            matrix,
        })
    }

    /// Number of catalog items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Features present in this catalog, canonical order
    #[must_use]
    pub fn columns(&self) -> &[Feature] {
        self.matrix.columns()
    }

    /// Vector width (== `columns().len()`)
    #[must_use]
    pub fn width(&self) -> usize {
        self.matrix.width()
    }

    /// The standardized catalog matrix
    #[must_use]
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// The transform fitted at load time
    #[must_use]
    pub fn scaler(&self) -> &Standardizer {
        &self.scaler
    }

    /// Fails with [`EngineError::InvalidIndex`] unless `index < len()`
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(EngineError::InvalidIndex {
                index,
                len: self.len(),
            })
        }
    }

    /// Display attributes of one item
    pub fn item_summary(&self, index: usize) -> Result<&Item> {
        self.check_index(index)?;
        Ok(&self.items[index])
    }

    /// Maps a raw (unstandardized, already normalized) vector into the
    /// engine's space with the load-time parameters.
    pub fn standardize(&self, raw: &[f64]) -> Result<Vec<f64>> {
        self.scaler.transform(raw)
    }

    /// Centroid of the standardized rows at `indices`.
    ///
    /// An empty slice yields the zero vector. Duplicate indices count once
    /// per occurrence.
    pub fn aggregate(&self, indices: &[usize]) -> Result<Vec<f64>> {
        let mut centroid = vec![0.0; self.width()];
        if indices.is_empty() {
            return Ok(centroid);
        }

        for &index in indices {
            self.check_index(index)?;
            for (c, &x) in centroid.iter_mut().zip(self.matrix.row(index)) {
                *c += x;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n = indices.len() as f64;
        centroid.iter_mut().for_each(|c| *c /= n);
        Ok(centroid)
    }

    /// Applies requested deltas and propagates correlated effects.
    /// See [`constraints::adjust`].
    pub fn adjust(&self, base: &[f64], adjustments: &Adjustments) -> Result<Vec<f64>> {
        self.check_width(base)?;
        Ok(constraints::adjust(base, self.columns(), adjustments))
    }

    /// Up to `top_n` items most similar to `target`, best first.
    ///
    /// Excluded indices are never returned, nor is anything scoring ≤ 0.
    /// Exclusions outside the catalog have no effect.
    pub fn retrieve(
        &self,
        target: &[f64],
        exclude: &HashSet<usize>,
        top_n: usize,
    ) -> Result<Vec<Scored>> {
        self.check_width(target)?;
        let scores = similarity::score_rows(&self.matrix, target, exclude);
        let ranked = similarity::top_n(&scores, top_n);
        debug!(
            "Retrieved {} of {top_n} requested tracks ({} excluded)",
            ranked.len(),
            exclude.len()
        );
        Ok(ranked)
    }

    /// One full turn: aggregate `selection`, adjust, retrieve.
    pub fn interpret(
        &self,
        selection: &[usize],
        exclude: &HashSet<usize>,
        adjustments: &Adjustments,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        let base = self.aggregate(selection)?;
        let target = self.adjust(&base, adjustments)?;
        self.retrieve(&target, exclude, top_n)?
            .into_iter()
            .map(|hit| -> Result<Recommendation> {
                Ok(Recommendation {
                    item: self.item_summary(hit.index)?.clone(),
                    similarity: hit.score,
                })
            })
            .collect()
    }

    fn check_width(&self, vector: &[f64]) -> Result<()> {
        if vector.len() == self.width() {
            Ok(())
        } else {
            Err(EngineError::DimensionMismatch {
                expected: self.width(),
                actual: vector.len(),
            })
        }
    }
}
