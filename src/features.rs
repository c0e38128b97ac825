//! Canonical audio features, min-max normalization and the dense catalog matrix.
//!
//! Every vector in the engine is laid out over the [`FeatureMatrix`] column
//! list, which is the canonical order of [`Feature::ALL`] restricted to the
//! attributes the loaded catalog actually carries.

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One dimension of the canonical attribute set.
///
/// The derived `Ord` follows declaration order, which is the canonical
/// order. Anything keyed by `Feature` in a `BTreeMap` therefore iterates
/// canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Liveness,
    Loudness,
    Speechiness,
    Tempo,
    Valence,
}

impl Feature {
    /// Canonical attribute order
    pub const ALL: [Feature; 9] = [
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Energy,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Loudness,
        Feature::Speechiness,
        Feature::Tempo,
        Feature::Valence,
    ];

    /// Column name as it appears in catalog files
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Acousticness => "acousticness",
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
            Feature::Loudness => "loudness",
            Feature::Speechiness => "speechiness",
            Feature::Tempo => "tempo",
            Feature::Valence => "valence",
        }
    }

    /// Case-insensitive lookup by column name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|feature| feature.name().eq_ignore_ascii_case(name))
    }

    /// Attributes measured in unbounded units (decibels, BPM) that must be
    /// rescaled before they sit next to the [0,1] attributes.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Feature::Loudness | Feature::Tempo)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown feature `{s}`"))
    }
}

/// Sparse map of requested per-feature deltas.
///
/// Zero and absent entries both mean "no direct request". Iteration is in
/// canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustments(BTreeMap<Feature, f64>);

impl Adjustments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from loosely-typed names.
    ///
    /// Names outside the canonical set and non-finite deltas are dropped
    /// without error.
    pub fn from_named<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut adjustments = Self::new();
        for (name, delta) in pairs {
            let name = name.as_ref();
            match Feature::from_name(name) {
                Some(feature) if delta.is_finite() => {
                    adjustments.set(feature, delta);
                }
                Some(_) => debug!("Ignoring non-finite delta {delta} for `{name}'"),
                None => debug!("Ignoring unknown adjustment feature `{name}'"),
            }
        }
        adjustments
    }

    /// Sets (or overwrites) the delta for `feature`
    pub fn set(&mut self, feature: Feature, delta: f64) -> &mut Self {
        self.0.insert(feature, delta);
        self
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, delta: f64) -> Self {
        self.set(feature, delta);
        self
    }

    /// Overwrites entries of `self` with every entry of `other`
    pub fn merge(&mut self, other: &Adjustments) {
        for (feature, delta) in other.iter() {
            self.set(feature, delta);
        }
    }

    /// Requested delta, 0.0 when absent
    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.0.get(&feature).copied().unwrap_or(0.0)
    }

    /// Whether the caller asked for a direct, non-zero change
    #[must_use]
    pub fn is_requested(&self, feature: Feature) -> bool {
        self.get(feature) != 0.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(&feature, &delta)| (feature, delta))
    }

    /// Non-zero entries only, canonical order
    pub fn active(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.iter().filter(|&(_, delta)| delta != 0.0)
    }

    /// True when no entry carries a non-zero delta
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

impl FromIterator<(Feature, f64)> for Adjustments {
    fn from_iter<T: IntoIterator<Item = (Feature, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rescales `values` to `(v - min) / (max - min)`.
///
/// A zero-range input maps every value to 0.0.
#[must_use]
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = value_range(values) else {
        return Vec::new();
    };
    let range = max - min;
    if range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}

/// `(min, max)` of a non-empty slice
fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    }))
}

/// Dense row-major matrix, one row per catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<Feature>,
    rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Assembles the matrix from a loaded catalog.
    ///
    /// For each canonical attribute the min-max normalized column is used
    /// when the attribute is unbounded, the raw column otherwise. Attributes
    /// the catalog lacks are left out, so the matrix can be narrower than
    /// [`Feature::ALL`]; only a catalog with none of them is rejected.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let mut columns = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();

        for feature in Feature::ALL {
            let Some(raw) = catalog.raw_column(feature) else {
                debug!("Catalog has no `{feature}' column, leaving it out of the matrix");
                continue;
            };

            let column = if feature.is_unbounded() {
                if let Some((min, max)) = value_range(raw) {
                    if min == max {
                        warn!("Column `{feature}' has zero range ({min}); normalizing to 0.0");
                    }
                }
                min_max_normalize(raw)
            } else {
                raw.to_vec()
            };

            columns.push(feature);
            values.push(column);
        }

        if columns.is_empty() {
            return Err(EngineError::Schema {
                found: catalog.headers().to_vec(),
            });
        }

        let rows = catalog.len();
        let width = columns.len();
        let mut data = Vec::with_capacity(rows * width);
        for row in 0..rows {
            data.extend(values.iter().map(|column| column[row]));
        }

        trace!("Built {rows}x{width} feature matrix over {columns:?}");
        Ok(Self { columns, rows, data })
    }

    /// Builds a matrix from explicit rows, each laid out over `columns`.
    pub fn from_rows(columns: Vec<Feature>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(EngineError::Schema { found: Vec::new() });
        }
        let width = columns.len();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in &rows {
            if row.len() != width {
                return Err(EngineError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            columns,
            rows: rows.len(),
            data,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Position of `feature` in the column list
    #[must_use]
    pub fn column_index(&self, feature: Feature) -> Option<usize> {
        self.columns.iter().position(|&c| c == feature)
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.width();
        &self.data[index * width..(index + 1) * width]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.width())
    }

    /// Matrix with the same columns and every row passed through `f`
    pub(crate) fn map_rows(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Self {
        let data = self.rows().flat_map(|row| f(row)).collect();
        Self {
            columns: self.columns.clone(),
            rows: self.rows,
            data,
        }
    }
}
