//! # Catalog Loading
//!
//! Reads tabular track data (CSV with a header row) into display records and
//! raw numeric feature columns. Indices are assigned densely in file order
//! and never change for the lifetime of the loaded catalog.
//!
//! Recognised display columns:
//!
//! | column        | field        | default     |
//! |---------------|--------------|-------------|
//! | `track_name`  | `name`       | `"Unknown"` |
//! | `artist_name` | `artist`     | `"Unknown"` |
//! | `genre`       | `genre`      | `"Unknown"` |
//! | `popularity`  | `popularity` | `0`         |
//!
//! Any header matching a [`Feature`] name (case-insensitive) is parsed as a
//! numeric column; every other column is ignored.

use crate::error::{EngineError, Result};
use crate::features::Feature;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const UNKNOWN: &str = "Unknown";

/// Display attributes of one catalog entry.
///
/// Feature values are deliberately absent: they only live inside the
/// engine's matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub index: usize,
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub popularity: i64,
}

/// A loaded catalog: display records plus raw numeric columns
#[derive(Debug, Clone)]
pub struct Catalog {
    headers: Vec<String>,
    items: Vec<Item>,
    raw: BTreeMap<Feature, Vec<f64>>,
}

impl Catalog {
    /// Loads a catalog from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading catalog from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads a catalog from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::from_records(headers, rows)
    }

    /// Builds a catalog from a header row and string cells.
    ///
    /// # Errors
    ///
    /// * [`EngineError::EmptyCatalog`] when there are no rows
    /// * [`EngineError::InvalidValue`] when a feature cell is not a finite number
    pub fn from_records(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let name_col = position("track_name");
        let artist_col = position("artist_name");
        let genre_col = position("genre");
        let popularity_col = position("popularity");

        // First matching header wins if a feature appears twice.
        let mut feature_cols: BTreeMap<Feature, usize> = BTreeMap::new();
        for (col, header) in headers.iter().enumerate() {
            if let Some(feature) = Feature::from_name(header) {
                feature_cols.entry(feature).or_insert(col);
            }
        }

        let mut raw: BTreeMap<Feature, Vec<f64>> = feature_cols
            .keys()
            .map(|&feature| (feature, Vec::with_capacity(rows.len())))
            .collect();
        let mut items = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let cell = |col: Option<usize>| col.and_then(|c| row.get(c)).map(|s| s.trim());
            let text = |col: Option<usize>| match cell(col) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => UNKNOWN.to_string(),
            };

            items.push(Item {
                index,
                name: text(name_col),
                artist: text(artist_col),
                genre: text(genre_col),
                popularity: parse_popularity(cell(popularity_col), index),
            });

            for (&feature, &col) in &feature_cols {
                let value = cell(Some(col)).unwrap_or_default();
                let parsed = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| EngineError::InvalidValue {
                        row: index,
                        column: headers[col].clone(),
                        value: value.to_string(),
                    })?;
                if let Some(column) = raw.get_mut(&feature) {
                    column.push(parsed);
                }
            }
        }

        info!(
            "Loaded catalog with {} tracks and feature columns {:?}",
            items.len(),
            raw.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            headers,
            items,
            raw,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Raw values of `feature`, row-aligned with [`Self::items`]
    #[must_use]
    pub fn raw_column(&self, feature: Feature) -> Option<&[f64]> {
        self.raw.get(&feature).map(Vec::as_slice)
    }

    pub(crate) fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// Popularity is display-only, so a malformed cell falls back to 0.
fn parse_popularity(cell: Option<&str>, row: usize) -> i64 {
    match cell {
        None | Some("") => 0,
        Some(s) => match s.parse::<f64>() {
            #[allow(clippy::cast_possible_truncation)]
            Ok(v) if v.is_finite() => v.round() as i64,
            _ => {
                debug!("Row {row}: unparseable popularity `{s}', using 0");
                0
            }
        },
    }
}
