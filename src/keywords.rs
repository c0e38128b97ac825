//! Keyword lookup from free text to an [`Adjustments`] map.
//!
//! This is plain configuration, not language understanding: each keyword
//! that appears as a substring of the lower-cased message contributes its
//! deltas, and later keywords overwrite earlier ones feature by feature.

use crate::features::{Adjustments, Feature};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use Feature::{
    Acousticness, Danceability, Energy, Instrumentalness, Loudness, Tempo, Valence,
};

/// Built-in mood keywords, in matching order
const DEFAULT_MOODS: &[(&str, &[(Feature, f64)])] = &[
    ("energetic", &[(Energy, 0.7), (Danceability, 0.6), (Valence, 0.4), (Tempo, 0.5)]),
    ("sad", &[(Valence, -0.8), (Energy, -0.5), (Acousticness, 0.3)]),
    ("acoustic", &[(Acousticness, 0.7), (Energy, -0.3), (Instrumentalness, 0.2)]),
    ("chill", &[(Energy, -0.6), (Tempo, -0.5), (Acousticness, 0.4)]),
    ("dance", &[(Danceability, 0.8), (Energy, 0.7), (Tempo, 0.5)]),
    ("electronic", &[(Acousticness, -0.8), (Energy, 0.6), (Instrumentalness, 0.5)]),
    ("upbeat", &[(Energy, 0.7), (Valence, 0.7), (Tempo, 0.4)]),
    ("melancholic", &[(Valence, -0.7), (Energy, -0.4), (Acousticness, 0.5)]),
    ("relaxing", &[(Energy, -0.7), (Valence, 0.3), (Loudness, -0.4)]),
    ("happy", &[(Valence, 0.8), (Energy, 0.5), (Danceability, 0.5)]),
    ("slow", &[(Tempo, -0.6), (Energy, -0.4)]),
    ("fast", &[(Tempo, 0.6), (Energy, 0.5)]),
];

/// Serializable keyword entry, as written in the config file.
///
/// Feature names are free-form strings; unknown ones are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub adjustments: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct KeywordRule {
    keyword: String,
    adjustments: Adjustments,
}

/// Ordered keyword → adjustment table
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let rules = DEFAULT_MOODS
            .iter()
            .map(|(keyword, deltas)| KeywordRule {
                keyword: (*keyword).to_string(),
                adjustments: deltas.iter().copied().collect(),
            })
            .collect();
        Self { rules }
    }
}

impl KeywordTable {
    /// Builds a table from config entries, keeping their order.
    #[must_use]
    pub fn from_entries(entries: &[KeywordEntry]) -> Self {
        let rules = entries
            .iter()
            .map(|entry| KeywordRule {
                keyword: entry.keyword.trim().to_lowercase(),
                adjustments: Adjustments::from_named(
                    entry.adjustments.iter().map(|(name, &delta)| (name, delta)),
                ),
            })
            .filter(|rule| !rule.keyword.is_empty())
            .collect();
        Self { rules }
    }

    /// Keywords in matching order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.keyword.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Adjustment map for `message`.
    ///
    /// Every canonical feature is present (zero when no keyword matched).
    #[must_use]
    pub fn extract(&self, message: &str) -> Adjustments {
        let message = message.to_lowercase();
        let mut adjustments: Adjustments = Feature::ALL.into_iter().map(|f| (f, 0.0)).collect();

        for rule in self.rules.iter().filter(|rule| message.contains(&rule.keyword)) {
            debug!("Keyword `{}' matched", rule.keyword);
            adjustments.merge(&rule.adjustments);
        }
        adjustments
    }
}
