//! Zero-mean / unit-variance transform fitted once over the catalog matrix.
//!
//! The fitted parameters live on the engine for its whole lifetime. Mood
//! vectors built later must go through the same instance so that every
//! distance is measured in one space.

use crate::error::{EngineError, Result};
use crate::features::FeatureMatrix;
use log::warn;

/// Per-column mean and population standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: Vec<f64>,
    /// 0.0 marks a zero-variance column
    std: Vec<f64>,
}

impl Standardizer {
    /// Fits the transform over every row of `matrix`.
    ///
    /// Zero-variance columns are kept but standardize to 0.0 for any input.
    #[must_use]
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let width = matrix.width();
        #[allow(clippy::cast_precision_loss)]
        let n = matrix.len().max(1) as f64;

        let mut mean = vec![0.0; width];
        for row in matrix.rows() {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; width];
        for row in matrix.rows() {
            for ((v, &x), &m) in variance.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }

        let std = variance
            .iter()
            .zip(&mean)
            .zip(matrix.columns())
            .map(|((&v, &m), feature)| {
                let s = (v / n).sqrt();
                if is_degenerate(s, m) {
                    warn!("Column `{feature}' has zero variance; it will standardize to 0.0");
                    0.0
                } else {
                    s
                }
            })
            .collect();

        Self { mean, std }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Standardizes one vector laid out over the fitted columns.
    pub fn transform(&self, vector: &[f64]) -> Result<Vec<f64>> {
        if vector.len() != self.width() {
            return Err(EngineError::DimensionMismatch {
                expected: self.width(),
                actual: vector.len(),
            });
        }
        Ok(self.transform_unchecked(vector))
    }

    /// Standardizes every row of a matrix with the fitted columns.
    #[must_use]
    pub fn transform_matrix(&self, matrix: &FeatureMatrix) -> FeatureMatrix {
        debug_assert_eq!(matrix.width(), self.width());
        matrix.map_rows(|row| self.transform_unchecked(row))
    }

    fn transform_unchecked(&self, vector: &[f64]) -> Vec<f64> {
        vector
            .iter()
            .zip(&self.mean)
            .zip(&self.std)
            .map(|((&x, &m), &s)| if s == 0.0 { 0.0 } else { (x - m) / s })
            .collect()
    }
}

/// Treats rounding noise around a constant column as zero variance.
fn is_degenerate(std: f64, mean: f64) -> bool {
    std <= 10.0 * f64::EPSILON * mean.abs().max(1.0)
}
