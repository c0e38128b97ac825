//! Constraint-based mood adjustment.
//!
//! A requested change to one feature usually implies something about its
//! correlated features: asking for more acoustic character makes a high
//! energy value implausible, asking for sadder music drags energy down.
//! [`adjust`] applies the requested deltas and then propagates these
//! secondary effects according to a fixed rule table.
//!
//! ```text
//! trigger        sign  dependent         policy
//! acousticness    +    energy            soft
//! acousticness    +    instrumentalness  increase
//! acousticness    -    energy            flexible
//! acousticness    -    instrumentalness  flexible
//! energy          +    valence           increase
//! energy          +    tempo             increase
//! energy          -    valence           flexible
//! energy          -    tempo             decrease
//! valence         +    energy            increase
//! valence         +    instrumentalness  flexible
//! valence         -    energy            decrease
//! valence         -    acousticness      increase
//! ```
//!
//! Triggers are visited in canonical feature order, so two triggers hitting
//! the same dependent always compose the same way.

use crate::features::{Adjustments, Feature};
use log::{debug, trace};

/// Every value written by [`adjust`] is clipped to `[-CLIP_BOUND, CLIP_BOUND]`
/// (three standard deviations in standardized space).
pub const CLIP_BOUND: f64 = 3.0;

/// Share of the triggering delta pushed onto a dependent feature
pub const PROPAGATION_FACTOR: f64 = 0.4;

/// Multiplier applied by [`Policy::Soft`]
pub const SOFT_FACTOR: f64 = 0.5;

/// What a triggering change does to a dependent feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Halve the dependent's current value
    Soft,
    /// Raise the dependent by `PROPAGATION_FACTOR * |delta|`
    Increase,
    /// Lower the dependent by `PROPAGATION_FACTOR * |delta|`
    Decrease,
    /// No constraint enforced
    Flexible,
}

/// Sign of a requested delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// `None` for a zero (or NaN) delta
    #[must_use]
    pub fn of(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Direction::Positive)
        } else if delta < 0.0 {
            Some(Direction::Negative)
        } else {
            None
        }
    }
}

/// Dependents of `trigger` for a change in `direction`, in table order.
#[must_use]
pub fn rules(trigger: Feature, direction: Direction) -> &'static [(Feature, Policy)] {
    use Direction::{Negative, Positive};
    use Feature::{Acousticness, Energy, Instrumentalness, Tempo, Valence};
    use Policy::{Decrease, Flexible, Increase, Soft};

    match (trigger, direction) {
        (Acousticness, Positive) => &[(Energy, Soft), (Instrumentalness, Increase)],
        (Acousticness, Negative) => &[(Energy, Flexible), (Instrumentalness, Flexible)],
        (Energy, Positive) => &[(Valence, Increase), (Tempo, Increase)],
        (Energy, Negative) => &[(Valence, Flexible), (Tempo, Decrease)],
        (Valence, Positive) => &[(Energy, Increase), (Instrumentalness, Flexible)],
        (Valence, Negative) => &[(Energy, Decrease), (Acousticness, Increase)],
        _ => &[],
    }
}

#[inline]
#[must_use]
pub fn clip(value: f64) -> f64 {
    value.clamp(-CLIP_BOUND, CLIP_BOUND)
}

/// New value of a dependent feature after a trigger fired with `delta`
#[must_use]
pub fn apply_policy(policy: Policy, current: f64, delta: f64) -> f64 {
    match policy {
        Policy::Soft => current * SOFT_FACTOR,
        Policy::Increase => clip(current + PROPAGATION_FACTOR * delta.abs()),
        Policy::Decrease => clip(current - PROPAGATION_FACTOR * delta.abs()),
        Policy::Flexible => current,
    }
}

/// Applies `adjustments` to `base` and propagates correlated effects.
///
/// `columns` names the feature at each position of `base`. Features with no
/// column are skipped silently. Every entry present in `adjustments` is
/// written back clipped, zero deltas included; only non-zero deltas count as
/// requests and trigger propagation. An empty map is the identity.
#[must_use]
pub fn adjust(base: &[f64], columns: &[Feature], adjustments: &Adjustments) -> Vec<f64> {
    debug_assert_eq!(base.len(), columns.len());
    let index_of = |feature: Feature| columns.iter().position(|&c| c == feature);
    let mut adjusted = base.to_vec();

    for (feature, delta) in adjustments.iter() {
        match index_of(feature) {
            Some(i) => adjusted[i] = clip(adjusted[i] + delta),
            None => debug!("No `{feature}' column in catalog, ignoring requested delta {delta}"),
        }
    }

    for (trigger, delta) in adjustments.active() {
        let Some(direction) = Direction::of(delta) else {
            continue;
        };
        for &(dependent, policy) in rules(trigger, direction) {
            // Direct requests always win over inferred ones.
            if adjustments.is_requested(dependent) {
                continue;
            }
            let Some(i) = index_of(dependent) else {
                continue;
            };
            let before = adjusted[i];
            adjusted[i] = apply_policy(policy, before, delta);
            trace!(
                "{trigger} {direction:?} -> {dependent} {policy:?}: {before:.3} => {:.3}",
                adjusted[i]
            );
        }
    }

    adjusted
}
