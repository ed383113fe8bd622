//! Constraint types and wire records.
//!
//! A constraint between timepoints `i` and `j` maps to two edges in the
//! distance graph:
//!
//! ```text
//! i --- [-w(j,i), w(i,j)] ---> j
//! ```
//!
//! `-w(j,i)` is the minimum allocated time between `i` and `j`, `w(i,j)` the
//! maximum. Contingent constraints additionally carry a duration
//! distribution; their realized duration is outside the scheduler's control.
//!
//! Serialization goes through explicit record structs ([`NetworkRecord`],
//! [`TimepointRecord`], [`ConstraintRecord`]) rather than serializing the
//! graph's internal maps directly.

use serde::{Deserialize, Serialize};

use super::{DurationDistribution, TimepointKind};

/// A contingent (stochastic-duration) constraint between two timepoints.
///
/// The duration from the trigger timepoint `from` to the target timepoint
/// `to` follows `distribution`. Contingent edges always occur in
/// forward/backward pairs in the underlying graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingentConstraint {
    /// Trigger timepoint id.
    pub from: usize,
    /// Target timepoint id.
    pub to: usize,
    /// Duration distribution.
    pub distribution: DurationDistribution,
}

impl ContingentConstraint {
    /// Creates a contingent constraint.
    pub fn new(from: usize, to: usize, distribution: DurationDistribution) -> Self {
        Self {
            from,
            to,
            distribution,
        }
    }

    /// Draws a realized duration for this constraint.
    pub fn sample_duration<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.distribution.sample(rng)
    }
}

/// Wire representation of a timepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimepointRecord {
    /// Node id.
    pub id: usize,
    /// Owning task, if any.
    pub task_id: Option<String>,
    /// Timepoint role.
    pub kind: TimepointKind,
}

/// Wire representation of a constraint (one edge pair).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    /// Starting timepoint id.
    pub from: usize,
    /// Ending timepoint id.
    pub to: usize,
    /// Minimum allocated time `-w(to, from)`; `None` when unbounded below.
    ///
    /// Infinite bounds are not representable in JSON, so they map to a
    /// missing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// Maximum allocated time `w(from, to)`; `None` when unbounded above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    /// Present for contingent constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DurationDistribution>,
}

/// Wire representation of a whole temporal network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// All timepoints, zero timepoint included.
    pub timepoints: Vec<TimepointRecord>,
    /// All constraints as `from < to` pairs.
    pub constraints: Vec<ConstraintRecord>,
    /// Risk metric of a solved network, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_metric: Option<f64>,
}
