//! Timepoints: the nodes of a temporal network.

use serde::{Deserialize, Serialize};

/// Role of a timepoint within a task.
///
/// Node 0 is always the [`Zero`](TimepointKind::Zero) timepoint, the
/// reference against which all absolute windows are expressed. The remaining
/// kinds follow the task lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimepointKind {
    /// Reference timepoint anchoring the schedule.
    Zero,
    /// Time at which work towards the task begins (e.g. travel starts).
    Start,
    /// Time at which the task's main action begins.
    Pickup,
    /// Time at which the task finishes.
    Delivery,
    /// Timepoint with no task lifecycle role (hand-built networks).
    Generic,
}

/// A timepoint in the temporal network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timepoint {
    /// Id of the task this timepoint belongs to, if any.
    pub task_id: Option<String>,
    /// Role of the timepoint.
    pub kind: TimepointKind,
}

impl Timepoint {
    /// Creates the zero (reference) timepoint.
    pub fn zero() -> Self {
        Self {
            task_id: None,
            kind: TimepointKind::Zero,
        }
    }

    /// Creates a task timepoint.
    pub fn new(task_id: impl Into<String>, kind: TimepointKind) -> Self {
        Self {
            task_id: Some(task_id.into()),
            kind,
        }
    }

    /// Creates a timepoint with no task association.
    pub fn generic() -> Self {
        Self {
            task_id: None,
            kind: TimepointKind::Generic,
        }
    }
}
