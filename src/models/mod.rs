//! Temporal network domain models.
//!
//! Provides the core data types for representing probabilistic temporal
//! networks and their constraints. A network is a directed weighted graph
//! over timepoints; edge weight `w(i, j)` encodes `time(j) - time(i) <= w(i, j)`.
//!
//! # Domain Mappings
//!
//! | u-temporal | Robotics | Project Planning |
//! |------------|----------|------------------|
//! | Timepoint | Action start/finish | Milestone |
//! | Requirement constraint | Deadline/window | Dependency lag |
//! | Contingent constraint | Uncertain travel/work time | Uncertain duration |
//! | Dispatchable graph | Execution guide | Baseline schedule |

mod constraint;
mod distribution;
mod network;
mod task;
mod timepoint;

pub use constraint::{ConstraintRecord, ContingentConstraint, NetworkRecord, TimepointRecord};
pub use distribution::DurationDistribution;
pub use network::TemporalNetwork;
pub use task::{Task, TimepointWindow};
pub use timepoint::{Timepoint, TimepointKind};
