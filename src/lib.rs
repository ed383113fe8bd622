//! Probabilistic temporal networks for the U-Engine ecosystem.
//!
//! Provides Simple Temporal Network (STN) and Probabilistic STN (PSTN)
//! models, full path consistency, and the Static Robust Execution
//! Algorithm (SREA), which calibrates the smallest acceptable risk level
//! at which a strongly controllable schedule exists.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `TemporalNetwork`, `Timepoint`,
//!   `DurationDistribution`, `ContingentConstraint`, `Task`
//! - **`validation`**: Input integrity checks (zero timepoint, edge pairs,
//!   distribution parameters)
//! - **`solver`**: Path consistency, the risk-calibration LP, the
//!   degree-of-strong-controllability LP, and the `find_robust_schedule`
//!   entry point
//!
//! # Example
//!
//! ```
//! use u_temporal::models::{DurationDistribution, TemporalNetwork};
//! use u_temporal::solver::{find_robust_schedule, SreaOptions};
//!
//! let mut network = TemporalNetwork::new();
//! network.add_contingent_constraint(
//!     0,
//!     1,
//!     DurationDistribution::gaussian(10.0, 2.0),
//! );
//! network.update_edge_weight(0, 1, 20.0, false);
//!
//! let result = find_robust_schedule(&network, &SreaOptions::default()).unwrap();
//! assert!(result.risk_level < 0.999);
//! ```
//!
//! # References
//!
//! - Dechter, Meiri, Pearl (1991), "Temporal Constraint Networks"
//! - Lund et al. (2017), "Robust Execution of Probabilistic Temporal Plans"
//! - Vidal, Fargier (1999), "Handling Contingency in Temporal Constraint Networks"

pub mod models;
pub mod solver;
pub mod validation;
