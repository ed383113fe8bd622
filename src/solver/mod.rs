//! Solvers for temporal networks.
//!
//! Three solving methods are provided:
//!
//! - **Full path consistency** ([`minimal_network`]): the classic
//!   Floyd–Warshall reduction for plain STNs
//! - **SREA** ([`find_robust_schedule`]): the Static Robust Execution
//!   Algorithm for probabilistic STNs, which binary-searches the smallest
//!   risk level at which the risk-calibration LP is feasible and commits
//!   the winning bounds back onto the network
//! - **DSC LP**: the degree-of-strong-controllability program, which
//!   computes an offline schedule together with the fraction of contingent
//!   interval space it preserves
//!
//! [`compute_dispatchable_graph`] dispatches between them.

mod dsc;
mod fpc;
mod lp;
mod srea;

pub use fpc::minimal_network;
pub use lp::{RiskLp, TimepointBounds};

use thiserror::Error;

use crate::models::TemporalNetwork;
use crate::validation::{validate_network, ValidationError};

/// Options for the SREA solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SreaOptions {
    /// Skip the path-consistency reduction and the cross-timepoint
    /// requirement inequalities. Set this when the network is already
    /// decoupled into per-agent subproblems.
    pub decouple: bool,
    /// Lower end of the risk search interval.
    pub lower_risk_bound: f64,
    /// Upper end of the risk search interval.
    pub upper_risk_bound: f64,
}

impl SreaOptions {
    /// Sets `decouple`.
    pub fn with_decouple(mut self, decouple: bool) -> Self {
        self.decouple = decouple;
        self
    }

    /// Sets the risk search interval.
    pub fn with_risk_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_risk_bound = lower;
        self.upper_risk_bound = upper;
        self
    }
}

impl Default for SreaOptions {
    fn default() -> Self {
        Self {
            decouple: false,
            lower_risk_bound: 0.0,
            upper_risk_bound: 0.999,
        }
    }
}

/// A dispatchable graph together with the risk level it was solved at.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustSchedule {
    /// Smallest risk level at which the network is strongly controllable.
    pub risk_level: f64,
    /// The network with the calibrated execution windows committed.
    pub network: TemporalNetwork,
}

/// Errors produced by the solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The input network failed structural validation.
    #[error("invalid network: {0:?}")]
    InvalidNetwork(Vec<ValidationError>),
    /// The risk search interval is not `0 <= lower <= upper <= 1`.
    #[error("invalid risk bounds [{lower}, {upper}]")]
    InvalidRiskBounds { lower: f64, upper: f64 },
    /// The network's distance graph contains a negative cycle.
    #[error("network is temporally inconsistent")]
    Inconsistent,
    /// No offline schedule exists even with fully shrunk contingent
    /// intervals.
    #[error("network is not strongly controllable")]
    Uncontrollable,
    /// No risk level in the search interval admits a robust schedule.
    #[error("no robust schedule exists for any risk level in [{lower}, {upper}]")]
    NoRobustSchedule { lower: f64, upper: f64 },
}

/// Runs SREA on a probabilistic temporal network.
///
/// Validates the network, reduces it to its minimal form (unless
/// `decouple` is set), and binary-searches risk levels at 1/1000
/// resolution for the smallest one whose risk-calibration LP is feasible.
/// The winning bounds are committed onto the returned network as windows
/// against the zero timepoint, rounded outward to whole units.
///
/// # Errors
/// - [`SolverError::InvalidNetwork`] if validation fails
/// - [`SolverError::InvalidRiskBounds`] if the search interval is malformed
/// - [`SolverError::Inconsistent`] if the network has a negative cycle
/// - [`SolverError::NoRobustSchedule`] if no risk level is feasible
pub fn find_robust_schedule(
    network: &TemporalNetwork,
    options: &SreaOptions,
) -> Result<RobustSchedule, SolverError> {
    let (lower, upper) = (options.lower_risk_bound, options.upper_risk_bound);
    if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower > upper {
        return Err(SolverError::InvalidRiskBounds { lower, upper });
    }
    validate_network(network).map_err(SolverError::InvalidNetwork)?;

    let (risk_level, mut solved) = srea::srea(network, options)?;
    solved.risk_metric = Some(risk_level);
    Ok(RobustSchedule {
        risk_level,
        network: solved,
    })
}

/// Which solving method [`compute_dispatchable_graph`] uses.
#[derive(Debug, Clone, PartialEq)]
pub enum StpMethod {
    /// Floyd–Warshall minimal network; treats every constraint as a
    /// requirement.
    FullPathConsistency,
    /// Risk-calibrated strong controllability.
    Srea(SreaOptions),
    /// Degree-of-strong-controllability LP over bounded contingent
    /// intervals; the resulting risk metric is `1 - DSC`.
    DscLp,
}

/// Computes a dispatchable graph with the chosen method.
pub fn compute_dispatchable_graph(
    network: &TemporalNetwork,
    method: &StpMethod,
) -> Result<TemporalNetwork, SolverError> {
    match method {
        StpMethod::FullPathConsistency => {
            minimal_network(network).ok_or(SolverError::Inconsistent)
        }
        StpMethod::Srea(options) => Ok(find_robust_schedule(network, options)?.network),
        StpMethod::DscLp => {
            validate_network(network).map_err(SolverError::InvalidNetwork)?;
            let (dsc, mut schedule) = dsc::dsc_lp(network)?;
            schedule.risk_metric = Some(1.0 - dsc);
            Ok(schedule)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DurationDistribution;

    #[test]
    fn test_invalid_risk_bounds_rejected() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::uniform(8.0, 12.0));

        let options = SreaOptions::default().with_risk_bounds(0.5, 0.2);
        assert_eq!(
            find_robust_schedule(&network, &options),
            Err(SolverError::InvalidRiskBounds {
                lower: 0.5,
                upper: 0.2
            })
        );

        let options = SreaOptions::default().with_risk_bounds(-0.1, 0.9);
        assert!(matches!(
            find_robust_schedule(&network, &options),
            Err(SolverError::InvalidRiskBounds { .. })
        ));
    }

    #[test]
    fn test_invalid_network_rejected() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::gaussian(10.0, -2.0));

        assert!(matches!(
            find_robust_schedule(&network, &SreaOptions::default()),
            Err(SolverError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_dispatch_full_path_consistency() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 10.0);
        network.add_constraint(1, 2, 0.0, 10.0);
        network.add_constraint(0, 2, 0.0, 5.0);

        let graph =
            compute_dispatchable_graph(&network, &StpMethod::FullPathConsistency).unwrap();
        assert_eq!(graph.get_edge_weight(0, 1), 5.0);
    }

    #[test]
    fn test_dispatch_dsc_validates_input() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::gaussian(10.0, -2.0));

        assert!(matches!(
            compute_dispatchable_graph(&network, &StpMethod::DscLp),
            Err(SolverError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_dispatch_srea_sets_risk_metric() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::uniform(8.0, 12.0));
        network.update_edge_weight(0, 1, 20.0, false);

        let graph = compute_dispatchable_graph(
            &network,
            &StpMethod::Srea(SreaOptions::default()),
        )
        .unwrap();
        assert_eq!(graph.risk_metric, Some(0.0));
    }
}
