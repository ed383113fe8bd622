//! The SREA binary-search risk calibrator.
//!
//! Searches risk levels at 1/1000 resolution for the smallest alpha whose
//! risk-calibration LP is feasible, then commits the winning revised bounds
//! back onto the network as windows against the zero timepoint. Bound
//! endpoints are rounded outward to whole units so the committed window
//! never cuts into the admissible interval.
//!
//! # Reference
//! Lund et al. (2017), "Robust Execution of Probabilistic Temporal Plans",
//! Algorithm 1

use std::collections::BTreeMap;

use tracing::debug;

use super::lp::{RiskLp, TimepointBounds};
use super::{fpc, SolverError, SreaOptions};
use crate::models::TemporalNetwork;

/// Risk levels are discretized to this many ticks per unit.
const RISK_RESOLUTION: f64 = 1000.0;

/// Runs the calibrator, returning the smallest feasible risk level and the
/// network with its bounds committed.
pub(crate) fn srea(
    network: &TemporalNetwork,
    options: &SreaOptions,
) -> Result<(f64, TemporalNetwork), SolverError> {
    let base = if options.decouple {
        network.clone()
    } else {
        fpc::minimal_network(network).ok_or(SolverError::Inconsistent)?
    };

    let model = RiskLp::build(&base, options.decouple);

    // Tick interval is open on both ends; the half-open updates below keep
    // `lower` infeasible and `upper` one past the best feasible tick
    let mut lower = (options.lower_risk_bound * RISK_RESOLUTION).ceil() as i64 - 1;
    let mut upper = (options.upper_risk_bound * RISK_RESOLUTION).floor() as i64 + 1;
    let mut best: Option<(f64, BTreeMap<usize, TimepointBounds>)> = None;

    while upper - lower > 1 {
        let mid = (upper + lower) / 2;
        let alpha = mid as f64 / RISK_RESOLUTION;
        match model.solve_at(alpha) {
            Some(bounds) => {
                debug!(alpha, "risk level feasible");
                upper = mid;
                best = Some((alpha, bounds));
            }
            None => {
                debug!(alpha, "risk level infeasible");
                lower = mid;
            }
        }
    }

    match best {
        Some((alpha, bounds)) => Ok((alpha, commit(base, &bounds))),
        None => Err(SolverError::NoRobustSchedule {
            lower: options.lower_risk_bound,
            upper: options.upper_risk_bound,
        }),
    }
}

/// Writes the revised bounds onto the network as windows against the zero
/// timepoint.
fn commit(mut network: TemporalNetwork, bounds: &BTreeMap<usize, TimepointBounds>) -> TemporalNetwork {
    for (&id, b) in bounds {
        if id == 0 {
            continue;
        }
        network.update_edge_weight(0, id, b.upper.ceil(), true);
        network.update_edge_weight(id, 0, (-b.lower).ceil(), true);
    }
    network
}
