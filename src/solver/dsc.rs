//! Degree of strong controllability via a shrinking LP.
//!
//! Treats each contingent duration as a bounded interval
//! ([`bounded_interval`](crate::models::DurationDistribution::bounded_interval))
//! and asks how much of that interval space a fixed offline schedule can
//! tolerate. Requirement timepoints must receive a single dispatch time;
//! contingent timepoints keep a window. Each contingent interval may be
//! shrunk by non-negative slack at either end, and the LP minimizes the
//! total shrinkage, normalized per interval by its width. The fraction of
//! interval space preserved across all contingent constraints is the degree
//! of strong controllability (DSC): 1 means the network is strongly
//! controllable as given, 0 means no interval space survives.
//!
//! # Reference
//! Akmal et al. (2019), "Quantifying Degrees of Controllability in Temporal
//! Networks with Uncertainty"

use std::collections::{BTreeMap, BTreeSet};

use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use tracing::debug;

use super::SolverError;
use crate::models::TemporalNetwork;

/// One contingent interval with its shrink variables.
struct ShrunkPair {
    i: usize,
    j: usize,
    lower: f64,
    upper: f64,
    width: f64,
    eps_hi: Variable,
    eps_lo: Variable,
}

/// Runs the controllability LP, returning the DSC and the offline schedule.
///
/// The schedule pins every requirement timepoint to the midpoint of its
/// revised bounds and leaves contingent timepoints their revised windows;
/// contingent edges are tightened to the shrunk intervals.
pub(crate) fn dsc_lp(network: &TemporalNetwork) -> Result<(f64, TemporalNetwork), SolverError> {
    let contingent = network.get_contingent_constraints();
    let contingent_targets: BTreeSet<usize> = contingent.keys().map(|&(_, j)| j).collect();

    let mut problem = Problem::new(OptimizationDirection::Minimize);
    let mut hi: BTreeMap<usize, Variable> = BTreeMap::new();
    let mut lo: BTreeMap<usize, Variable> = BTreeMap::new();

    for id in network.nodes() {
        let window_upper = network.get_edge_weight(0, id);
        if window_upper < 0.0 {
            debug!(id, "empty window, network is uncontrollable");
            return Err(SolverError::Uncontrollable);
        }
        let window_lower = match network.get_edge_weight(id, 0) {
            w if w.is_finite() => -w,
            _ => 0.0,
        };

        let (hi_var, lo_var) = if id == 0 {
            (problem.add_var(0.0, (0.0, 0.0)), problem.add_var(0.0, (0.0, 0.0)))
        } else {
            (
                problem.add_var(0.0, (0.0, window_upper)),
                problem.add_var(0.0, (window_lower, f64::INFINITY)),
            )
        };
        hi.insert(id, hi_var);
        lo.insert(id, lo_var);

        // Requirement timepoints are dispatched at a single time
        let op = if contingent_targets.contains(&id) {
            ComparisonOp::Ge
        } else {
            ComparisonOp::Eq
        };
        let mut order = LinearExpr::empty();
        order.add(hi_var, 1.0);
        order.add(lo_var, -1.0);
        problem.add_constraint(order, op, 0.0);
    }

    // The interval comes from the distribution itself, not the stored
    // edges: a contingent pair anchored at the zero timepoint shares its
    // edges with the target's window, which must stay a separate bound
    let mut pairs = Vec::new();
    for (&(i, j), constraint) in &contingent {
        let (lower, upper) = constraint.distribution.bounded_interval();
        let width = upper - lower;
        let coeff = if width > 0.0 { 1.0 / width } else { 1.0 };

        let eps_hi = problem.add_var(coeff, (0.0, f64::INFINITY));
        let eps_lo = problem.add_var(coeff, (0.0, f64::INFINITY));

        // bounds[j,'+'] - bounds[i,'+'] == upper - eps_hi
        let mut upper_eq = LinearExpr::empty();
        upper_eq.add(hi[&j], 1.0);
        upper_eq.add(hi[&i], -1.0);
        upper_eq.add(eps_hi, 1.0);
        problem.add_constraint(upper_eq, ComparisonOp::Eq, upper);

        // bounds[j,'-'] - bounds[i,'-'] == lower + eps_lo
        let mut lower_eq = LinearExpr::empty();
        lower_eq.add(lo[&j], 1.0);
        lower_eq.add(lo[&i], -1.0);
        lower_eq.add(eps_lo, -1.0);
        problem.add_constraint(lower_eq, ComparisonOp::Eq, lower);

        pairs.push(ShrunkPair {
            i,
            j,
            lower,
            upper,
            width,
            eps_hi,
            eps_lo,
        });
    }

    for (&(i, j), _) in &network.get_constraints() {
        if network.is_contingent(i, j) {
            continue;
        }
        let w_ij = network.get_edge_weight(i, j);
        if w_ij.is_finite() {
            let mut expr = LinearExpr::empty();
            expr.add(hi[&j], 1.0);
            expr.add(lo[&i], -1.0);
            problem.add_constraint(expr, ComparisonOp::Le, w_ij);
        }
        let w_ji = network.get_edge_weight(j, i);
        if w_ji.is_finite() {
            let mut expr = LinearExpr::empty();
            expr.add(hi[&i], 1.0);
            expr.add(lo[&j], -1.0);
            problem.add_constraint(expr, ComparisonOp::Le, w_ji);
        }
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(err) => {
            debug!(error = %err, "controllability LP not optimal");
            return Err(SolverError::Uncontrollable);
        }
    };

    // Tighten the contingent edges to the shrunk intervals and accumulate
    // the preserved fraction
    let mut dsc = 1.0;
    let mut schedule = network.clone();
    for pair in &pairs {
        let shrink_hi = solution[pair.eps_hi];
        let shrink_lo = solution[pair.eps_lo];
        if pair.width > 0.0 {
            let kept = (pair.width - shrink_hi - shrink_lo).max(0.0);
            dsc *= kept / pair.width;
        }
        schedule.update_edge_weight(pair.i, pair.j, pair.upper - shrink_hi, false);
        schedule.update_edge_weight(pair.j, pair.i, -(pair.lower + shrink_lo), false);
    }

    let ids: Vec<usize> = schedule.nodes().collect();
    for id in ids {
        if id == 0 {
            continue;
        }
        let lower = solution[lo[&id]];
        let upper = solution[hi[&id]];
        if contingent_targets.contains(&id) {
            schedule.update_edge_weight(0, id, upper, true);
            schedule.update_edge_weight(id, 0, -lower, true);
        } else {
            // Requirement timepoints dispatch at the window midpoint
            let time = (lower + upper) / 2.0;
            schedule.update_edge_weight(0, id, time, true);
            schedule.update_edge_weight(id, 0, -time, true);
        }
    }

    Ok((dsc, schedule))
}
