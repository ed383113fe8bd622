//! The risk-calibration linear program.
//!
//! [`RiskLp::build`] captures the alpha-independent structure of a network
//! once: static per-node windows, requirement inequalities, and the list of
//! contingent pairs. [`RiskLp::solve_at`] then instantiates and solves a
//! fresh LP for one candidate risk level. Rebuilding the variable set per
//! trial keeps binary-search trials numerically independent of each other;
//! the base structure is only scanned, never mutated.
//!
//! For each contingent constraint `(i, j)` at risk level `alpha`, the
//! revised bounds are pinned to the `1 - alpha/2` and `alpha/2` quantiles,
//! and a non-negative slack ("delta") variable per direction may widen the
//! interval back toward the extreme-tail limits. The objective maximizes the
//! total slack recovered.
//!
//! # Reference
//! Lund et al. (2017), "Robust Execution of Probabilistic Temporal Plans",
//! LP (3) and (4)

use std::collections::BTreeMap;

use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use tracing::debug;

use crate::models::{DurationDistribution, TemporalNetwork};

/// Slack caps this close to zero are treated as exactly zero rather than
/// infeasible; they arise when a tail limit and a quantile coincide.
const CAP_EPS: f64 = 1e-9;

/// Revised offsets of one timepoint relative to the zero timepoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimepointBounds {
    /// Revised lower admissible offset.
    pub lower: f64,
    /// Revised upper admissible offset.
    pub upper: f64,
}

/// Static window of one LP bound-variable pair.
#[derive(Debug, Clone)]
struct NodeWindow {
    id: usize,
    lower: f64,
    upper: f64,
}

/// One requirement constraint, kept as its edge-weight pair.
#[derive(Debug, Clone)]
struct RequirementPair {
    i: usize,
    j: usize,
    w_ij: f64,
    w_ji: f64,
}

/// One contingent pair with its duration distribution.
#[derive(Debug, Clone)]
struct ContingentPair {
    i: usize,
    j: usize,
    distribution: DurationDistribution,
}

/// Alpha-independent LP structure extracted from a temporal network.
#[derive(Debug, Clone)]
pub struct RiskLp {
    windows: Vec<NodeWindow>,
    requirements: Vec<RequirementPair>,
    contingents: Vec<ContingentPair>,
}

impl RiskLp {
    /// Extracts the base LP structure from a network.
    ///
    /// Requirement inequalities are omitted when an endpoint is the zero
    /// timepoint (those are implicit in the variable bounds), when the pair
    /// or its reverse is contingent, or when `decouple` is set (the caller
    /// already holds a decoupled network and only wants bound variables).
    pub fn build(network: &TemporalNetwork, decouple: bool) -> Self {
        let mut windows = Vec::new();
        let mut requirements = Vec::new();
        let mut contingents = Vec::new();

        for id in network.nodes() {
            let (lower, upper) = network.interval(id);
            windows.push(NodeWindow { id, lower, upper });
        }

        let contingent_constraints = network.get_contingent_constraints();
        for (&(i, j), constraint) in &contingent_constraints {
            contingents.push(ContingentPair {
                i,
                j,
                distribution: constraint.distribution.clone(),
            });
        }

        for (&(i, j), _) in &network.get_constraints() {
            if network.is_contingent(i, j) {
                continue;
            }
            if i != 0 && j != 0 && !decouple {
                requirements.push(RequirementPair {
                    i,
                    j,
                    w_ij: network.get_edge_weight(i, j),
                    w_ji: network.get_edge_weight(j, i),
                });
            }
        }

        Self {
            windows,
            requirements,
            contingents,
        }
    }

    /// Number of requirement inequality pairs in the base structure.
    pub fn requirement_count(&self) -> usize {
        self.requirements.len()
    }

    /// Number of contingent pairs in the base structure.
    pub fn contingent_count(&self) -> usize {
        self.contingents.len()
    }

    /// Solves the LP at risk level `alpha`.
    ///
    /// Returns the revised bounds per timepoint if the LP is optimal, or
    /// `None` otherwise. Solver-internal failures are indistinguishable
    /// from infeasibility by design; either way this alpha does not admit a
    /// robust schedule.
    pub fn solve_at(&self, alpha: f64) -> Option<BTreeMap<usize, TimepointBounds>> {
        let alpha = (alpha * 1000.0).round() / 1000.0;

        let mut problem = Problem::new(OptimizationDirection::Maximize);
        let mut hi: BTreeMap<usize, Variable> = BTreeMap::new();
        let mut lo: BTreeMap<usize, Variable> = BTreeMap::new();

        for window in &self.windows {
            if window.lower > window.upper {
                return None;
            }
            let hi_var = problem.add_var(0.0, (window.lower, window.upper));
            let lo_var = problem.add_var(0.0, (window.lower, window.upper));
            hi.insert(window.id, hi_var);
            lo.insert(window.id, lo_var);

            // upper offset never drops below the lower offset
            let mut order = LinearExpr::empty();
            order.add(hi_var, 1.0);
            order.add(lo_var, -1.0);
            problem.add_constraint(order, ComparisonOp::Ge, 0.0);
        }

        for req in &self.requirements {
            // An infinite weight is no constraint at all
            if req.w_ij.is_finite() {
                let mut expr = LinearExpr::empty();
                expr.add(hi[&req.j], 1.0);
                expr.add(lo[&req.i], -1.0);
                problem.add_constraint(expr, ComparisonOp::Le, req.w_ij);
            }
            if req.w_ji.is_finite() {
                let mut expr = LinearExpr::empty();
                expr.add(hi[&req.i], 1.0);
                expr.add(lo[&req.j], -1.0);
                problem.add_constraint(expr, ComparisonOp::Le, req.w_ji);
            }
        }

        for pair in &self.contingents {
            let dist = &pair.distribution;
            let p_ij = dist.quantile(1.0 - alpha * 0.5);
            let p_ji = -dist.quantile(alpha * 0.5);
            let (limit_ij, limit_ji) = dist.tail_limits();

            // An unbounded quantile means no finite schedule excludes this
            // little probability mass
            if !p_ij.is_finite() || !p_ji.is_finite() {
                debug!(alpha, "unbounded quantile, trial infeasible");
                return None;
            }

            // Each delta gets its own cap; mass beyond the tail limit is
            // unrecoverable, so a negative cap makes the trial infeasible
            let cap_ij = limit_ij - p_ij;
            let cap_ji = limit_ji - p_ji;
            if cap_ij < -CAP_EPS || cap_ji < -CAP_EPS {
                debug!(alpha, "risk level below the tail limit, trial infeasible");
                return None;
            }

            let delta_ij = problem.add_var(1.0, (0.0, cap_ij.max(0.0)));
            let delta_ji = problem.add_var(1.0, (0.0, cap_ji.max(0.0)));

            // bounds[j,'+'] - bounds[i,'+'] == p_ij + delta_ij
            let mut upper_eq = LinearExpr::empty();
            upper_eq.add(hi[&pair.j], 1.0);
            upper_eq.add(hi[&pair.i], -1.0);
            upper_eq.add(delta_ij, -1.0);
            problem.add_constraint(upper_eq, ComparisonOp::Eq, p_ij);

            // bounds[j,'-'] - bounds[i,'-'] == -p_ji - delta_ji
            let mut lower_eq = LinearExpr::empty();
            lower_eq.add(lo[&pair.j], 1.0);
            lower_eq.add(lo[&pair.i], -1.0);
            lower_eq.add(delta_ji, 1.0);
            problem.add_constraint(lower_eq, ComparisonOp::Eq, -p_ji);
        }

        match problem.solve() {
            Ok(solution) => {
                let bounds = self
                    .windows
                    .iter()
                    .map(|w| {
                        (
                            w.id,
                            TimepointBounds {
                                lower: solution[lo[&w.id]],
                                upper: solution[hi[&w.id]],
                            },
                        )
                    })
                    .collect();
                Some(bounds)
            }
            Err(err) => {
                debug!(alpha, error = %err, "LP not optimal");
                None
            }
        }
    }
}
