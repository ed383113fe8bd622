//! The temporal network graph.
//!
//! A [`TemporalNetwork`] is a directed weighted graph over timepoints.
//! Edge weight `w(i, j)` encodes the distance-graph inequality
//! `time(j) - time(i) <= w(i, j)`; a missing edge is an infinite bound.
//! Node 0 is the zero (reference) timepoint, so node `i`'s absolute window
//! is `[-w(i, 0), w(0, i)]`.
//!
//! Storage is ordered (`BTreeMap`) so that iteration, solving, and
//! serialization are deterministic for identical inputs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    ConstraintRecord, ContingentConstraint, DurationDistribution, NetworkRecord, Timepoint,
    TimepointRecord,
};

/// A temporal network with optional contingent (probabilistic) constraints.
///
/// Plain requirement constraints make this a Simple Temporal Network (STN);
/// adding contingent constraints makes it a Probabilistic STN (PSTN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NetworkRecord", from = "NetworkRecord")]
pub struct TemporalNetwork {
    nodes: BTreeMap<usize, Timepoint>,
    edges: BTreeMap<(usize, usize), f64>,
    contingent: BTreeMap<(usize, usize), DurationDistribution>,
    /// Risk level committed by the solver, if this network is a solved
    /// dispatchable graph.
    pub risk_metric: Option<f64>,
}

impl TemporalNetwork {
    /// Creates an empty network containing only the zero timepoint.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(0, Timepoint::zero());
        Self {
            nodes,
            edges: BTreeMap::new(),
            contingent: BTreeMap::new(),
            risk_metric: None,
        }
    }

    /// Adds (or replaces) a timepoint.
    pub fn add_timepoint(&mut self, id: usize, timepoint: Timepoint) {
        self.nodes.insert(id, timepoint);
    }

    /// Removes a timepoint along with its incident edges and contingent
    /// constraints.
    pub fn remove_timepoint(&mut self, id: usize) {
        self.nodes.remove(&id);
        self.edges.retain(|&(i, j), _| i != id && j != id);
        self.contingent.retain(|&(i, j), _| i != id && j != id);
    }

    /// Node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.keys().copied()
    }

    /// The timepoint stored at `id`.
    pub fn timepoint(&self, id: usize) -> Option<&Timepoint> {
        self.nodes.get(&id)
    }

    /// Whether node `id` exists.
    pub fn has_node(&self, id: usize) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of timepoints (zero timepoint included).
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Directed edges with their weights, in key order.
    pub fn edges(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.edges.iter().map(|(&k, &w)| (k, w))
    }

    /// Whether the directed edge `(i, j)` exists.
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.edges.contains_key(&(i, j))
    }

    /// Weight of edge `(i, j)`.
    ///
    /// Returns 0 on the diagonal and `+inf` for a missing edge (no
    /// constraint).
    pub fn get_edge_weight(&self, i: usize, j: usize) -> f64 {
        match self.edges.get(&(i, j)) {
            Some(&w) => w,
            None if i == j && self.has_node(i) => 0.0,
            None => f64::INFINITY,
        }
    }

    /// Tightens the weight of edge `(i, j)`.
    ///
    /// The weight is updated only if the new value is smaller than the
    /// current one; a temporal constraint never loosens. When the edge is
    /// absent it is inserted only if `create` is set.
    pub fn update_edge_weight(&mut self, i: usize, j: usize, weight: f64, create: bool) {
        match self.edges.get_mut(&(i, j)) {
            Some(current) => {
                if weight < *current {
                    *current = weight;
                }
            }
            None if create => {
                self.edges.insert((i, j), weight);
            }
            None => {}
        }
    }

    /// Adds a requirement constraint `i --- [lower, upper] ---> j`.
    ///
    /// Maps to the edge pair `w(i, j) = upper`, `w(j, i) = -lower`. Missing
    /// endpoints are created as generic timepoints.
    pub fn add_constraint(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        self.ensure_node(i);
        self.ensure_node(j);
        self.edges.insert((i, j), upper);
        self.edges.insert((j, i), -lower);
    }

    /// Adds a contingent constraint from trigger `i` to target `j`.
    ///
    /// The edge pair starts at `[0, inf)`; static windows on the endpoints
    /// come from their constraints with the zero timepoint.
    pub fn add_contingent_constraint(
        &mut self,
        i: usize,
        j: usize,
        distribution: DurationDistribution,
    ) {
        self.add_constraint(i, j, 0.0, f64::INFINITY);
        self.contingent.insert((i, j), distribution);
    }

    /// Removes the constraint between `i` and `j` (both edges).
    pub fn remove_constraint(&mut self, i: usize, j: usize) {
        self.edges.remove(&(i, j));
        self.edges.remove(&(j, i));
        self.contingent.remove(&(i, j));
        self.contingent.remove(&(j, i));
    }

    /// All constraints as `(i, j) -> (lower, upper)` with `i < j`.
    pub fn get_constraints(&self) -> BTreeMap<(usize, usize), (f64, f64)> {
        let mut constraints = BTreeMap::new();
        for &(i, j) in self.edges.keys() {
            if i < j {
                constraints.insert((i, j), (-self.get_edge_weight(j, i), self.get_edge_weight(i, j)));
            }
        }
        constraints
    }

    /// Contingent constraints keyed by `(trigger, target)`.
    pub fn get_contingent_constraints(&self) -> BTreeMap<(usize, usize), ContingentConstraint> {
        self.contingent
            .iter()
            .map(|(&(i, j), dist)| ((i, j), ContingentConstraint::new(i, j, dist.clone())))
            .collect()
    }

    /// Whether `(i, j)` or its reverse is a contingent pair.
    pub fn is_contingent(&self, i: usize, j: usize) -> bool {
        self.contingent.contains_key(&(i, j)) || self.contingent.contains_key(&(j, i))
    }

    /// Absolute window `[-w(i, 0), w(0, i)]` of node `i`.
    pub fn interval(&self, i: usize) -> (f64, f64) {
        (-self.get_edge_weight(i, 0), self.get_edge_weight(0, i))
    }

    /// Time between the earliest start of the first task timepoint and the
    /// earliest finish of the last.
    pub fn completion_time(&self) -> Option<f64> {
        let first = self.nodes().find(|&i| i > 0)?;
        let last = self.nodes().filter(|&i| i > 0).last()?;
        Some(-self.get_edge_weight(last, 0) - (-self.get_edge_weight(first, 0)))
    }

    /// Earliest finish time of the last task timepoint.
    pub fn makespan(&self) -> Option<f64> {
        let last = self.nodes().filter(|&i| i > 0).last()?;
        Some(-self.get_edge_weight(last, 0))
    }

    /// Shifts every node id `>= from_id` by `delta`, remapping edges and
    /// contingent constraints. Used when inserting or removing tasks.
    pub(crate) fn shift_nodes(&mut self, from_id: usize, delta: isize) {
        let remap = |id: usize| -> usize {
            if id >= from_id {
                (id as isize + delta) as usize
            } else {
                id
            }
        };
        self.nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|(id, tp)| (remap(id), tp))
            .collect();
        self.edges = std::mem::take(&mut self.edges)
            .into_iter()
            .map(|((i, j), w)| ((remap(i), remap(j)), w))
            .collect();
        self.contingent = std::mem::take(&mut self.contingent)
            .into_iter()
            .map(|((i, j), d)| ((remap(i), remap(j)), d))
            .collect();
    }

    /// Converts to the wire record representation.
    pub fn to_record(&self) -> NetworkRecord {
        let timepoints = self
            .nodes
            .iter()
            .map(|(&id, tp)| TimepointRecord {
                id,
                task_id: tp.task_id.clone(),
                kind: tp.kind,
            })
            .collect();

        let finite = |w: f64| w.is_finite().then_some(w);
        let mut constraints = Vec::new();
        for (&(i, j), _) in self.edges.iter().filter(|(&(i, j), _)| i < j) {
            constraints.push(ConstraintRecord {
                from: i,
                to: j,
                lower: finite(-self.get_edge_weight(j, i)),
                upper: finite(self.get_edge_weight(i, j)),
                distribution: self.contingent.get(&(i, j)).cloned(),
            });
        }
        // Edges whose forward direction is missing still carry a lower bound
        for (&(j, i), _) in self.edges.iter().filter(|(&(j, i), _)| j > i) {
            if !self.edges.contains_key(&(i, j)) {
                constraints.push(ConstraintRecord {
                    from: i,
                    to: j,
                    lower: finite(-self.get_edge_weight(j, i)),
                    upper: None,
                    distribution: self.contingent.get(&(i, j)).cloned(),
                });
            }
        }
        constraints.sort_by_key(|c| (c.from, c.to));

        NetworkRecord {
            timepoints,
            constraints,
            risk_metric: self.risk_metric,
        }
    }

    /// Rebuilds a network from its wire record representation.
    pub fn from_record(record: NetworkRecord) -> Self {
        let mut network = Self::new();
        for tp in record.timepoints {
            network.add_timepoint(
                tp.id,
                Timepoint {
                    task_id: tp.task_id,
                    kind: tp.kind,
                },
            );
        }
        for c in record.constraints {
            network.add_constraint(
                c.from,
                c.to,
                c.lower.unwrap_or(f64::NEG_INFINITY),
                c.upper.unwrap_or(f64::INFINITY),
            );
            if let Some(dist) = c.distribution {
                network.contingent.insert((c.from, c.to), dist);
            }
        }
        network.risk_metric = record.risk_metric;
        network
    }

    fn ensure_node(&mut self, id: usize) {
        self.nodes.entry(id).or_insert_with(Timepoint::generic);
    }
}

impl Default for TemporalNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl From<TemporalNetwork> for NetworkRecord {
    fn from(network: TemporalNetwork) -> Self {
        network.to_record()
    }
}

impl From<NetworkRecord> for TemporalNetwork {
    fn from(record: NetworkRecord) -> Self {
        TemporalNetwork::from_record(record)
    }
}

impl fmt::Display for TemporalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ((i, j), (lower, upper)) in self.get_constraints() {
            if i == 0 {
                writeln!(f, "Timepoint {j}: [{lower}, {upper}]")?;
            } else if let Some(dist) = self.contingent.get(&(i, j)) {
                writeln!(f, "Constraint {i} => {j}: [{lower}, {upper}] ({dist:?})")?;
            } else {
                writeln!(f, "Constraint {i} => {j}: [{lower}, {upper}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimepointKind;

    #[test]
    fn test_new_has_zero_timepoint() {
        let network = TemporalNetwork::new();
        assert_eq!(network.number_of_nodes(), 1);
        assert_eq!(network.timepoint(0).unwrap().kind, TimepointKind::Zero);
    }

    #[test]
    fn test_add_constraint_edge_pair() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 5.0, 20.0);

        assert_eq!(network.get_edge_weight(0, 1), 20.0);
        assert_eq!(network.get_edge_weight(1, 0), -5.0);
        assert_eq!(network.interval(1), (5.0, 20.0));
    }

    #[test]
    fn test_edge_weight_defaults() {
        let mut network = TemporalNetwork::new();
        network.add_timepoint(1, Timepoint::generic());

        // Diagonal of an existing node is zero
        assert_eq!(network.get_edge_weight(1, 1), 0.0);
        // Missing edge means no constraint
        assert_eq!(network.get_edge_weight(0, 1), f64::INFINITY);
    }

    #[test]
    fn test_update_edge_weight_tightens_only() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 20.0);

        network.update_edge_weight(0, 1, 30.0, false);
        assert_eq!(network.get_edge_weight(0, 1), 20.0);

        network.update_edge_weight(0, 1, 15.0, false);
        assert_eq!(network.get_edge_weight(0, 1), 15.0);
    }

    #[test]
    fn test_update_edge_weight_create() {
        let mut network = TemporalNetwork::new();
        network.add_timepoint(1, Timepoint::generic());

        network.update_edge_weight(0, 1, 12.0, false);
        assert!(!network.has_edge(0, 1));

        network.update_edge_weight(0, 1, 12.0, true);
        assert_eq!(network.get_edge_weight(0, 1), 12.0);
    }

    #[test]
    fn test_contingent_constraint() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(1, 2, DurationDistribution::gaussian(10.0, 2.0));

        assert!(network.has_edge(1, 2));
        assert!(network.has_edge(2, 1));
        assert!(network.is_contingent(1, 2));
        assert!(network.is_contingent(2, 1));

        let contingent = network.get_contingent_constraints();
        assert_eq!(contingent.len(), 1);
        assert_eq!(contingent[&(1, 2)].from, 1);
        assert_eq!(contingent[&(1, 2)].to, 2);
    }

    #[test]
    fn test_get_constraints_normalized() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 2.0, 8.0);
        network.add_constraint(1, 2, 0.0, 5.0);

        let constraints = network.get_constraints();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[&(0, 1)], (2.0, 8.0));
        assert_eq!(constraints[&(1, 2)], (0.0, 5.0));
    }

    #[test]
    fn test_remove_timepoint() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 10.0);
        network.add_contingent_constraint(1, 2, DurationDistribution::uniform(1.0, 2.0));

        network.remove_timepoint(1);
        assert!(!network.has_node(1));
        assert_eq!(network.number_of_edges(), 0);
        assert!(network.get_contingent_constraints().is_empty());
    }

    #[test]
    fn test_metrics_on_chain() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 5.0, 10.0);
        network.add_constraint(0, 2, 12.0, 20.0);

        assert_eq!(network.makespan(), Some(12.0));
        assert_eq!(network.completion_time(), Some(7.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 20.0);
        network.add_contingent_constraint(1, 2, DurationDistribution::uniform(8.0, 12.0));
        network.risk_metric = Some(0.05);

        let json = serde_json::to_string(&network).unwrap();
        let back: TemporalNetwork = serde_json::from_str(&json).unwrap();

        assert_eq!(back, network);
        assert_eq!(back.risk_metric, Some(0.05));
        assert!(back.is_contingent(1, 2));
    }
}
