//! Input validation for temporal networks.
//!
//! Checks structural integrity of a network before solving. Detects:
//! - Missing zero (reference) timepoint
//! - Edges referencing unknown timepoints
//! - Constraints missing their reverse edge
//! - Contingent constraints with malformed distributions or missing edges
//!
//! Temporal inconsistency (negative cycles) is not a validation concern;
//! the path-consistency reduction detects it during solving.

use crate::models::{DurationDistribution, TemporalNetwork};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Node 0 is absent or not a zero timepoint.
    MissingZeroTimepoint,
    /// An edge references a timepoint that doesn't exist.
    UnknownTimepoint,
    /// A constraint lacks its reverse edge.
    MissingReverseEdge,
    /// A contingent constraint's distribution parameters are malformed.
    InvalidDistribution,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structure of a temporal network.
///
/// Checks:
/// 1. The zero timepoint (node 0) exists
/// 2. Every edge endpoint is a known timepoint
/// 3. Every edge has a matching reverse edge
/// 4. Every contingent constraint has both edges and a well-formed
///    distribution (finite parameters, positive spread)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_network(network: &TemporalNetwork) -> ValidationResult {
    let mut errors = Vec::new();

    if !network.has_node(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingZeroTimepoint,
            "Network has no zero timepoint (node 0)",
        ));
    }

    for ((i, j), _) in network.edges() {
        if !network.has_node(i) || !network.has_node(j) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTimepoint,
                format!("Edge ({i}, {j}) references an unknown timepoint"),
            ));
        }
        if !network.has_edge(j, i) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingReverseEdge,
                format!("Edge ({i}, {j}) has no reverse edge ({j}, {i})"),
            ));
        }
    }

    for ((i, j), constraint) in network.get_contingent_constraints() {
        if !network.has_edge(i, j) || !network.has_edge(j, i) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingReverseEdge,
                format!("Contingent constraint ({i}, {j}) is missing its edge pair"),
            ));
        }
        if let Some(err) = check_distribution(i, j, &constraint.distribution) {
            errors.push(err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_distribution(
    i: usize,
    j: usize,
    distribution: &DurationDistribution,
) -> Option<ValidationError> {
    match distribution {
        DurationDistribution::Gaussian { mean, std_dev } => {
            if !mean.is_finite() || !std_dev.is_finite() || *std_dev < 0.0 {
                return Some(ValidationError::new(
                    ValidationErrorKind::InvalidDistribution,
                    format!(
                        "Contingent constraint ({i}, {j}) has malformed Gaussian({mean}, {std_dev})"
                    ),
                ));
            }
        }
        DurationDistribution::Uniform { lower, upper } => {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Some(ValidationError::new(
                    ValidationErrorKind::InvalidDistribution,
                    format!(
                        "Contingent constraint ({i}, {j}) has malformed Uniform[{lower}, {upper}]"
                    ),
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DurationDistribution, Task, TimepointWindow};

    fn sample_network() -> TemporalNetwork {
        let mut network = TemporalNetwork::new();
        let task = Task::new(
            "T1",
            TimepointWindow::new(40.0, 50.0),
            DurationDistribution::gaussian(6.0, 1.0),
            DurationDistribution::gaussian(4.0, 1.0),
        );
        network.insert_task(&task, 1);
        network
    }

    #[test]
    fn test_valid_network() {
        assert!(validate_network(&sample_network()).is_ok());
    }

    #[test]
    fn test_hand_built_network_is_valid() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::gaussian(10.0, 2.0));
        network.update_edge_weight(0, 1, 20.0, false);
        assert!(validate_network(&network).is_ok());
    }

    #[test]
    fn test_missing_reverse_edge() {
        let mut network = sample_network();
        // Drop one direction of the wait constraint by re-adding only half
        network.remove_constraint(0, 1);
        network.update_edge_weight(0, 1, 44.0, true);

        let errors = validate_network(&network).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingReverseEdge));
    }

    #[test]
    fn test_malformed_gaussian() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::gaussian(10.0, -1.0));

        let errors = validate_network(&network).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDistribution));
    }

    #[test]
    fn test_malformed_uniform() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::uniform(12.0, 8.0));

        let errors = validate_network(&network).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDistribution));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut network = TemporalNetwork::new();
        network.add_contingent_constraint(0, 1, DurationDistribution::uniform(12.0, 8.0));
        // Half an edge between timepoints that were never added
        network.update_edge_weight(7, 8, 20.0, true);

        let errors = validate_network(&network).unwrap_err();
        assert!(errors.len() >= 3);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownTimepoint));
    }
}
