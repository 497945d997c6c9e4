//! Optional visits: at most `k` of a set of indices, with a penalty for
//! every missing one.

use serde::Serialize;

/// A set of indices of which at most `max_cardinality` are performed.
///
/// When fewer are performed the objective pays
/// `penalty × (max_cardinality − active)`. A single-index disjunction makes
/// that index optional at cost `penalty`.
///
/// # Examples
///
/// ```
/// use u_routing_engine::constraint::Disjunction;
///
/// let d = Disjunction::new(vec![3, 4, 5], 100, 2);
/// assert_eq!(d.penalty_for(0), 200);
/// assert_eq!(d.penalty_for(1), 100);
/// assert_eq!(d.penalty_for(2), 0);
/// assert!(!d.allows(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disjunction {
    indices: Vec<usize>,
    penalty: i64,
    max_cardinality: usize,
}

impl Disjunction {
    /// Creates a disjunction. Validation happens in the model.
    pub fn new(indices: Vec<usize>, penalty: i64, max_cardinality: usize) -> Self {
        Self {
            indices,
            penalty,
            max_cardinality,
        }
    }

    /// Member indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Penalty per missing member.
    pub fn penalty(&self) -> i64 {
        self.penalty
    }

    /// Largest number of members that may be performed.
    pub fn max_cardinality(&self) -> usize {
        self.max_cardinality
    }

    /// Penalty owed when `active` members are performed.
    pub fn penalty_for(&self, active: usize) -> i64 {
        let missing = self.max_cardinality.saturating_sub(active);
        self.penalty * missing as i64
    }

    /// Returns `true` if `active` performed members respect the cardinality.
    pub fn allows(&self, active: usize) -> bool {
        active <= self.max_cardinality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_optional_node() {
        let d = Disjunction::new(vec![1], 50, 1);
        assert_eq!(d.penalty_for(0), 50);
        assert_eq!(d.penalty_for(1), 0);
        assert!(d.allows(1));
        assert!(!d.allows(2));
    }

    #[test]
    fn test_zero_penalty() {
        let d = Disjunction::new(vec![1, 2], 0, 1);
        assert_eq!(d.penalty_for(0), 0);
    }
}
