//! Per-index cumul domains and soft bounds.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Hard capacity of a dimension for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityLimit {
    /// No upper bound on the cumul value.
    Unbounded,
    /// Cumul values must stay at or below this value on every visit.
    AtMost(i64),
}

impl CapacityLimit {
    /// Maps `0` to [`Unbounded`](Self::Unbounded) and any other value to
    /// [`AtMost`](Self::AtMost).
    ///
    /// Command-line front ends often use zero to mean "no hard capacity";
    /// this makes that convention explicit at the call site.
    ///
    /// ```
    /// use u_routing_engine::dimension::CapacityLimit;
    ///
    /// assert_eq!(CapacityLimit::disabled_when_zero(0), CapacityLimit::Unbounded);
    /// assert_eq!(CapacityLimit::disabled_when_zero(80), CapacityLimit::AtMost(80));
    /// ```
    pub fn disabled_when_zero(value: i64) -> Self {
        if value == 0 {
            Self::Unbounded
        } else {
            Self::AtMost(value)
        }
    }

    /// The bound, if any.
    pub fn bound(self) -> Option<i64> {
        match self {
            Self::Unbounded => None,
            Self::AtMost(v) => Some(v),
        }
    }

    pub(crate) fn upper(self) -> i64 {
        self.bound().unwrap_or(i64::MAX)
    }
}

impl From<i64> for CapacityLimit {
    fn from(value: i64) -> Self {
        Self::AtMost(value)
    }
}

/// Closed interval of admissible cumul values at one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulRange {
    /// Smallest admissible value.
    pub min: i64,
    /// Largest admissible value.
    pub max: i64,
}

impl Default for CumulRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: i64::MAX,
        }
    }
}

impl CumulRange {
    /// Returns `true` if `value` lies in the interval.
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    fn intersect(&self, low: i64, high: i64) -> Option<Self> {
        let min = self.min.max(low);
        let max = self.max.min(high);
        (min <= max).then_some(Self { min, max })
    }
}

/// Linear penalty on a cumul value crossing a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftBound {
    /// Threshold.
    pub bound: i64,
    /// Cost per unit beyond the threshold.
    pub coefficient: i64,
}

impl SoftBound {
    /// Penalty for exceeding the threshold from above.
    pub fn upper_penalty(&self, cumul: i64) -> i64 {
        self.coefficient * (cumul - self.bound).max(0)
    }

    /// Penalty for falling short of the threshold from below.
    pub fn lower_penalty(&self, cumul: i64) -> i64 {
        self.coefficient * (self.bound - cumul).max(0)
    }
}

/// Mutable view of one index's cumul domain.
///
/// Obtained from [`Dimension::cumul_var`](super::Dimension::cumul_var).
/// Every narrowing call intersects with the current domain and fails as
/// soon as the domain would become empty.
#[derive(Debug)]
pub struct CumulVar<'a> {
    pub(super) dimension: &'a str,
    pub(super) index: usize,
    pub(super) range: &'a mut CumulRange,
}

impl CumulVar<'_> {
    /// Restricts the domain to `[low, high]`.
    pub fn set_range(&mut self, low: i64, high: i64) -> Result<(), RoutingError> {
        match self.range.intersect(low, high) {
            Some(narrowed) => {
                *self.range = narrowed;
                Ok(())
            }
            None => Err(RoutingError::EmptyCumulRange {
                dimension: self.dimension.to_string(),
                index: self.index,
                low,
                high,
            }),
        }
    }

    /// Raises the lower end of the domain.
    pub fn set_min(&mut self, low: i64) -> Result<(), RoutingError> {
        self.set_range(low, i64::MAX)
    }

    /// Lowers the upper end of the domain.
    pub fn set_max(&mut self, high: i64) -> Result<(), RoutingError> {
        self.set_range(i64::MIN, high)
    }

    /// Current domain.
    pub fn range(&self) -> CumulRange {
        *self.range
    }
}
