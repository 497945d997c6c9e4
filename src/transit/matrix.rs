//! Dense integer transit matrix.

use rayon::prelude::*;

/// A dense n×n matrix of integer transit values stored in row-major order.
///
/// Used both for caller-supplied node matrices and for the memoized tables
/// the registry builds when a model closes.
///
/// # Examples
///
/// ```
/// use u_routing_engine::transit::TransitMatrix;
///
/// let m = TransitMatrix::from_fn(3, |i, j| (i as i64 - j as i64).abs() * 10);
/// assert_eq!(m.get(0, 2), 20);
/// assert_eq!(m.size(), 3);
/// assert!(m.is_symmetric());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitMatrix {
    data: Vec<i64>,
    size: usize,
}

impl TransitMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Creates a matrix by evaluating `f` on every ordered pair.
    pub fn from_fn<F>(size: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> i64,
    {
        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                data.push(f(i, j));
            }
        }
        Self { data, size }
    }

    /// Creates a matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<i64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the value for the ordered pair `(from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Sets the value for the ordered pair `(from, to)`.
    pub fn set(&mut self, from: usize, to: usize, value: i64) {
        self.data[from * self.size + to] = value;
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if `get(i, j) == get(j, i)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if self.get(i, j) != self.get(j, i) {
                    return false;
                }
            }
        }
        true
    }

    /// Overwrites every entry with `f(from, to)`, one row per rayon task.
    pub(crate) fn par_fill<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> i64 + Sync,
    {
        if self.size == 0 {
            return;
        }
        let size = self.size;
        self.data
            .par_chunks_mut(size)
            .enumerate()
            .for_each(|(from, row)| {
                for (to, cell) in row.iter_mut().enumerate() {
                    *cell = f(from, to);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        let m = TransitMatrix::from_data(2, vec![0, 5, 7, 0]).expect("valid");
        assert_eq!(m.get(0, 1), 5);
        assert_eq!(m.get(1, 0), 7);
        assert!(!m.is_symmetric());
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(TransitMatrix::from_data(2, vec![0, 1, 2]).is_none());
    }

    #[test]
    fn test_set_get() {
        let mut m = TransitMatrix::new(3);
        m.set(0, 1, 42);
        assert_eq!(m.get(0, 1), 42);
        assert_eq!(m.get(1, 0), 0);
    }

    #[test]
    fn test_par_fill_matches_from_fn() {
        let mut m = TransitMatrix::new(4);
        m.par_fill(|i, j| (i * 10 + j) as i64);
        assert_eq!(m, TransitMatrix::from_fn(4, |i, j| (i * 10 + j) as i64));
    }

    #[test]
    fn test_negative_values() {
        let m = TransitMatrix::from_fn(2, |i, j| i as i64 - j as i64);
        assert_eq!(m.get(0, 1), -1);
        assert_eq!(m.get(1, 0), 1);
    }
}
