//! Append-only table of transit callbacks keyed by handle.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::TransitMatrix;

/// Largest dense table (in entries) built when memoizing a callback.
pub const MAX_CACHED_ENTRIES: usize = 4 << 20;

/// Shared transit function of `(from_index, to_index)`.
///
/// Must be pure and reentrant: the search evaluates it from several rayon
/// workers at once.
pub type TransitFn = Arc<dyn Fn(usize, usize) -> i64 + Send + Sync>;

/// Stable reference to a registered transit callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitHandle(usize);

impl TransitHandle {
    /// Raw registration number.
    pub fn value(self) -> usize {
        self.0
    }
}

struct Entry {
    callback: TransitFn,
    cache: Option<TransitMatrix>,
}

/// Registry of transit callbacks owned by one routing model.
///
/// Identical callbacks registered twice get two handles; callers reuse
/// handles themselves.
///
/// # Examples
///
/// ```
/// use u_routing_engine::transit::TransitRegistry;
///
/// let mut registry = TransitRegistry::new();
/// let a = registry.register(|i, j| (i + j) as i64);
/// let b = registry.register(|i, j| (i + j) as i64);
/// assert_ne!(a, b);
/// assert_eq!(registry.evaluate(a, 2, 3), 5);
/// ```
#[derive(Default)]
pub struct TransitRegistry {
    entries: Vec<Entry>,
}

impl TransitRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binary transit callback.
    pub fn register<F>(&mut self, callback: F) -> TransitHandle
    where
        F: Fn(usize, usize) -> i64 + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(callback))
    }

    /// Registers a callback that only depends on the origin index.
    pub fn register_unary<F>(&mut self, callback: F) -> TransitHandle
    where
        F: Fn(usize) -> i64 + Send + Sync + 'static,
    {
        self.register(move |from, _| callback(from))
    }

    /// Registers an already shared callback.
    pub fn register_shared(&mut self, callback: TransitFn) -> TransitHandle {
        self.entries.push(Entry {
            callback,
            cache: None,
        });
        TransitHandle(self.entries.len() - 1)
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `handle` was issued by this registry.
    pub fn contains(&self, handle: TransitHandle) -> bool {
        handle.0 < self.entries.len()
    }

    /// Evaluates the callback behind `handle` on `(from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not issued by this registry.
    #[inline]
    pub fn evaluate(&self, handle: TransitHandle, from: usize, to: usize) -> i64 {
        let entry = &self.entries[handle.0];
        match &entry.cache {
            Some(table) => table.get(from, to),
            None => (entry.callback)(from, to),
        }
    }

    /// Tabulates every callback whose dense table over `num_indices` fits
    /// in [`MAX_CACHED_ENTRIES`]. Already tabulated callbacks are skipped.
    pub fn memoize(&mut self, num_indices: usize) {
        let entries = num_indices.saturating_mul(num_indices);
        if entries > MAX_CACHED_ENTRIES {
            debug!(
                event = "memoize_skipped",
                num_indices = num_indices,
                limit = MAX_CACHED_ENTRIES
            );
            return;
        }
        self.entries
            .par_iter_mut()
            .filter(|entry| entry.cache.is_none())
            .for_each(|entry| {
                let mut table = TransitMatrix::new(num_indices);
                let callback = &entry.callback;
                table.par_fill(|from, to| callback(from, to));
                entry.cache = Some(table);
            });
        debug!(
            event = "memoized",
            callbacks = self.entries.len(),
            num_indices = num_indices
        );
    }
}

impl std::fmt::Debug for TransitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitRegistry")
            .field("callbacks", &self.entries.len())
            .field(
                "memoized",
                &self.entries.iter().filter(|e| e.cache.is_some()).count(),
            )
            .finish()
    }
}
