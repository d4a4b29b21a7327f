//! Objective evaluation cache
//!
//! Minimizers routinely ask for the value and the gradient at the same
//! point in consecutive calls. Both come out of one data pass, so the
//! last few evaluations are memoized keyed by the weight vector; any new
//! point simply misses and recomputes.

use crate::core::{Evaluation, Objective, Result};
use lru::LruCache;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// LRU cache of objective evaluations keyed by the weight vector
pub struct EvaluationCache {
    cache: LruCache<u64, (Vec<f64>, Evaluation)>,
    hits: u64,
    misses: u64,
}

fn hash_point(x: &[f64]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for &w in x {
        w.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

impl EvaluationCache {
    /// Create a cache holding up to `capacity` evaluations
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up the evaluation for `x`.
    ///
    /// The stored point is compared bit-for-bit, so a hash collision can
    /// not return a stale evaluation.
    pub fn get(&mut self, x: &[f64]) -> Option<Evaluation> {
        match self.cache.get(&hash_point(x)) {
            Some((stored, eval)) if stored.as_slice() == x => {
                self.hits += 1;
                Some(eval.clone())
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the evaluation for `x`
    pub fn put(&mut self, x: &[f64], eval: Evaluation) {
        self.cache.put(hash_point(x), (x.to_vec(), eval));
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        // Two entries cover the minimizer's value-then-gradient pattern
        // plus one line-search probe
        Self::new(2)
    }
}

/// Objective wrapper that memoizes evaluations through an `EvaluationCache`
pub struct CachingObjective<O: Objective> {
    inner: O,
    cache: RefCell<EvaluationCache>,
}

impl<O: Objective> CachingObjective<O> {
    /// Wrap `inner` with a default-size cache
    pub fn new(inner: O) -> Self {
        Self::with_capacity(inner, 2)
    }

    /// Wrap `inner` with a cache of the given capacity
    pub fn with_capacity(inner: O, capacity: usize) -> Self {
        Self {
            inner,
            cache: RefCell::new(EvaluationCache::new(capacity)),
        }
    }

    /// Fraction of evaluations served from cache
    pub fn hit_rate(&self) -> f64 {
        self.cache.borrow().hit_rate()
    }

    /// Unwrap the inner objective
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Objective> Objective for CachingObjective<O> {
    fn domain_dimension(&self) -> usize {
        self.inner.domain_dimension()
    }

    fn calculate(&self, x: &[f64]) -> Result<Evaluation> {
        if let Some(eval) = self.cache.borrow_mut().get(x) {
            return Ok(eval);
        }
        let eval = self.inner.calculate(x)?;
        self.cache.borrow_mut().put(x, eval.clone());
        Ok(eval)
    }
}
