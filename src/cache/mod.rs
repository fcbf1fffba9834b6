//! Per-evaluation memoization of derived thermal quantities.
//!
//! The core energy-balance coefficients share expensive sub-expressions -
//! above all the inner-core radius (a root-find) and its temperature
//! sensitivity (two root-finds). Within a single derivative evaluation those
//! are computed once and reused; across evaluations nothing may survive,
//! because the stepper is free to probe non-monotonic `(t, state)` points.
//!
//! The cache is therefore a plain value created at the top of each
//! evaluation and threaded down by `&mut`. It is never stored in a model
//! struct, which makes the scoping contract structural: a fresh call cannot
//! observe a stale value, and parallel evaluations (e.g. Jacobian columns)
//! cannot share state.

use std::collections::HashMap;

use crate::error::ModelError;

/// Oxides that can exsolve from the cooling core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Oxide {
    MgO,
    SiO2,
    FeO,
}

impl Oxide {
    pub const ALL: [Oxide; 3] = [Oxide::MgO, Oxide::SiO2, Oxide::FeO];
}

/// Names of cacheable derived quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Inner-core radius r_i (m)
    InnerCoreRadius,
    /// dr_i/dT_cmb (m/K), from a finite difference
    InnerCoreRadiusSensitivity,
    /// Adiabat temperature at the inner-core boundary (K)
    IcbTemperature,
    /// Per-kelvin secular-cooling coefficient (J/K)
    SecularCoefficient,
    /// Per-kelvin inner-core latent-heat coefficient (J/K)
    LatentCoefficient,
    /// Per-kelvin inner-core gravitational-energy coefficient (J/K)
    GravitationalCoefficient,
    /// Per-kelvin exsolution coefficient for one oxide (J/K)
    ExsolutionCoefficient(Oxide),
}

/// Lazy map from [`Quantity`] to its computed value, scoped to exactly one
/// derivative evaluation. Hit/miss counters are exposed so tests can verify
/// both the memoization and the isolation contract.
#[derive(Debug, Default)]
pub struct EvalCache {
    values: HashMap<Quantity, f64>,
    hits: u64,
    misses: u64,
}

impl EvalCache {
    /// Empty cache for a new evaluation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value for `key`, computing and storing it on first
    /// request. The closure receives the cache again so nested quantities
    /// (e.g. a coefficient needing the inner-core radius) share entries.
    pub fn get_or_compute<F>(&mut self, key: Quantity, compute: F) -> Result<f64, ModelError>
    where
        F: FnOnce(&mut EvalCache) -> Result<f64, ModelError>,
    {
        if let Some(value) = self.values.get(&key) {
            self.hits += 1;
            return Ok(*value);
        }
        self.misses += 1;
        let value = compute(self)?;
        self.values.insert(key, value);
        Ok(value)
    }

    /// Peek at a stored value without touching the counters.
    pub fn peek(&self, key: Quantity) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Number of lookups answered from the store.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that had to compute.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Force-recompute entry point: evaluates `compute` without consulting or
/// populating any cache.
///
/// Used for finite-difference probes - evaluating r_i at a perturbed
/// temperature must not overwrite the cached value for the unperturbed
/// state, and must not read it either.
pub fn compute_uncached<F>(compute: F) -> Result<f64, ModelError>
where
    F: FnOnce(&mut EvalCache) -> Result<f64, ModelError>,
{
    // A throwaway cache keeps nested get_or_compute calls working while
    // guaranteeing nothing leaks into the evaluation's cache.
    let mut scratch = EvalCache::new();
    compute(&mut scratch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache = EvalCache::new();
        let mut computed = 0;
        for _ in 0..3 {
            let v = cache
                .get_or_compute(Quantity::InnerCoreRadius, |_| {
                    computed += 1;
                    Ok(1221.0e3)
                })
                .unwrap();
            assert_eq!(v, 1221.0e3);
        }
        assert_eq!(computed, 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn nested_computation_shares_entries() {
        let mut cache = EvalCache::new();
        let v = cache
            .get_or_compute(Quantity::LatentCoefficient, |c| {
                let r = c.get_or_compute(Quantity::InnerCoreRadius, |_| Ok(2.0))?;
                Ok(3.0 * r)
            })
            .unwrap();
        assert_eq!(v, 6.0);
        assert_eq!(cache.peek(Quantity::InnerCoreRadius), Some(2.0));
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn uncached_probe_leaves_cache_untouched() {
        let mut cache = EvalCache::new();
        cache
            .get_or_compute(Quantity::InnerCoreRadius, |_| Ok(5.0))
            .unwrap();
        let probed =
            compute_uncached(|c| c.get_or_compute(Quantity::InnerCoreRadius, |_| Ok(7.0))).unwrap();
        assert_eq!(probed, 7.0);
        assert_eq!(cache.peek(Quantity::InnerCoreRadius), Some(5.0));
    }

    #[test]
    fn error_is_not_cached() {
        let mut cache = EvalCache::new();
        let err = cache.get_or_compute(Quantity::IcbTemperature, |_| {
            Err(ModelError::NonConvergence { iterations: 80 })
        });
        assert!(err.is_err());
        assert_eq!(cache.peek(Quantity::IcbTemperature), None);
        let ok = cache.get_or_compute(Quantity::IcbTemperature, |_| Ok(5500.0));
        assert_eq!(ok.unwrap(), 5500.0);
    }
}
