//! Learned preference weights with multiplicative updates.
//!
//! Shared by the tiling engine (keyed by algorithm name) and the snap manager
//! (keyed by zone id). After every update the weights are renormalised so
//! they always sum to 1.

use std::collections::BTreeMap;

use rand::Rng;

/// Multiplier applied to a key after a successful run.
pub const SUCCESS_FACTOR: f64 = 1.1;

/// Extra multiplier for a successful run that finished quickly.
pub const FAST_BONUS_FACTOR: f64 = 1.05;

/// Multiplier applied to a key after a failed run.
pub const FAILURE_FACTOR: f64 = 0.9;

/// Outcome fed into [`WeightTable::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The run succeeded.
    Success,
    /// The run succeeded under the fast-run threshold.
    FastSuccess,
    /// The run failed.
    Failure,
}

impl Outcome {
    /// Returns the multiplicative factor for this outcome.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Success => SUCCESS_FACTOR,
            Self::FastSuccess => SUCCESS_FACTOR * FAST_BONUS_FACTOR,
            Self::Failure => FAILURE_FACTOR,
        }
    }
}

/// Normalised weight per key.
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    weights: BTreeMap<String, f64>,
}

impl WeightTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self { Self { weights: BTreeMap::new() } }

    /// Adds a key with the average current weight and renormalises.
    ///
    /// Existing keys are left untouched.
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.weights.contains_key(&key) {
            return;
        }
        let initial = if self.weights.is_empty() {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let average = self.weights.values().sum::<f64>() / self.weights.len() as f64;
            average
        };
        self.weights.insert(key, initial);
        self.normalize();
    }

    /// Removes a key and renormalises the rest.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.weights.remove(key).is_some();
        if removed {
            self.normalize();
        }
        removed
    }

    /// Applies an outcome to `key` and renormalises.
    ///
    /// Unknown keys are inserted first.
    pub fn record(&mut self, key: &str, outcome: Outcome) {
        if !self.weights.contains_key(key) {
            self.insert(key);
        }
        if let Some(weight) = self.weights.get_mut(key) {
            *weight *= outcome.factor();
        }
        self.normalize();
    }

    /// Rescales all weights to sum to 1.
    ///
    /// A table whose weights collapsed to zero (or became non-finite) is reset
    /// to a uniform distribution.
    pub fn normalize(&mut self) {
        if self.weights.is_empty() {
            return;
        }
        let total: f64 = self.weights.values().sum();
        if total.is_finite() && total > f64::MIN_POSITIVE {
            for weight in self.weights.values_mut() {
                *weight /= total;
            }
        } else {
            #[allow(clippy::cast_precision_loss)]
            let uniform = 1.0 / self.weights.len() as f64;
            for weight in self.weights.values_mut() {
                *weight = uniform;
            }
        }
    }

    /// Returns the weight for `key`, if known.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> { self.weights.get(key).copied() }

    /// Sum of all weights (1 after any update, within float tolerance).
    #[must_use]
    pub fn total(&self) -> f64 { self.weights.values().sum() }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize { self.weights.len() }

    /// Returns `true` if the table has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    /// Copies the weights out, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, f64> { self.weights.clone() }

    /// Picks a key at random, proportionally to its weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let total = self.total();
        if self.weights.is_empty() || total <= 0.0 {
            return None;
        }
        let mut target = rng.random::<f64>() * total;
        for (key, weight) in &self.weights {
            if target < *weight {
                return Some(key.as_str());
            }
            target -= weight;
        }
        // Float rounding can leave a sliver past the last bucket.
        self.weights.keys().next_back().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn table(keys: &[&str]) -> WeightTable {
        let mut table = WeightTable::new();
        for key in keys {
            table.insert(*key);
        }
        table
    }

    #[test]
    fn test_insert_is_uniform() {
        let table = table(&["a", "b", "c", "d"]);
        for key in ["a", "b", "c", "d"] {
            assert!((table.get(key).unwrap() - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_success_raises_and_failure_lowers() {
        let mut table = table(&["a", "b"]);
        table.record("a", Outcome::Success);
        assert!(table.get("a").unwrap() > table.get("b").unwrap());

        let mut table = table_after_failure();
        assert!(table.get("a").unwrap() < table.get("b").unwrap());
        table.record("b", Outcome::FastSuccess);
        assert!(table.get("b").unwrap() > 0.5);
    }

    fn table_after_failure() -> WeightTable {
        let mut table = table(&["a", "b"]);
        table.record("a", Outcome::Failure);
        table
    }

    #[test]
    fn test_weights_sum_to_one_after_any_sequence() {
        let mut table = table(&["master", "grid", "dwindle", "columns"]);
        let outcomes = [Outcome::Success, Outcome::Failure, Outcome::FastSuccess];
        let keys = ["master", "grid", "dwindle", "columns", "rows"];
        for i in 0..500 {
            table.record(keys[i % keys.len()], outcomes[(i * 7) % outcomes.len()]);
            assert!((table.total() - 1.0).abs() < 1e-9, "sum drifted at step {i}");
        }
    }

    #[test]
    fn test_fast_success_factor() {
        let mut table = table(&["a", "b"]);
        table.record("a", Outcome::FastSuccess);
        // a: 0.5 * 1.155, b: 0.5 -> a / b == 1.155
        let ratio = table.get("a").unwrap() / table.get("b").unwrap();
        assert!((ratio - 1.155).abs() < 1e-9);
    }

    #[test]
    fn test_remove_renormalizes() {
        let mut table = table(&["a", "b", "c"]);
        assert!(table.remove("c"));
        assert!(!table.remove("c"));
        assert!((table.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pick_respects_weights() {
        let mut table = table(&["heavy", "light"]);
        for _ in 0..40 {
            table.record("heavy", Outcome::Success);
            table.record("light", Outcome::Failure);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let heavy = (0..1000).filter(|_| table.pick(&mut rng) == Some("heavy")).count();
        assert!(heavy > 900);
    }

    #[test]
    fn test_pick_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(WeightTable::new().pick(&mut rng).is_none());
    }
}
