use std::collections::HashMap;

/// Manual probability overrides for specific matchups.
///
/// Overrides are stored with team ids in lexicographic order. When looked up
/// with the teams reversed, the probability is flipped automatically.
#[derive(Clone, Debug, Default)]
pub struct OverridesMap {
    overrides: HashMap<(String, String), f64>,
}

impl OverridesMap {
    pub fn new() -> Self {
        OverridesMap {
            overrides: HashMap::new(),
        }
    }

    /// Add or update an override: `prob` is the probability of `id1`
    /// beating `id2`.
    pub fn add_override(&mut self, id1: &str, id2: &str, prob: f64) {
        let (key, value) = if id1 < id2 {
            ((id1.to_string(), id2.to_string()), prob)
        } else {
            ((id2.to_string(), id1.to_string()), 1.0 - prob)
        };
        self.overrides.insert(key, value);
    }

    pub fn remove_override(&mut self, id1: &str, id2: &str) {
        let key = if id1 < id2 {
            (id1.to_string(), id2.to_string())
        } else {
            (id2.to_string(), id1.to_string())
        };
        self.overrides.remove(&key);
    }

    /// Probability of `id1` beating `id2`, if an override exists.
    pub fn get(&self, id1: &str, id2: &str) -> Option<f64> {
        let (key, flip) = if id1 < id2 {
            ((id1.to_string(), id2.to_string()), false)
        } else {
            ((id2.to_string(), id1.to_string()), true)
        };
        self.overrides
            .get(&key)
            .map(|&p| if flip { 1.0 - p } else { p })
    }

    pub fn has_override(&self, id1: &str, id2: &str) -> bool {
        self.get(id1, id2).is_some()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
