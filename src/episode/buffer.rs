//! Per-slot running reward sums.

/// One running reward sum per environment slot, zeroed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBuffer {
    values: Vec<f64>,
}

impl RewardBuffer {
    pub fn new(nb_env: usize) -> Self {
        Self {
            values: vec![0.0; nb_env],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, slot: usize) -> f64 {
        self.values[slot]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn add(&mut self, slot: usize, reward: f64) {
        self.values[slot] += reward;
    }

    /// Return the slot's sum and reset it to zero.
    pub fn take(&mut self, slot: usize) -> f64 {
        std::mem::take(&mut self.values[slot])
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn mean(&self) -> Option<f64> {
        mean(&self.values)
    }

    pub fn std_dev(&self) -> Option<f64> {
        std_dev(&self.values)
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}
