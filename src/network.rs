//! Network Interface
//!
//! What the core needs from a model: named parameters for norm summaries,
//! a serialisable state for the saver, and checkpoint loading for evaluation.

use crate::error::Result;
use std::path::Path;

/// One named parameter tensor, flattened
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameter {
    /// Dotted module path, e.g. `encoder.linear.weight`
    pub name: String,
    pub values: Vec<f32>,
    /// Gradient from the last backward pass, if any
    pub grad: Option<Vec<f32>>,
}

impl NamedParameter {
    pub fn new(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values,
            grad: None,
        }
    }

    pub fn with_grad(mut self, grad: Vec<f32>) -> Self {
        self.grad = Some(grad);
        self
    }

    /// L2 norm of the parameter values
    pub fn norm(&self) -> f64 {
        l2_norm(&self.values)
    }

    /// L2 norm of the gradient, when present
    pub fn grad_norm(&self) -> Option<f64> {
        self.grad.as_deref().map(l2_norm)
    }
}

fn l2_norm(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|&v| {
            let v = v as f64;
            v * v
        })
        .sum::<f64>()
        .sqrt()
}

/// A model whose parameters can be inspected and persisted.
pub trait Network {
    fn named_parameters(&self) -> Vec<NamedParameter>;

    /// Serialisable snapshot of the model state
    fn state(&self) -> Result<serde_json::Value>;
}

/// A model that can replace its weights from a saved checkpoint file.
pub trait LoadsCheckpoint {
    fn load_checkpoint(&mut self, path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norms() {
        let p = NamedParameter::new("fc.weight", vec![3.0, 4.0]);
        assert!((p.norm() - 5.0).abs() < 1e-9);
        assert_eq!(p.grad_norm(), None);

        let p = p.with_grad(vec![0.0, 2.0]);
        assert!((p.grad_norm().unwrap() - 2.0).abs() < 1e-9);
    }
}
