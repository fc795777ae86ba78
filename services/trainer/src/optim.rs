//! Stochastic gradient descent with momentum and weight decay.

use serde::{Deserialize, Serialize};

/// SGD hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SgdConfig {
    pub lr: f32,
    pub momentum: f32,
    pub weight_decay: f32,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            lr: 0.005,
            momentum: 0.9,
            weight_decay: 0.0005,
        }
    }
}

/// SGD state: the momentum buffer, created on the first step.
///
/// Each step computes `g = grad + weight_decay * p`, then
/// `v = momentum * v + g` (`v = g` on the first step) and `p -= lr * v`.
#[derive(Debug, Clone)]
pub struct Sgd {
    config: SgdConfig,
    velocity: Option<Vec<f32>>,
}

impl Sgd {
    pub fn new(config: SgdConfig) -> Self {
        Self {
            config,
            velocity: None,
        }
    }

    pub fn config(&self) -> &SgdConfig {
        &self.config
    }

    /// Update `params` in place.
    pub fn step(&mut self, params: &mut [f32], grad: &[f32]) {
        debug_assert_eq!(params.len(), grad.len());
        let SgdConfig {
            lr,
            momentum,
            weight_decay,
        } = self.config;

        let velocity = self.velocity.get_or_insert_with(Vec::new);
        let first = velocity.len() != params.len();
        if first {
            velocity.clear();
            velocity.resize(params.len(), 0.0);
        }

        for ((p, &g), v) in params.iter_mut().zip(grad).zip(velocity.iter_mut()) {
            let g = g + weight_decay * *p;
            *v = if first { g } else { momentum * *v + g };
            *p -= lr * *v;
        }
    }

    /// Drop the momentum buffer.
    pub fn reset(&mut self) {
        self.velocity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_step() {
        let mut sgd = Sgd::new(SgdConfig {
            lr: 0.1,
            momentum: 0.0,
            weight_decay: 0.0,
        });
        let mut p = vec![1.0, -1.0];
        sgd.step(&mut p, &[1.0, 2.0]);
        assert!((p[0] - 0.9).abs() < 1e-6);
        assert!((p[1] + 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_momentum_accumulates() {
        let mut sgd = Sgd::new(SgdConfig {
            lr: 1.0,
            momentum: 0.9,
            weight_decay: 0.0,
        });
        let mut p = vec![0.0];
        sgd.step(&mut p, &[1.0]);
        assert!((p[0] + 1.0).abs() < 1e-6);
        sgd.step(&mut p, &[1.0]);
        // v = 0.9 * 1 + 1
        assert!((p[0] + 2.9).abs() < 1e-6);
    }

    #[test]
    fn test_weight_decay_shrinks() {
        let mut sgd = Sgd::new(SgdConfig {
            lr: 0.5,
            momentum: 0.0,
            weight_decay: 0.1,
        });
        let mut p = vec![2.0];
        sgd.step(&mut p, &[0.0]);
        assert!((p[0] - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_defaults() {
        let c = SgdConfig::default();
        assert_eq!((c.lr, c.momentum, c.weight_decay), (0.005, 0.9, 0.0005));
    }
}
