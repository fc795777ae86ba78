//! Trainable models.
//!
//! The training loop only needs a flat parameter vector, a loss and its
//! gradient; [`Model`] is that seam. [`PixelClassifier`] is the built-in
//! baseline: a per-pixel softmax regression over the input channels with an
//! image-level head sharing the same weights.

use std::collections::BTreeMap;
use std::fmt;

use dataset::{Batch, Sample, INPUT_CHANNELS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Output classes: background, not a closed ring, closed ring.
pub const NUM_CLASSES: usize = 3;

/// Named loss terms of one forward pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossDict(BTreeMap<String, f32>);

impl LossDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f32) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }

    /// Sum of all terms.
    pub fn total(&self) -> f32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for LossDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}={:.4}", name, value)?;
        }
        Ok(())
    }
}

/// A model trained by gradient descent on batches of samples.
pub trait Model: Send + Sync {
    /// Short identifier stored in checkpoints.
    fn name(&self) -> &str;

    fn parameters(&self) -> &[f32];

    fn parameters_mut(&mut self) -> &mut [f32];

    /// Loss terms on `batch` without gradients.
    fn loss(&self, batch: &Batch) -> LossDict;

    /// Loss terms and the gradient of their total with respect to
    /// [`Model::parameters`].
    fn loss_and_grad(&self, batch: &Batch) -> (LossDict, Vec<f32>);
}

/// Softmax regression from the input channels to [`NUM_CLASSES`].
///
/// Parameters are a `NUM_CLASSES × INPUT_CHANNELS` weight matrix followed by
/// `NUM_CLASSES` biases. Two loss terms:
///
/// - `loss_mask`: cross-entropy of every pixel against the segmentation mask
/// - `loss_classifier`: cross-entropy of the logits of the channel means
///   against the sample class (`label + 1`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelClassifier {
    params: Vec<f32>,
}

const WEIGHTS: usize = NUM_CLASSES * INPUT_CHANNELS;

impl Default for PixelClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelClassifier {
    /// All-zero parameters: uniform predictions.
    pub fn new() -> Self {
        Self {
            params: vec![0.0; WEIGHTS + NUM_CLASSES],
        }
    }

    /// Restore from a parameter vector of the right length.
    pub fn from_parameters(params: Vec<f32>) -> Option<Self> {
        (params.len() == WEIGHTS + NUM_CLASSES).then_some(Self { params })
    }

    fn logits(&self, x: &[f32; INPUT_CHANNELS]) -> [f32; NUM_CLASSES] {
        let mut z = [0.0; NUM_CLASSES];
        for (k, zk) in z.iter_mut().enumerate() {
            let w = &self.params[k * INPUT_CHANNELS..(k + 1) * INPUT_CHANNELS];
            *zk = self.params[WEIGHTS + k] + w.iter().zip(x).map(|(w, x)| w * x).sum::<f32>();
        }
        z
    }

    /// Per-pixel class predictions for one sample.
    pub fn predict(&self, sample: &Sample) -> Vec<usize> {
        let pixels = sample.data.height * sample.data.width;
        (0..pixels)
            .map(|i| argmax(&self.logits(&pixel(sample, i))))
            .collect()
    }

    fn sample_terms(&self, sample: &Sample, with_grad: bool) -> SampleTerms {
        let pixels = sample.data.height * sample.data.width;
        let mut grad = if with_grad {
            vec![0.0; self.params.len()]
        } else {
            Vec::new()
        };

        let mut mask_ce = 0.0f64;
        let mut mean = [0.0f32; INPUT_CHANNELS];
        for i in 0..pixels {
            let x = pixel(sample, i);
            for (m, v) in mean.iter_mut().zip(&x) {
                *m += v / pixels as f32;
            }

            let target = sample.mask.classes[i].clamp(0, NUM_CLASSES as i64 - 1) as usize;
            let p = softmax(&self.logits(&x));
            mask_ce -= (p[target].max(f32::MIN_POSITIVE) as f64).ln();
            if with_grad {
                accumulate(&mut grad, &p, target, &x);
            }
        }

        let target = sample.label.class_index().map_or(0, |c| c as usize + 1);
        let p = softmax(&self.logits(&mean));
        let class_ce = -(p[target].max(f32::MIN_POSITIVE) as f64).ln();
        SampleTerms {
            mask_ce,
            class_ce,
            pixels,
            grad,
            class_grad: with_grad.then(|| {
                let mut g = vec![0.0; self.params.len()];
                accumulate(&mut g, &p, target, &mean);
                g
            }),
        }
    }

    fn batch_terms(&self, batch: &Batch, with_grad: bool) -> (LossDict, Vec<f32>) {
        let terms: Vec<SampleTerms> = batch
            .samples
            .par_iter()
            .map(|s| self.sample_terms(s, with_grad))
            .collect();

        let n_pixels: usize = terms.iter().map(|t| t.pixels).sum();
        let n_samples = terms.len();
        let mut losses = LossDict::new();
        if n_samples == 0 || n_pixels == 0 {
            return (losses, vec![0.0; self.params.len()]);
        }

        let mask_ce: f64 = terms.iter().map(|t| t.mask_ce).sum();
        let class_ce: f64 = terms.iter().map(|t| t.class_ce).sum();
        losses.insert("loss_mask", (mask_ce / n_pixels as f64) as f32);
        losses.insert("loss_classifier", (class_ce / n_samples as f64) as f32);

        let mut grad = vec![0.0; self.params.len()];
        if with_grad {
            for t in &terms {
                for (g, v) in grad.iter_mut().zip(&t.grad) {
                    *g += v / n_pixels as f32;
                }
                if let Some(class_grad) = &t.class_grad {
                    for (g, v) in grad.iter_mut().zip(class_grad) {
                        *g += v / n_samples as f32;
                    }
                }
            }
        }
        (losses, grad)
    }
}

impl Model for PixelClassifier {
    fn name(&self) -> &str {
        "pixel_classifier"
    }

    fn parameters(&self) -> &[f32] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    fn loss(&self, batch: &Batch) -> LossDict {
        self.batch_terms(batch, false).0
    }

    fn loss_and_grad(&self, batch: &Batch) -> (LossDict, Vec<f32>) {
        self.batch_terms(batch, true)
    }
}

struct SampleTerms {
    mask_ce: f64,
    class_ce: f64,
    pixels: usize,
    grad: Vec<f32>,
    class_grad: Option<Vec<f32>>,
}

/// Input channels at flat pixel index `i`.
fn pixel(sample: &Sample, i: usize) -> [f32; INPUT_CHANNELS] {
    let plane = sample.data.height * sample.data.width;
    let mut x = [0.0; INPUT_CHANNELS];
    for (c, v) in x.iter_mut().enumerate() {
        *v = sample.data.data[c * plane + i];
    }
    x
}

fn softmax(z: &[f32; NUM_CLASSES]) -> [f32; NUM_CLASSES] {
    let max = z.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut p = [0.0; NUM_CLASSES];
    let mut sum = 0.0;
    for (pk, zk) in p.iter_mut().zip(z) {
        *pk = (zk - max).exp();
        sum += *pk;
    }
    p.iter_mut().for_each(|pk| *pk /= sum);
    p
}

fn argmax(z: &[f32; NUM_CLASSES]) -> usize {
    z.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (k, &v)| if v > best.1 { (k, v) } else { best })
        .0
}

/// Add `(p - onehot(target)) ⊗ [x, 1]` to `grad`.
fn accumulate(grad: &mut [f32], p: &[f32; NUM_CLASSES], target: usize, x: &[f32; INPUT_CHANNELS]) {
    for k in 0..NUM_CLASSES {
        let dz = p[k] - if k == target { 1.0 } else { 0.0 };
        for (c, xc) in x.iter().enumerate() {
            grad[k * INPUT_CHANNELS + c] += dz * xc;
        }
        grad[WEIGHTS + k] += dz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::{DetectionTarget, SegmentationMask, Tensor3, Window};
    use ring_common::Label;

    /// 2×2 sample: left column background, right column foreground.
    fn sample(label: Label) -> Sample {
        let fg = label.class_index().unwrap_or(0) + 1;
        Sample {
            index: 0,
            file_name: "s.json".to_string(),
            label,
            window: Window {
                rows: 0..2,
                cols: 0..2,
                target_row: 0,
                target_col: 1,
            },
            data: Tensor3::from_planes(
                2,
                2,
                vec![vec![-1.0, 1.0, -1.0, 1.0], vec![0.5, -0.5, 0.5, -0.5], vec![1.0; 4]],
            ),
            mask: SegmentationMask {
                height: 2,
                width: 2,
                classes: vec![0, fg, 0, fg],
            },
            detection: DetectionTarget {
                boxes: vec![[1.0, 0.0, 1.0, 1.0]],
                labels: vec![fg - 1],
            },
        }
    }

    fn batch() -> Batch {
        Batch {
            samples: vec![sample(Label::ClosedRing), sample(Label::NotClosedRing)],
        }
    }

    #[test]
    fn test_uniform_start_loss() {
        let model = PixelClassifier::new();
        let losses = model.loss(&batch());
        let ln3 = 3f32.ln();
        assert!((losses.get("loss_mask").unwrap() - ln3).abs() < 1e-5);
        assert!((losses.get("loss_classifier").unwrap() - ln3).abs() < 1e-5);
        assert!((losses.total() - 2.0 * ln3).abs() < 1e-5);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let mut model = PixelClassifier::new();
        for (i, p) in model.parameters_mut().iter_mut().enumerate() {
            *p = (i as f32 * 0.37).sin() * 0.3;
        }
        let b = batch();
        let (_, grad) = model.loss_and_grad(&b);

        let eps = 1e-3;
        for i in 0..model.parameters().len() {
            let mut plus = model.clone();
            plus.parameters_mut()[i] += eps;
            let mut minus = model.clone();
            minus.parameters_mut()[i] -= eps;
            let numeric = (plus.loss(&b).total() - minus.loss(&b).total()) / (2.0 * eps);
            assert!(
                (numeric - grad[i]).abs() < 2e-3,
                "param {}: numeric {} analytic {}",
                i,
                numeric,
                grad[i]
            );
        }
    }

    #[test]
    fn test_empty_batch() {
        let model = PixelClassifier::new();
        let (losses, grad) = model.loss_and_grad(&Batch::default());
        assert_eq!(losses.total(), 0.0);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_from_parameters_checks_length() {
        assert!(PixelClassifier::from_parameters(vec![0.0; 12]).is_some());
        assert!(PixelClassifier::from_parameters(vec![0.0; 11]).is_none());
    }

    #[test]
    fn test_loss_dict_display() {
        let mut d = LossDict::new();
        d.insert("b", 0.5);
        d.insert("a", 0.25);
        assert_eq!(d.to_string(), "a=0.2500 b=0.5000");
    }
}
