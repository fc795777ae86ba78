//! Per-sample input normalization.

use crate::sample::Tensor3;

/// Mean and standard deviation of one channel, ignoring NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f32,
    pub std: f32,
}

/// NaN-aware mean and population standard deviation of each channel.
///
/// A channel with no finite values reports NaN for both.
pub fn channel_stats(tensor: &Tensor3) -> Vec<ChannelStats> {
    (0..tensor.channels)
        .map(|c| {
            let values = tensor.channel(c).iter().filter(|v| !v.is_nan());
            let (count, sum) = values
                .clone()
                .fold((0usize, 0.0f64), |(n, s), &v| (n + 1, s + v as f64));
            if count == 0 {
                return ChannelStats {
                    mean: f32::NAN,
                    std: f32::NAN,
                };
            }
            let mean = sum / count as f64;
            let var = values.map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / count as f64;
            ChannelStats {
                mean: mean as f32,
                std: var.sqrt() as f32,
            }
        })
        .collect()
}

/// Z-score each channel in place: `(x - mean) / std`.
///
/// NaN stays NaN. A constant channel (std 0) is only centred.
pub fn z_score(tensor: &mut Tensor3) {
    let stats = channel_stats(tensor);
    for (c, s) in stats.into_iter().enumerate() {
        if s.mean.is_nan() {
            continue;
        }
        let scale = if s.std > f32::EPSILON { s.std } else { 1.0 };
        for v in tensor.channel_mut(c) {
            *v = (*v - s.mean) / scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_ignore_nan() {
        let t = Tensor3::from_planes(1, 4, vec![vec![1.0, 3.0, f32::NAN, 2.0]]);
        let stats = channel_stats(&t);
        assert!((stats[0].mean - 2.0).abs() < 1e-6);
        assert!((stats[0].std - (2.0f32 / 3.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_z_score_zero_mean_unit_std() {
        let mut t = Tensor3::from_planes(
            2,
            2,
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, f32::NAN, 30.0, 20.0]],
        );
        z_score(&mut t);
        for s in channel_stats(&t) {
            assert!(s.mean.abs() < 1e-5);
            assert!((s.std - 1.0).abs() < 1e-5);
        }
        assert!(t.get(1, 0, 1).is_nan());
    }

    #[test]
    fn test_constant_channel_is_centred() {
        let mut t = Tensor3::from_planes(1, 3, vec![vec![1.0, 1.0, 1.0]]);
        z_score(&mut t);
        assert_eq!(t.channel(0), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_all_nan_channel_untouched() {
        let mut t = Tensor3::from_planes(1, 2, vec![vec![f32::NAN, f32::NAN]]);
        z_score(&mut t);
        assert!(t.channel(0).iter().all(|v| v.is_nan()));
    }
}
