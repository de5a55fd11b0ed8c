//! Fixed-maximum feature scaling
//!
//! Every raw stat is divided by an assumed season maximum before it reaches
//! the model. Training and inference must share the same maxima, so they
//! live in exactly one place: [`FeatureScale::NBA`].

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::TeamStats;

/// Per-feature divisors, in model input order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScale {
    pub maxima: [f32; TeamStats::DIM],
}

impl FeatureScale {
    /// 82-game season, with generous ceilings for the per-game averages
    pub const NBA: FeatureScale = FeatureScale {
        maxima: [82.0, 82.0, 120.0, 50.0, 30.0],
    };

    /// Scale a raw feature vector into (roughly) [0, 1]
    pub fn normalize(&self, raw: &[f32; TeamStats::DIM]) -> [f32; TeamStats::DIM] {
        let mut out = [0.0; TeamStats::DIM];
        for (i, v) in raw.iter().enumerate() {
            out[i] = v / self.maxima[i];
        }
        out
    }

    /// Inverse of [`normalize`](Self::normalize)
    pub fn denormalize(&self, scaled: &[f32; TeamStats::DIM]) -> [f32; TeamStats::DIM] {
        let mut out = [0.0; TeamStats::DIM];
        for (i, v) in scaled.iter().enumerate() {
            out[i] = v * self.maxima[i];
        }
        out
    }

    /// Normalized model input for a team
    pub fn normalize_stats(&self, stats: &TeamStats) -> [f32; TeamStats::DIM] {
        self.normalize(&stats.to_features())
    }

    /// Normalize a [batch, DIM] tensor of raw features
    pub fn normalize_tensor<B: Backend>(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = features.device();
        let maxima = Tensor::<B, 1>::from_floats(self.maxima.as_slice(), &device).unsqueeze_dim(0);
        features / maxima
    }
}

impl Default for FeatureScale {
    fn default() -> Self {
        Self::NBA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_normalize_known_values() {
        let stats = TeamStats {
            wins: 41,
            losses: 41,
            points_per_game: 60.0,
            rebounds_per_game: 25.0,
            assists_per_game: 15.0,
        };
        let scaled = FeatureScale::NBA.normalize_stats(&stats);
        for v in scaled {
            assert!((v - 0.5).abs() < 1e-6, "expected 0.5, got {}", v);
        }
    }

    #[test]
    fn test_denormalize_inverts_normalize() {
        let scale = FeatureScale::NBA;
        let samples = [
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.634, 0.366, 0.934, 0.886, 0.84],
            [1.0, 1.0, 1.0, 1.0, 1.0],
            [0.25, 0.75, 0.5, 0.1, 0.9],
        ];
        for x in samples {
            let round_trip = scale.normalize(&scale.denormalize(&x));
            for (a, b) in x.iter().zip(round_trip.iter()) {
                assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
            }
        }
    }

    #[test]
    fn test_tensor_matches_scalar_path() {
        let device = Default::default();
        let stats = TeamStats {
            wins: 50,
            losses: 32,
            points_per_game: 110.0,
            rebounds_per_game: 44.0,
            assists_per_game: 25.0,
        };
        let raw = stats.to_features();
        let tensor = Tensor::<TestBackend, 1>::from_floats(raw.as_slice(), &device).unsqueeze_dim(0);

        let scaled = FeatureScale::NBA.normalize_tensor(tensor).into_data();
        let scaled: &[f32] = scaled.as_slice().unwrap();
        let expected = FeatureScale::NBA.normalize(&raw);

        for (a, b) in scaled.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
