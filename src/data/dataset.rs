//! Burn Dataset implementation for NBA team statistics
//!
//! The 2021-22 regular season table is embedded; it is the only training data.

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::features::FeatureScale;
use crate::{HoopsError, Result, TeamStats};

/// One row of the embedded season table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetRow {
    pub wins: u32,
    pub losses: u32,
    pub points_per_game: f32,
    pub rebounds_per_game: f32,
    pub assists_per_game: f32,
    pub win_pct: f32,
}

const fn row(wins: u32, losses: u32, ppg: f32, rpg: f32, apg: f32, win_pct: f32) -> DatasetRow {
    DatasetRow {
        wins,
        losses,
        points_per_game: ppg,
        rebounds_per_game: rpg,
        assists_per_game: apg,
        win_pct,
    }
}

/// NBA 2021-22 season: record, per-game averages and win percentage
pub const NBA_2021_22: [DatasetRow; 20] = [
    row(52, 30, 112.1, 44.3, 25.2, 0.634),
    row(51, 31, 115.9, 46.0, 28.7, 0.622),
    row(56, 26, 111.7, 46.0, 23.8, 0.683),
    row(53, 29, 112.1, 44.2, 27.4, 0.646),
    row(51, 31, 110.0, 42.7, 23.4, 0.622),
    row(44, 38, 112.0, 45.3, 25.2, 0.537),
    row(48, 34, 112.1, 43.8, 25.4, 0.585),
    row(46, 36, 109.9, 45.3, 25.0, 0.561),
    row(44, 38, 108.6, 45.3, 23.7, 0.537),
    row(49, 33, 106.6, 45.3, 25.4, 0.598),
    row(46, 36, 110.3, 42.0, 25.4, 0.561),
    row(44, 38, 109.8, 45.6, 25.2, 0.537),
    row(48, 34, 110.0, 44.3, 27.8, 0.585),
    row(42, 40, 111.5, 45.0, 24.8, 0.512),
    row(36, 46, 108.4, 43.7, 23.7, 0.439),
    row(27, 55, 103.7, 43.0, 22.0, 0.329),
    row(22, 60, 104.8, 43.5, 21.9, 0.268),
    row(25, 57, 106.6, 42.8, 23.4, 0.305),
    row(24, 58, 108.0, 42.0, 25.2, 0.293),
    row(20, 62, 103.9, 42.8, 22.0, 0.244),
];

impl DatasetRow {
    pub fn stats(&self) -> TeamStats {
        TeamStats {
            wins: self.wins,
            losses: self.losses,
            points_per_game: self.points_per_game,
            rebounds_per_game: self.rebounds_per_game,
            assists_per_game: self.assists_per_game,
        }
    }
}

/// A single training sample: raw features and target
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSample {
    pub features: [f32; TeamStats::DIM],
    pub win_pct: f32,
}

impl From<&DatasetRow> for TeamSample {
    fn from(row: &DatasetRow) -> Self {
        TeamSample {
            features: row.stats().to_features(),
            win_pct: row.win_pct,
        }
    }
}

/// Team statistics dataset for training
#[derive(Debug, Clone)]
pub struct NbaDataset {
    samples: Vec<TeamSample>,
}

impl NbaDataset {
    /// The embedded 2021-22 season
    pub fn season_2021_22() -> Self {
        Self::from_rows(&NBA_2021_22)
    }

    pub fn from_rows(rows: &[DatasetRow]) -> Self {
        NbaDataset {
            samples: rows.iter().map(TeamSample::from).collect(),
        }
    }

    pub fn from_samples(samples: Vec<TeamSample>) -> Self {
        NbaDataset { samples }
    }

    pub fn samples(&self) -> &[TeamSample] {
        &self.samples
    }

    /// Shuffle and split into (train, validation).
    ///
    /// The validation share is `round(n * validation_split)` and the rest
    /// trains, so 0.2 of 20 rows gives 16/4. Both sides must be non-empty.
    pub fn split(self, validation_split: f32, seed: Option<u64>) -> Result<(Self, Self)> {
        let n = self.samples.len();
        // Round rather than floor: 0.2f32 widens to 0.2000000030
        let n_val = (n as f64 * validation_split as f64).round() as usize;

        if n_val == 0 || n_val >= n {
            return Err(HoopsError::Training(format!(
                "validation split {} leaves an empty side for {} rows",
                validation_split, n
            )));
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut samples = self.samples;
        samples.shuffle(&mut rng);
        let val_samples = samples.split_off(n - n_val);

        log::info!(
            "Split {} rows: train={}, val={}",
            n,
            samples.len(),
            val_samples.len()
        );

        Ok((Self::from_samples(samples), Self::from_samples(val_samples)))
    }
}

impl Dataset<TeamSample> for NbaDataset {
    fn get(&self, index: usize) -> Option<TeamSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Batch of normalized features and targets
#[derive(Debug, Clone)]
pub struct TeamBatch<B: Backend> {
    /// Normalized features: [batch, DIM]
    pub features: Tensor<B, 2>,
    /// Win percentage targets: [batch, 1]
    pub targets: Tensor<B, 2>,
}

/// Batcher that applies the fixed feature scale
#[derive(Clone)]
pub struct TeamBatcher<B: Backend> {
    device: B::Device,
    scale: FeatureScale,
}

impl<B: Backend> TeamBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        TeamBatcher {
            device,
            scale: FeatureScale::NBA,
        }
    }
}

impl<B: Backend> Batcher<B, TeamSample, TeamBatch<B>> for TeamBatcher<B> {
    fn batch(&self, items: Vec<TeamSample>, _device: &B::Device) -> TeamBatch<B> {
        let batch_size = items.len();

        let mut feature_data = Vec::with_capacity(batch_size * TeamStats::DIM);
        let mut target_data = Vec::with_capacity(batch_size);

        for sample in &items {
            feature_data.extend_from_slice(&sample.features);
            target_data.push(sample.win_pct);
        }

        let features = Tensor::<B, 1>::from_floats(feature_data.as_slice(), &self.device)
            .reshape([batch_size, TeamStats::DIM]);
        let targets = Tensor::<B, 1>::from_floats(target_data.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        TeamBatch {
            features: self.scale.normalize_tensor(features),
            targets,
        }
    }
}
