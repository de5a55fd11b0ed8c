//! Training loop for the win percentage network

use burn::data::dataloader::DataLoaderBuilder;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};

use crate::data::dataset::{NbaDataset, TeamBatch, TeamBatcher};
use crate::model::WinPctNet;
use crate::training::metrics::{Metrics, TrainingHistory};
use crate::{HoopsError, Result};

/// Mean squared error between predicted and actual win fraction
pub fn mse_loss<B: burn::tensor::backend::Backend>(
    predictions: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (predictions - targets).powf_scalar(2.0).mean()
}

/// Full-batch Adam trainer
pub struct WinPctTrainer<B: AutodiffBackend> {
    model: WinPctNet<B>,
    optimizer: OptimizerAdaptor<Adam, WinPctNet<B>, B>,
    learning_rate: f64,
    device: B::Device,
}

impl<B: AutodiffBackend> WinPctTrainer<B> {
    /// Create a new trainer
    pub fn new(model: WinPctNet<B>, learning_rate: f64, device: B::Device) -> Self {
        let optimizer = AdamConfig::new().init();

        WinPctTrainer {
            model,
            optimizer,
            learning_rate,
            device,
        }
    }

    /// Train the model for a fixed number of epochs.
    ///
    /// The weights after the final epoch are returned whether or not the
    /// loss converged.
    pub fn train(
        mut self,
        train_dataset: NbaDataset,
        val_dataset: NbaDataset,
        epochs: usize,
    ) -> Result<(WinPctNet<B>, TrainingHistory)> {
        use burn::data::dataset::Dataset;

        if train_dataset.is_empty() || val_dataset.is_empty() {
            return Err(HoopsError::Training(
                "training and validation sets must both be non-empty".to_string(),
            ));
        }

        let batcher_train = TeamBatcher::<B>::new(self.device.clone());
        let batcher_val = TeamBatcher::<B>::new(self.device.clone());

        // Full batch: the whole season fits in one step
        let train_loader = DataLoaderBuilder::new(batcher_train)
            .batch_size(train_dataset.len())
            .build(train_dataset);

        let val_loader = DataLoaderBuilder::new(batcher_val)
            .batch_size(val_dataset.len())
            .build(val_dataset);

        let mut history = TrainingHistory::new();

        log::info!("Starting training for {} epochs", epochs);

        for epoch in 0..epochs {
            let train_metrics = self.train_epoch(train_loader.iter());
            let val_metrics = self.validate_epoch(val_loader.iter());

            history.record_epoch(epoch, &train_metrics, &val_metrics);

            log::debug!(
                "Epoch {}: loss = {:.6}, val_loss = {:.6}",
                epoch,
                train_metrics.avg_loss(),
                val_metrics.avg_loss()
            );
            if epoch % 10 == 0 || epoch == epochs - 1 {
                log::info!(
                    "Epoch {}/{}: Train: {} | Val: {}",
                    epoch + 1,
                    epochs,
                    train_metrics,
                    val_metrics
                );
            }
        }

        let evaluation = self.validate_epoch(val_loader.iter());
        log::info!("Evaluation result: {}", evaluation);

        Ok((self.model, history))
    }

    /// Train one epoch
    fn train_epoch(&mut self, loader: impl Iterator<Item = TeamBatch<B>>) -> Metrics {
        let mut metrics = Metrics::new();

        for batch in loader {
            let batch_size = batch.features.dims()[0];

            let predictions = self.model.forward(batch.features);
            let abs_error: f32 = (predictions.clone() - batch.targets.clone())
                .abs()
                .sum()
                .into_scalar()
                .elem();
            let loss = mse_loss(predictions, batch.targets);
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self.optimizer.step(self.learning_rate, self.model.clone(), grads);

            metrics.update(loss_val, abs_error, batch_size);
        }

        metrics
    }

    /// Validate one epoch
    fn validate_epoch(&self, loader: impl Iterator<Item = TeamBatch<B>>) -> Metrics {
        let mut metrics = Metrics::new();

        for batch in loader {
            let batch_size = batch.features.dims()[0];

            let predictions = self.model.forward(batch.features);
            let abs_error: f32 = (predictions.clone() - batch.targets.clone())
                .abs()
                .sum()
                .into_scalar()
                .elem();
            let loss_val: f32 = mse_loss(predictions, batch.targets).into_scalar().elem();

            metrics.update(loss_val, abs_error, batch_size);
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WinPctNetConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_mse_loss() {
        let device = Default::default();
        let preds = Tensor::<NdArray<f32>, 1>::from_floats([0.5, 0.7].as_slice(), &device)
            .reshape([2, 1]);
        let targets = Tensor::<NdArray<f32>, 1>::from_floats([0.6, 0.4].as_slice(), &device)
            .reshape([2, 1]);

        let loss: f32 = mse_loss(preds, targets).into_scalar().elem();
        // (0.01 + 0.09) / 2
        assert!((loss - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_training_reduces_loss() {
        let device = Default::default();
        let model = WinPctNet::<TestBackend>::new(&device, &WinPctNetConfig::default());
        let (train, val) = NbaDataset::season_2021_22().split(0.2, Some(5)).unwrap();

        let trainer = WinPctTrainer::new(model, 1e-2, device);
        let (_, history) = trainer.train(train, val, 100).unwrap();

        assert_eq!(history.epochs(), 100);
        let first = history.train_losses[0];
        let last = *history.train_losses.last().unwrap();
        assert!(last < first, "loss went from {} to {}", first, last);
    }

    #[test]
    fn test_rejects_empty_validation() {
        let device = Default::default();
        let model = WinPctNet::<TestBackend>::new(&device, &WinPctNetConfig::default());
        let trainer = WinPctTrainer::new(model, 1e-3, device);

        let result = trainer.train(
            NbaDataset::season_2021_22(),
            NbaDataset::from_samples(Vec::new()),
            1,
        );
        assert!(result.is_err());
    }
}
