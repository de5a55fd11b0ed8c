//! Training metrics and evaluation

use std::fmt;

/// Metrics accumulated during training/evaluation
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Sum of batch MSE losses
    pub total_loss: f64,
    /// Sum of absolute errors in win fraction
    pub abs_error_sum: f64,
    /// Total predictions
    pub total_predictions: usize,
    /// Number of batches accumulated
    pub batch_count: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update metrics with a batch result
    pub fn update(&mut self, loss: f32, abs_error_sum: f32, batch_size: usize) {
        self.total_loss += loss as f64;
        self.abs_error_sum += abs_error_sum as f64;
        self.total_predictions += batch_size;
        self.batch_count += 1;
    }

    /// Get average loss
    pub fn avg_loss(&self) -> f64 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.total_loss / self.batch_count as f64
        }
    }

    /// Mean absolute error in percentage points
    pub fn mae_points(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            self.abs_error_sum / self.total_predictions as f64 * 100.0
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.5} | MAE: {:.2} pts",
            self.avg_loss(),
            self.mae_points()
        )
    }
}

/// Training history for tracking progress
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub val_maes: Vec<f64>,
    pub best_val_loss: f64,
    pub best_epoch: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            best_val_loss: f64::INFINITY,
            ..Default::default()
        }
    }

    /// Record metrics for an epoch
    pub fn record_epoch(&mut self, epoch: usize, train: &Metrics, val: &Metrics) {
        self.train_losses.push(train.avg_loss());
        self.val_losses.push(val.avg_loss());
        self.val_maes.push(val.mae_points());

        if val.avg_loss() < self.best_val_loss {
            self.best_val_loss = val.avg_loss();
            self.best_epoch = epoch;
        }
    }

    pub fn epochs(&self) -> usize {
        self.train_losses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(loss: f32, abs_err: f32, n: usize) -> Metrics {
        let mut m = Metrics::new();
        m.update(loss, abs_err, n);
        m
    }

    #[test]
    fn test_empty_metrics() {
        let m = Metrics::new();
        assert_eq!(m.avg_loss(), 0.0);
        assert_eq!(m.mae_points(), 0.0);
    }

    #[test]
    fn test_mae_in_points() {
        // 4 predictions, each off by 0.05
        let m = metrics(0.0025, 0.2, 4);
        assert!((m.mae_points() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_history_tracks_best_epoch() {
        let mut history = TrainingHistory::new();
        history.record_epoch(0, &metrics(0.05, 0.0, 1), &metrics(0.04, 0.0, 1));
        history.record_epoch(1, &metrics(0.03, 0.0, 1), &metrics(0.02, 0.0, 1));
        history.record_epoch(2, &metrics(0.02, 0.0, 1), &metrics(0.03, 0.0, 1));

        assert_eq!(history.epochs(), 3);
        assert_eq!(history.best_epoch, 1);
        assert!((history.best_val_loss - 0.02).abs() < 1e-6);
        assert_eq!(history.val_maes.len(), 3);
    }
}
