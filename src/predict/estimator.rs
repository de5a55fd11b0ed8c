//! Win percentage estimator
//!
//! Owns the trained network and enforces the `Untrained → Ready` lifecycle.
//! Training can run inline ([`Estimator::train`]) or on a worker thread
//! ([`Estimator::spawn_training`]) while callers keep issuing predictions.

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use burn::module::AutodiffModule;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use crate::data::NbaDataset;
use crate::features::FeatureScale;
use crate::model::{WinPctNet, WinPctNetConfig};
use crate::training::{TrainingHistory, WinPctTrainer};
use crate::{Config, HoopsError, Result, TeamStats, WinPrediction};

/// Anything that maps team stats to a predicted win percentage
pub trait WinPctModel {
    fn predict(&self, stats: &TeamStats) -> Result<WinPrediction>;
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub history: TrainingHistory,
    pub train_rows: usize,
    pub val_rows: usize,
}

impl TrainingReport {
    pub fn final_train_loss(&self) -> Option<f64> {
        self.history.train_losses.last().copied()
    }

    pub fn final_val_loss(&self) -> Option<f64> {
        self.history.val_losses.last().copied()
    }

    /// Validation mean absolute error after the last epoch, in percentage points
    pub fn final_val_mae(&self) -> Option<f64> {
        self.history.val_maes.last().copied()
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} epochs on {} rows ({} held out): loss {:.5}, val_loss {:.5}, val_mae {:.2} pts",
            self.history.epochs(),
            self.train_rows,
            self.val_rows,
            self.final_train_loss().unwrap_or(f64::NAN),
            self.final_val_loss().unwrap_or(f64::NAN),
            self.final_val_mae().unwrap_or(f64::NAN)
        )
    }
}

type Trained<B> = (WinPctNet<<B as AutodiffBackend>::InnerBackend>, TrainingReport);

enum State<B: AutodiffBackend> {
    Untrained,
    Training(Receiver<Result<Trained<B>>>),
    Ready(WinPctNet<B::InnerBackend>),
}

/// Estimator owning the training run and the resulting network
pub struct Estimator<B: AutodiffBackend> {
    config: Config,
    device: B::Device,
    state: State<B>,
    report: Option<TrainingReport>,
}

impl<B: AutodiffBackend> Estimator<B> {
    pub fn new(config: Config, device: B::Device) -> Self {
        Estimator {
            config,
            device,
            state: State::Untrained,
            report: None,
        }
    }

    /// True once a trained model is installed
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// True while a background run is in flight
    pub fn is_training(&self) -> bool {
        matches!(self.state, State::Training(_))
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Train inline, replacing the current model
    pub fn train(&mut self) -> Result<&TrainingReport> {
        let trained = fit::<B>(&self.config, &self.device)?;
        Ok(self.install(trained))
    }

    /// Start training on a worker thread. No-op if already training or ready.
    pub fn spawn_training(&mut self) -> Result<()> {
        if !matches!(self.state, State::Untrained) {
            log::warn!("Training already started; ignoring request");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();
        let device = self.device.clone();

        std::thread::Builder::new()
            .name("hoops-train".to_string())
            .spawn(move || {
                // Receiver may be gone if the estimator was dropped
                let _ = tx.send(fit::<B>(&config, &device));
            })?;

        self.state = State::Training(rx);
        Ok(())
    }

    /// Non-blocking check for a finished background run. Returns readiness.
    pub fn poll(&mut self) -> bool {
        let received = match &self.state {
            State::Training(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(HoopsError::Training(
                    "training worker exited without a model".to_string(),
                ))),
            },
            _ => None,
        };

        if let Some(result) = received {
            self.finish(result);
        }
        self.is_ready()
    }

    /// Block until a background run finishes
    pub fn wait(&mut self) -> Result<&TrainingReport> {
        let result = match &self.state {
            State::Training(rx) => rx.recv().unwrap_or_else(|_| {
                Err(HoopsError::Training(
                    "training worker exited without a model".to_string(),
                ))
            }),
            State::Ready(_) => {
                return self.report.as_ref().ok_or(HoopsError::NotReady);
            }
            State::Untrained => return Err(HoopsError::NotReady),
        };

        match result {
            Ok(trained) => Ok(self.install(trained)),
            Err(e) => {
                self.abandon(&e);
                Err(e)
            }
        }
    }

    fn finish(&mut self, result: Result<Trained<B>>) {
        match result {
            Ok(trained) => {
                self.install(trained);
            }
            Err(e) => self.abandon(&e),
        }
    }

    /// Back to `Untrained`; predictions keep reporting not-ready
    fn abandon(&mut self, error: &HoopsError) {
        log::warn!("Background training failed: {}", error);
        self.state = State::Untrained;
    }

    fn install(&mut self, (model, report): Trained<B>) -> &TrainingReport {
        log::info!("Model ready: {}", report);
        self.state = State::Ready(model);
        self.report.insert(report)
    }
}

impl<B: AutodiffBackend> WinPctModel for Estimator<B> {
    /// Predict a team's win percentage.
    ///
    /// Rejects with `NotReady` before training has finished and with
    /// `NoGames` when wins + losses is zero. Other values are not validated.
    fn predict(&self, stats: &TeamStats) -> Result<WinPrediction> {
        let model = match &self.state {
            State::Ready(model) => model,
            _ => return Err(HoopsError::NotReady),
        };

        if stats.games() == 0 {
            return Err(HoopsError::NoGames);
        }

        Ok(predict_with(model, &self.device, stats))
    }
}

/// Shuffle, split, build and train a fresh network
fn fit<B: AutodiffBackend>(config: &Config, device: &B::Device) -> Result<Trained<B>> {
    let training = &config.training;

    if let Some(seed) = training.seed {
        B::seed(seed);
    }

    let (train, val) = NbaDataset::season_2021_22().split(training.validation_split, training.seed)?;
    let train_rows = train.samples().len();
    let val_rows = val.samples().len();

    config.model.validate()?;
    let model = WinPctNet::<B>::new(device, &WinPctNetConfig::from(&config.model));
    let trainer = WinPctTrainer::new(model, training.learning_rate, device.clone());
    let (model, history) = trainer.train(train, val, training.epochs)?;

    Ok((
        model.valid(),
        TrainingReport {
            history,
            train_rows,
            val_rows,
        },
    ))
}

/// One forward pass on normalized stats
pub(crate) fn predict_with<B: Backend>(
    model: &WinPctNet<B>,
    device: &B::Device,
    stats: &TeamStats,
) -> WinPrediction {
    let input = FeatureScale::NBA.normalize_stats(stats);
    let features = Tensor::<B, 1>::from_floats(input.as_slice(), device).reshape([1, TeamStats::DIM]);
    let probability: f32 = model.forward(features).reshape([1]).into_scalar().elem();
    WinPrediction::from_probability(probability)
}
