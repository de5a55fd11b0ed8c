//! Prediction and inference
//!
//! The estimator lifecycle and the sensitivity sweep built on top of it.

pub mod estimator;
pub mod sweep;

pub use estimator::{Estimator, TrainingReport, WinPctModel};
pub use sweep::{sweep, ChartData, Series, SweepStat, SWEEP_OFFSETS};
