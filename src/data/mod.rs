//! Training data
//!
//! The embedded season table and its burn dataset/batcher.

pub mod dataset;

pub use dataset::{NbaDataset, TeamBatch, TeamBatcher, NBA_2021_22};
