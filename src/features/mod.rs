//! Feature scaling
//!
//! Converts raw team stats into model-ready inputs.

pub mod scale;

pub use scale::FeatureScale;
