//! Neural network architecture

pub mod mlp;

pub use mlp::{WinPctNet, WinPctNetConfig};
