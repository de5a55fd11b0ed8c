//! Dense win percentage network
//!
//! Architecture: Input(5) → Hidden1(16) → ReLU
//!                        → Hidden2(8)  → ReLU
//!                        → Output(1)   → Sigmoid

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::{ModelConfig, TeamStats};

/// Configuration for the network
#[derive(Debug, Clone)]
pub struct WinPctNetConfig {
    /// Input dimension (team features)
    pub input_dim: usize,
    /// Hidden layer widths, applied in order
    pub hidden_dims: Vec<usize>,
}

impl Default for WinPctNetConfig {
    fn default() -> Self {
        WinPctNetConfig {
            input_dim: TeamStats::DIM,
            hidden_dims: vec![16, 8],
        }
    }
}

impl From<&ModelConfig> for WinPctNetConfig {
    fn from(config: &ModelConfig) -> Self {
        WinPctNetConfig {
            input_dim: TeamStats::DIM,
            hidden_dims: config.hidden_dims.clone(),
        }
    }
}

/// Feed-forward regressor producing a win fraction in (0, 1)
#[derive(Module, Debug)]
pub struct WinPctNet<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
}

impl<B: Backend> WinPctNet<B> {
    pub fn new(device: &B::Device, config: &WinPctNetConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        WinPctNet {
            hidden,
            output: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Normalized team features [batch, input_dim]
    ///
    /// # Returns
    /// Win fraction [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = features;
        for layer in &self.hidden {
            x = relu(layer.forward(x));
        }
        sigmoid(self.output.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_output_shape_and_range() {
        let device = Default::default();
        let model = WinPctNet::<TestBackend>::new(&device, &WinPctNetConfig::default());

        let features = Tensor::random(
            [6, TeamStats::DIM],
            burn::tensor::Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let out = model.forward(features);
        assert_eq!(out.dims(), [6, 1]);

        let data = out.to_data();
        for val in data.as_slice::<f32>().unwrap() {
            assert!(*val > 0.0 && *val < 1.0, "sigmoid output out of range: {}", val);
        }
    }

    #[test]
    fn test_layer_widths_follow_config() {
        let device = Default::default();
        let config = WinPctNetConfig {
            input_dim: TeamStats::DIM,
            hidden_dims: vec![4],
        };
        let model = WinPctNet::<TestBackend>::new(&device, &config);
        assert_eq!(model.hidden.len(), 1);

        let features = Tensor::zeros([2, TeamStats::DIM], &device);
        assert_eq!(model.forward(features).dims(), [2, 1]);
    }
}
