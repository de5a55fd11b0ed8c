//! NBA win percentage prediction
//!
//! Trains a small dense network on 2021-22 team statistics and estimates a
//! win percentage from a team's record and per-game averages.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Season statistics for a single team, as entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamStats {
    pub wins: u32,
    pub losses: u32,
    pub points_per_game: f32,
    pub rebounds_per_game: f32,
    pub assists_per_game: f32,
}

impl TeamStats {
    /// Number of features fed to the model
    pub const DIM: usize = 5;

    /// Total games played
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Observed win percentage (0-1), or None with no games played
    pub fn record_win_pct(&self) -> Option<f32> {
        match self.games() {
            0 => None,
            games => Some(self.wins as f32 / games as f32),
        }
    }

    /// Raw feature vector in model input order
    pub fn to_features(&self) -> [f32; Self::DIM] {
        [
            self.wins as f32,
            self.losses as f32,
            self.points_per_game,
            self.rebounds_per_game,
            self.assists_per_game,
        ]
    }
}

impl fmt::Display for TeamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}, {:.1} pts, {:.1} reb, {:.1} ast",
            self.wins,
            self.losses,
            self.points_per_game,
            self.rebounds_per_game,
            self.assists_per_game
        )
    }
}

/// Parses `wins losses points rebounds assists`, separated by whitespace or commas
impl FromStr for TeamStats {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();

        if fields.len() != Self::DIM {
            return Err(HoopsError::Parse(format!(
                "expected {} values (wins losses points rebounds assists), got {}",
                Self::DIM,
                fields.len()
            )));
        }

        let int = |field: &str| {
            field
                .parse::<u32>()
                .map_err(|e| HoopsError::Parse(format!("invalid game count '{}': {}", field, e)))
        };
        let float = |field: &str| {
            field
                .parse::<f32>()
                .map_err(|e| HoopsError::Parse(format!("invalid stat '{}': {}", field, e)))
        };

        Ok(TeamStats {
            wins: int(fields[0])?,
            losses: int(fields[1])?,
            points_per_game: float(fields[2])?,
            rebounds_per_game: float(fields[3])?,
            assists_per_game: float(fields[4])?,
        })
    }
}

/// Model output for one team
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinPrediction {
    /// Predicted win percentage, rounded and clamped to 0-100
    pub percent: u8,
    /// Raw sigmoid output
    pub probability: f32,
}

impl WinPrediction {
    pub fn from_probability(probability: f32) -> Self {
        let scaled = (probability * 100.0).round();
        // NaN falls through to 0
        let percent = if scaled >= 100.0 {
            100
        } else if scaled > 0.0 {
            scaled as u8
        } else {
            0
        };
        WinPrediction {
            percent,
            probability,
        }
    }
}

impl fmt::Display for WinPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent)
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("Model is not ready yet. Please try again in a moment.")]
    NotReady,

    #[error("Please enter at least one win or loss.")]
    NoGames,

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Fraction of rows held out for validation
    pub validation_split: f32,
    /// Seeds the shuffle and weight init; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 200,
            learning_rate: 1e-3,
            validation_split: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            hidden_dims: vec![16, 8],
        }
    }
}

impl ModelConfig {
    /// Reject layouts that cannot build a network; warn on anything but 16→8
    pub fn validate(&self) -> Result<()> {
        if self.hidden_dims.is_empty() || self.hidden_dims.contains(&0) {
            return Err(HoopsError::Config(format!(
                "hidden_dims must list non-zero layer widths, got {:?}",
                self.hidden_dims
            )));
        }
        if self.hidden_dims != Self::default().hidden_dims {
            log::warn!(
                "Non-standard architecture {:?}; predictions will not match the 5-16-8-1 network",
                self.hidden_dims
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_team_stats() {
        let stats: TeamStats = "50 32 110 44 25".parse().unwrap();
        assert_eq!(stats.wins, 50);
        assert_eq!(stats.losses, 32);
        assert_eq!(stats.points_per_game, 110.0);

        let stats: TeamStats = "52, 30, 112.1, 44.3, 25.2".parse().unwrap();
        assert_eq!(stats.games(), 82);
        assert!((stats.assists_per_game - 25.2).abs() < 1e-6);
    }

    #[test]
    fn test_parse_team_stats_rejects_bad_input() {
        assert!("50 32 110 44".parse::<TeamStats>().is_err());
        assert!("50 -3 110 44 25".parse::<TeamStats>().is_err());
        assert!("fifty 32 110 44 25".parse::<TeamStats>().is_err());
    }

    #[test]
    fn test_record_win_pct() {
        let stats = TeamStats {
            wins: 41,
            losses: 41,
            ..Default::default()
        };
        assert_eq!(stats.record_win_pct(), Some(0.5));
        assert_eq!(TeamStats::default().record_win_pct(), None);
    }

    #[test]
    fn test_prediction_clamps() {
        assert_eq!(WinPrediction::from_probability(0.634).percent, 63);
        assert_eq!(WinPrediction::from_probability(0.636).percent, 64);
        assert_eq!(WinPrediction::from_probability(1.2).percent, 100);
        assert_eq!(WinPrediction::from_probability(-0.1).percent, 0);
        assert_eq!(WinPrediction::from_probability(f32::NAN).percent, 0);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.training.seed = Some(7);
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.training.epochs, 200);
        assert_eq!(parsed.training.seed, Some(7));
        assert_eq!(parsed.model.hidden_dims, vec![16, 8]);
    }

    #[test]
    fn test_model_config_validation() {
        assert!(ModelConfig::default().validate().is_ok());
        assert!(ModelConfig { hidden_dims: vec![32] }.validate().is_ok());
        assert!(matches!(
            ModelConfig { hidden_dims: vec![] }.validate(),
            Err(HoopsError::Config(_))
        ));
        assert!(matches!(
            ModelConfig { hidden_dims: vec![16, 0] }.validate(),
            Err(HoopsError::Config(_))
        ));
    }

    #[test]
    fn test_config_seed_optional() {
        let toml = r#"
            [training]
            epochs = 50
            learning_rate = 0.01
            validation_split = 0.2

            [model]
            hidden_dims = [16, 8]
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.training.epochs, 50);
        assert!(config.training.seed.is_none());
    }
}
