use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::neural::constants::MAX_HISTORY;
use crate::error::ConfigError;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanglionConfig {
    pub brain: BrainConfig,
    pub discriminator: DiscriminatorConfig,
    pub training: TrainingConfig,
    pub play: PlayConfig,
}

/// Widths of the generator's branches and shared layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub board_dim: i64,
    pub history_dim: i64,
    pub context_dim: i64,
    pub grid_channels: i64,
    pub hidden_dim: i64,
}

impl Default for BrainConfig {
    fn default() -> Self {
        BrainConfig {
            board_dim: 128,
            history_dim: 64,
            context_dim: 64,
            grid_channels: 4,
            hidden_dim: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscriminatorConfig {
    pub board_dim: i64,
    pub move_embed_dim: i64,
    pub hidden_dim: i64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        DiscriminatorConfig {
            board_dim: 128,
            move_embed_dim: 32,
            hidden_dim: 128,
        }
    }
}

/// Self-play training run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub games: usize,
    pub max_moves: usize,
    pub exploration_temperature: f64,
    pub generator_learning_rate: f64,
    pub discriminator_learning_rate: f64,
    pub history_window: usize,
    /// Seeds both parameter initialization and move sampling when set.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            games: 5,
            max_moves: 200,
            exploration_temperature: 0.7,
            generator_learning_rate: 1e-4,
            discriminator_learning_rate: 1e-4,
            history_window: MAX_HISTORY,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub temperature: f64,
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig { temperature: 0.2 }
    }
}

impl GanglionConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GanglionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("brain.board_dim", self.brain.board_dim),
            ("brain.history_dim", self.brain.history_dim),
            ("brain.context_dim", self.brain.context_dim),
            ("brain.grid_channels", self.brain.grid_channels),
            ("brain.hidden_dim", self.brain.hidden_dim),
            ("discriminator.board_dim", self.discriminator.board_dim),
            ("discriminator.move_embed_dim", self.discriminator.move_embed_dim),
            ("discriminator.hidden_dim", self.discriminator.hidden_dim),
        ];
        for (name, width) in widths {
            if width <= 0 {
                return Err(ConfigError::Validation(format!("{} must be > 0", name)));
            }
        }

        let training = &self.training;
        if training.max_moves == 0 {
            return Err(ConfigError::Validation("training.max_moves must be > 0".to_string()));
        }
        if training.history_window == 0 {
            return Err(ConfigError::Validation("training.history_window must be > 0".to_string()));
        }
        for (name, lr) in [
            ("training.generator_learning_rate", training.generator_learning_rate),
            ("training.discriminator_learning_rate", training.discriminator_learning_rate),
        ] {
            if !(lr > 0.0 && lr.is_finite()) {
                return Err(ConfigError::Validation(format!("{} must be > 0", name)));
            }
        }
        if !training.exploration_temperature.is_finite() || !self.play.temperature.is_finite() {
            return Err(ConfigError::Validation("temperatures must be finite".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GanglionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.brain.grid_channels, 4);
        assert_eq!(config.training.history_window, 32);
        assert_eq!(config.training.max_moves, 200);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GanglionConfig::from_toml_str(
            r#"
            [training]
            games = 12
            seed = 7

            [brain]
            hidden_dim = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.training.games, 12);
        assert_eq!(config.training.seed, Some(7));
        assert_eq!(config.training.max_moves, 200);
        assert_eq!(config.brain.hidden_dim, 64);
        assert_eq!(config.brain.board_dim, 128);
        assert_eq!(config.discriminator, DiscriminatorConfig::default());
    }

    #[test]
    fn test_rejects_zero_width() {
        let err = GanglionConfig::from_toml_str("[discriminator]\nmove_embed_dim = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "config validation error: discriminator.move_embed_dim must be > 0"
        );
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let err = GanglionConfig::from_toml_str("[training]\ngenerator_learning_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = GanglionConfig::load_or_default(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config, GanglionConfig::default());
    }
}
