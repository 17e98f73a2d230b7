use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::line::SurfaceId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("display duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f32),
}

/// How a presenter moves from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayMode {
    /// Lines advance after a fixed display duration.
    #[default]
    Automatic,
    /// Lines advance only when the host calls `advance`.
    Manual,
}

/// How the lines of a batch are spread across the primary surface and a
/// batch's secondary surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RoutingPolicy {
    /// The first line goes to the secondary surface, the rest to primary.
    #[default]
    FirstLineSecondary,
    /// Every line goes to the secondary surface.
    AllSecondary,
    /// Secondary surfaces are never used for batches.
    PrimaryOnly,
}

/// Presenter configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenterConfig {
    #[serde(default)]
    pub mode: PlayMode,
    /// Seconds each line stays up in `Automatic` mode.
    #[serde(default = "default_display_duration")]
    pub display_duration_secs: f32,
    #[serde(default)]
    pub routing: RoutingPolicy,
    #[serde(default)]
    pub primary_surface: SurfaceId,
}

fn default_display_duration() -> f32 {
    3.0
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            mode: PlayMode::default(),
            display_duration_secs: default_display_duration(),
            routing: RoutingPolicy::default(),
            primary_surface: SurfaceId::PRIMARY,
        }
    }
}

impl PresenterConfig {
    /// Check the configuration. Manual mode never reads the duration, so it
    /// is only required to be a positive, representable `Duration` in
    /// automatic mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == PlayMode::Automatic {
            match Duration::try_from_secs_f32(self.display_duration_secs) {
                Ok(d) if !d.is_zero() => {}
                _ => return Err(ConfigError::InvalidDuration(self.display_duration_secs)),
            }
        }
        Ok(())
    }

    /// The automatic-mode display duration as a `Duration`. Values that do
    /// not fit one come back as zero.
    pub fn display_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.display_duration_secs).unwrap_or(Duration::ZERO)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        let config: PresenterConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_three_second_automatic() {
        let config = PresenterConfig::default();
        assert_eq!(config.mode, PlayMode::Automatic);
        assert_eq!(config.display_duration_secs, 3.0);
        assert_eq!(config.routing, RoutingPolicy::FirstLineSecondary);
        assert_eq!(config.primary_surface, SurfaceId::PRIMARY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_duration_in_automatic_mode() {
        let config = PresenterConfig {
            display_duration_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration(_))
        ));

        let config = PresenterConfig {
            display_duration_secs: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn manual_mode_ignores_duration() {
        let config = PresenterConfig {
            mode: PlayMode::Manual,
            display_duration_secs: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.display_duration(), Duration::ZERO);
    }

    #[test]
    fn parse_partial_ron() {
        let config = PresenterConfig::parse_ron("(mode: Manual, routing: AllSecondary)").unwrap();
        assert_eq!(config.mode, PlayMode::Manual);
        assert_eq!(config.routing, RoutingPolicy::AllSecondary);
        assert_eq!(config.display_duration_secs, 3.0);
    }

    #[test]
    fn parse_invalid_ron_duration() {
        let err = PresenterConfig::parse_ron("(display_duration_secs: -2.0)").unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn rejects_duration_too_large_for_a_timer() {
        let err = PresenterConfig::parse_ron("(display_duration_secs: 1e20)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(_)));

        let config = PresenterConfig {
            mode: PlayMode::Manual,
            display_duration_secs: 1e20,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.display_duration(), Duration::ZERO);
    }
}
