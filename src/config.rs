//! Runtime configuration
//!
//! Settings are read from the environment so the binary needs no flags:
//! - `CLEARVIEW_POLICY`: `cached` (default) or `per-frame`
//! - `CLEARVIEW_CLEAR_COLOR`: `r,g,b,a` with each channel in `0..=1`
//! - `CLEARVIEW_FRAMES`: frames rendered by the headless runner

use crate::surface::{ClearColor, ResourcePolicy};

pub const POLICY_VAR: &str = "CLEARVIEW_POLICY";
pub const CLEAR_COLOR_VAR: &str = "CLEARVIEW_CLEAR_COLOR";
pub const FRAMES_VAR: &str = "CLEARVIEW_FRAMES";

/// Frames rendered by the headless runner when `CLEARVIEW_FRAMES` is unset
pub const DEFAULT_FRAMES: u32 = 3;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown resource policy {0:?}, expected \"cached\" or \"per-frame\"")]
    UnknownPolicy(String),
    #[error("invalid clear color {0:?}, expected four comma separated channels in 0..=1")]
    InvalidClearColor(String),
    #[error("invalid frame count {0:?}")]
    InvalidFrameCount(String),
}

/// Surface configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    /// Whether queue and pass descriptor are cached or rebuilt every frame
    pub policy: ResourcePolicy,
    /// Color every frame is cleared to
    pub clear_color: ClearColor,
    /// Frames the headless runner renders
    pub frames: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            policy: ResourcePolicy::default(),
            clear_color: ClearColor::RED,
            frames: DEFAULT_FRAMES,
        }
    }
}

impl SurfaceConfig {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(POLICY_VAR) {
            config.policy = parse_policy(&value)?;
        }
        if let Some(value) = lookup(CLEAR_COLOR_VAR) {
            config.clear_color = parse_clear_color(&value)?;
        }
        if let Some(value) = lookup(FRAMES_VAR) {
            config.frames = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidFrameCount(value.clone()))?;
        }

        Ok(config)
    }

    pub fn with_policy(mut self, policy: ResourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clear_color(mut self, clear_color: ClearColor) -> Self {
        self.clear_color = clear_color;
        self
    }
}

fn parse_policy(value: &str) -> Result<ResourcePolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cached" => Ok(ResourcePolicy::Cached),
        "per-frame" | "per_frame" => Ok(ResourcePolicy::PerFrame),
        _ => Err(ConfigError::UnknownPolicy(value.to_string())),
    }
}

fn parse_clear_color(value: &str) -> Result<ClearColor, ConfigError> {
    let invalid = || ConfigError::InvalidClearColor(value.to_string());

    let channels = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    match channels.as_slice() {
        &[red, green, blue, alpha]
            if channels.iter().all(|c| (0.0..=1.0).contains(c)) =>
        {
            Ok(ClearColor::new(red, green, blue, alpha))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SurfaceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SurfaceConfig::default());
        assert_eq!(config.policy, ResourcePolicy::Cached);
        assert_eq!(config.clear_color, ClearColor::RED);
        assert_eq!(config.frames, DEFAULT_FRAMES);
    }

    #[test]
    fn test_policy_parsing() {
        let config = SurfaceConfig::from_lookup(lookup(&[(POLICY_VAR, "Per-Frame")])).unwrap();
        assert_eq!(config.policy, ResourcePolicy::PerFrame);

        let err = SurfaceConfig::from_lookup(lookup(&[(POLICY_VAR, "sometimes")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownPolicy("sometimes".to_string()));
    }

    #[test]
    fn test_clear_color_parsing() {
        let config =
            SurfaceConfig::from_lookup(lookup(&[(CLEAR_COLOR_VAR, "0, 0.5, 1, 1")])).unwrap();
        assert_eq!(config.clear_color, ClearColor::new(0.0, 0.5, 1.0, 1.0));
    }

    #[test]
    fn test_clear_color_rejects_bad_input() {
        for value in ["1,0,0", "1,0,0,0,0", "red", "1.5,0,0,0"] {
            let err = SurfaceConfig::from_lookup(lookup(&[(CLEAR_COLOR_VAR, value)])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidClearColor(value.to_string()));
        }
    }

    #[test]
    fn test_frame_count() {
        let config = SurfaceConfig::from_lookup(lookup(&[(FRAMES_VAR, "10")])).unwrap();
        assert_eq!(config.frames, 10);
        assert!(SurfaceConfig::from_lookup(lookup(&[(FRAMES_VAR, "-1")])).is_err());
    }
}
