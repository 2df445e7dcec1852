//! Session configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{FrameFormat, FrameSize};
use crate::{DEFAULT_FPS, DEFAULT_FRAME_TIMEOUT_MS};

/// Errors produced while loading or validating a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid JSON for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the session cannot use.
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for a capture session. Unset fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Identifier of the target to bind (None for the backend default).
    pub target: Option<String>,

    /// Output dimensions (None for the target's native size).
    pub resize: Option<FrameSize>,

    /// Output pixel layout.
    pub frame_format: FrameFormat,

    /// Capture rate requested from the backend.
    pub fps: u32,

    /// Draw the cursor into captured frames.
    pub show_cursor: bool,

    /// Highlight the captured region.
    pub show_highlight: bool,

    /// Bounded wait for a frame, in milliseconds.
    pub frame_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: None,
            resize: None,
            frame_format: FrameFormat::default(),
            fps: DEFAULT_FPS,
            show_cursor: false,
            show_highlight: true,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON text. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.resize {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Invalid {
                    field: "resize",
                    reason: format!("{}x{} has a zero dimension", size.width, size.height),
                });
            }
        }

        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                field: "fps",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.frame_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }

        if matches!(self.target, Some(ref id) if id.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "target",
                reason: "empty target id".to_string(),
            });
        }

        Ok(())
    }

    /// Bounded wait for a frame.
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}
