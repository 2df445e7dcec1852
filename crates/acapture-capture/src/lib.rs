//! Capture backend boundary for screen/window capture.
//!
//! This crate defines the traits a capture backend implements, the raw and
//! converted frame types, and a cross-platform synthetic backend that
//! renders a moving test pattern.

mod error;
mod frame;
mod synthetic;

pub use error::{CaptureError, ErrorKind};
pub use frame::{CaptureTimestamp, CapturedFrame, Frame, BGRA_CHANNELS};
pub use synthetic::{SyntheticBackend, SyntheticSource};

use acapture_types::{SessionConfig, Target, TargetKind};
use crossbeam_channel::Receiver;

/// Channel capacity for captured frames.
pub const FRAME_CHANNEL_CAPACITY: usize = 3;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Options passed to a backend when opening a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Capture rate in frames per second.
    pub fps: u32,

    /// Draw the cursor into captured frames.
    pub show_cursor: bool,

    /// Highlight the captured region.
    pub show_highlight: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for CaptureOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            fps: config.fps,
            show_cursor: config.show_cursor,
            show_highlight: config.show_highlight,
        }
    }
}

/// Trait for a running capture of one target.
pub trait CaptureSource: Send + Sync {
    /// Start capturing frames.
    fn start(&mut self) -> CaptureResult<Receiver<CapturedFrame>>;

    /// Stop capturing.
    fn stop(&mut self) -> CaptureResult<()>;

    /// Check if capture is active.
    fn is_active(&self) -> bool;

    /// Get the source dimensions.
    fn dimensions(&self) -> (u32, u32);
}

/// Trait for capture backends: target enumeration and source creation.
pub trait CaptureBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Whether this backend works on the current platform.
    fn is_supported(&self) -> bool {
        true
    }

    /// Whether capture permission is currently granted.
    fn has_permission(&self) -> bool {
        true
    }

    /// Ask for capture permission. Returns whether it is granted.
    fn request_permission(&self) -> bool {
        self.has_permission()
    }

    /// Enumerate currently capturable targets.
    fn enumerate_targets(&self) -> CaptureResult<Vec<Target>>;

    /// Target used when the caller does not choose one: the first display,
    /// falling back to the first target of any kind.
    fn default_target(&self) -> CaptureResult<Target> {
        let targets = self.enumerate_targets()?;
        targets
            .iter()
            .find(|t| t.kind == TargetKind::Display)
            .or_else(|| targets.first())
            .cloned()
            .ok_or_else(|| CaptureError::TargetNotFound("no capturable targets".to_string()))
    }

    /// Create a source for the given target. The source is not started.
    fn open(
        &self,
        target: &Target,
        options: &CaptureOptions,
    ) -> CaptureResult<Box<dyn CaptureSource>>;
}
