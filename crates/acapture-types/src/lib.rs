//! Shared data types for the acapture capture environment.
//!
//! This crate defines the value types passed between the capture backend,
//! the session state machine, and callers: targets, session configuration,
//! lifecycle state, and the metadata returned alongside frames.

mod config;
mod state;
mod types;

pub use config::{ConfigError, SessionConfig};
pub use state::SessionState;
pub use types::{
    FrameFormat, FrameSize, SessionInfo, SessionMetrics, StepInfo, Target, TargetFilter,
    TargetKind,
};

/// Default capture rate in frames per second.
pub const DEFAULT_FPS: u32 = 32;

/// Default bounded wait for a frame, in milliseconds.
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 2000;
