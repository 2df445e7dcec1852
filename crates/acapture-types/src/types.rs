//! Common types used across the capture environment.

use serde::{Deserialize, Serialize};

/// A capturable source (display or window).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Opaque identifier, usable to select this source.
    pub id: String,

    /// Human-readable label.
    pub label: String,

    /// Type of capture target.
    pub kind: TargetKind,

    /// Native width in pixels.
    pub width: u32,

    /// Native height in pixels.
    pub height: u32,
}

impl Target {
    /// Create a display target.
    pub fn display(id: impl Into<String>, label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: TargetKind::Display,
            width,
            height,
        }
    }

    /// Create a window target.
    pub fn window(id: impl Into<String>, label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: TargetKind::Window,
            width,
            height,
        }
    }

    /// Native size of the target.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) [{} {}x{}]",
            self.id,
            self.label,
            self.kind.name(),
            self.width,
            self.height
        )
    }
}

/// Type of capture target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A monitor/display.
    Display,

    /// An application window.
    Window,
}

impl TargetKind {
    /// Returns the display name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Window => "window",
        }
    }
}

/// Optional criteria narrowing a discovery call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    /// Only targets of this kind.
    pub kind: Option<TargetKind>,

    /// Only targets whose label contains this text (case-insensitive).
    pub label_contains: Option<String>,
}

impl TargetFilter {
    /// Returns true if the target satisfies every set criterion.
    pub fn matches(&self, target: &Target) -> bool {
        if let Some(kind) = self.kind {
            if target.kind != kind {
                return false;
            }
        }

        match self.label_contains {
            Some(ref needle) => target
                .label
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Output dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a new frame size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in a frame of this size.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Pixel layout of a converted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Blue, green, red. Alpha is skipped.
    #[default]
    Bgr,

    /// Red, green, blue.
    Rgb,

    /// Blue, green, red, alpha as delivered by the backend.
    Bgra,
}

impl FrameFormat {
    /// Number of samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Bgr | Self::Rgb => 3,
            Self::Bgra => 4,
        }
    }

    /// Returns the display name for this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bgr => "bgr",
            Self::Rgb => "rgb",
            Self::Bgra => "bgra",
        }
    }
}

/// Session metadata returned by `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Identifier of the bound target.
    pub target_id: String,

    /// Label of the bound target.
    pub target_label: String,

    /// Output frame width in pixels.
    pub width: u32,

    /// Output frame height in pixels.
    pub height: u32,

    /// Samples per pixel.
    pub channels: usize,

    /// Output pixel layout.
    pub frame_format: FrameFormat,

    /// Requested capture rate.
    pub fps: u32,

    /// Number of successful resets on this session, including this one.
    pub restarts: u64,
}

/// Auxiliary data returned by `step`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Backend sequence number of the returned frame.
    pub sequence: u64,

    /// Queued frames discarded to reach the freshest one.
    pub skipped_frames: u64,
}

/// Snapshot of per-session capture statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Frames returned to the caller since construction.
    pub frames_delivered: u64,

    /// Stale frames discarded while draining the queue.
    pub frames_skipped: u64,

    /// Successful resets.
    pub restarts: u64,

    /// Frame waits that hit the bounded timeout.
    pub timeouts: u64,

    /// Delivered frames per second since the last reset.
    pub fps: f32,

    /// Seconds since the last successful reset.
    pub uptime_seconds: u64,
}
