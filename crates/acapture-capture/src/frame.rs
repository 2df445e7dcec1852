//! Captured frame types.

use bytes::Bytes;
use std::time::Instant;

use acapture_types::{FrameFormat, FrameSize};

use crate::error::CaptureError;
use crate::CaptureResult;

/// Bytes per pixel in a raw backend frame.
pub const BGRA_CHANNELS: usize = 4;

/// Timestamp for a captured frame.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTimestamp {
    /// Monotonic timestamp when the frame was captured.
    pub capture_time: Instant,

    /// Time since the source started, in 100ns units.
    pub pts_100ns: u64,
}

impl CaptureTimestamp {
    /// Create a new capture timestamp.
    pub fn now(start_time: Instant) -> Self {
        let capture_time = Instant::now();
        let elapsed = capture_time.duration_since(start_time);
        let pts_100ns = elapsed.as_nanos() as u64 / 100;

        Self {
            capture_time,
            pts_100ns,
        }
    }

    /// Get the presentation timestamp in milliseconds.
    pub fn pts_ms(&self) -> u64 {
        self.pts_100ns / 10_000
    }
}

/// A raw frame as produced by a backend.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// BGRA pixel data, row-major, no row padding.
    pub data: Bytes,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Capture timestamp.
    pub timestamp: CaptureTimestamp,

    /// Monotonically increasing sequence number.
    pub sequence: u64,
}

impl CapturedFrame {
    /// Create a new captured frame.
    pub fn new(
        data: Bytes,
        width: u32,
        height: u32,
        timestamp: CaptureTimestamp,
        sequence: u64,
    ) -> Self {
        Self {
            data,
            width,
            height,
            timestamp,
            sequence,
        }
    }

    /// Calculate expected BGRA buffer size for given dimensions.
    pub fn bgra_buffer_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * BGRA_CHANNELS
    }

    /// Validate that the frame data matches expected dimensions.
    pub fn is_valid(&self) -> bool {
        let expected_size = Self::bgra_buffer_size(self.width, self.height);
        expected_size > 0 && self.data.len() == expected_size
    }

    /// Convert into a caller-facing [`Frame`].
    ///
    /// Scales with nearest-neighbour sampling when `resize` differs from the
    /// native size, then lays samples out according to `format`.
    pub fn to_frame(&self, format: FrameFormat, resize: Option<FrameSize>) -> CaptureResult<Frame> {
        if !self.is_valid() {
            return Err(CaptureError::FrameConversion(format!(
                "expected {} bytes for {}x{} BGRA, got {}",
                Self::bgra_buffer_size(self.width, self.height),
                self.width,
                self.height,
                self.data.len()
            )));
        }

        let out = resize.unwrap_or(FrameSize::new(self.width, self.height));
        if out.pixel_count() == 0 {
            return Err(CaptureError::FrameConversion(format!(
                "cannot resize to {}x{}",
                out.width, out.height
            )));
        }

        let src_w = self.width as usize;
        let src_h = self.height as usize;
        let dst_w = out.width as usize;
        let dst_h = out.height as usize;

        let mut data = Vec::with_capacity(out.pixel_count() * format.channels());
        for row in 0..dst_h {
            let src_row = row * src_h / dst_h;
            for col in 0..dst_w {
                let src_col = col * src_w / dst_w;
                let offset = (src_row * src_w + src_col) * BGRA_CHANNELS;
                let px = &self.data[offset..offset + BGRA_CHANNELS];

                match format {
                    FrameFormat::Bgr => data.extend_from_slice(&px[..3]),
                    FrameFormat::Rgb => data.extend_from_slice(&[px[2], px[1], px[0]]),
                    FrameFormat::Bgra => data.extend_from_slice(px),
                }
            }
        }

        Ok(Frame {
            data: Bytes::from(data),
            width: out.width,
            height: out.height,
            format,
            sequence: self.sequence,
            timestamp: self.timestamp,
        })
    }
}

/// A captured image as a height x width x channels array of samples.
///
/// Samples are interleaved and row-major. The frame is an owned snapshot;
/// the session keeps no reference to it.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Bytes,
    width: u32,
    height: u32,
    format: FrameFormat,
    sequence: u64,
    timestamp: CaptureTimestamp,
}

impl Frame {
    /// Array shape as `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.format.channels(),
        )
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame size.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Samples per pixel.
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Pixel layout.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Backend sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Capture timestamp.
    pub fn timestamp(&self) -> CaptureTimestamp {
        self.timestamp
    }

    /// All samples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Samples of one pixel, or None if out of bounds.
    pub fn pixel(&self, row: usize, col: usize) -> Option<&[u8]> {
        let (h, w, c) = self.shape();
        if row >= h || col >= w {
            return None;
        }
        let offset = (row * w + col) * c;
        self.data.get(offset..offset + c)
    }

    /// Mean of all samples.
    pub fn mean_sample(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&s| s as u64).sum();
        sum as f64 / self.data.len() as f64
    }
}
