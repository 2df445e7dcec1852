//! Synthetic capture backend.
//!
//! Renders a moving BGRA test pattern on a producer thread so the capture
//! contract can be exercised on any platform without OS capture APIs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace};

use acapture_types::Target;

use crate::error::CaptureError;
use crate::frame::{CaptureTimestamp, CapturedFrame, BGRA_CHANNELS};
use crate::{
    CaptureBackend, CaptureOptions, CaptureResult, CaptureSource, FRAME_CHANNEL_CAPACITY,
};

/// Side length of the cursor marker in pixels.
const CURSOR_SIZE: usize = 8;

/// Backend producing generated frames for a configurable set of targets.
pub struct SyntheticBackend {
    targets: RwLock<Vec<Target>>,
    live_sources: Arc<AtomicUsize>,
}

impl SyntheticBackend {
    /// Create a backend with a primary display and one window.
    pub fn new() -> Self {
        Self::with_targets(vec![
            Target::display("screen0", "Primary Screen", 1280, 720),
            Target::window("window:1", "Synthetic Window", 640, 480),
        ])
    }

    /// Create a backend exposing exactly these targets.
    pub fn with_targets(targets: Vec<Target>) -> Self {
        Self {
            targets: RwLock::new(targets),
            live_sources: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the target list, as if windows opened or closed.
    pub fn set_targets(&self, targets: Vec<Target>) {
        *self.targets.write() = targets;
    }

    /// Number of sources currently capturing.
    pub fn live_sources(&self) -> usize {
        self.live_sources.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for SyntheticBackend {
    fn name(&self) -> &str {
        "synthetic"
    }

    #[instrument(name = "synthetic_enumerate", skip(self))]
    fn enumerate_targets(&self) -> CaptureResult<Vec<Target>> {
        let targets = self.targets.read().clone();
        debug!(count = targets.len(), "Enumerated targets");
        Ok(targets)
    }

    fn open(
        &self,
        target: &Target,
        options: &CaptureOptions,
    ) -> CaptureResult<Box<dyn CaptureSource>> {
        let current = self
            .targets
            .read()
            .iter()
            .find(|t| t.id == target.id)
            .cloned()
            .ok_or_else(|| CaptureError::TargetNotFound(target.id.clone()))?;

        if current.width == 0 || current.height == 0 {
            return Err(CaptureError::Acquisition(format!(
                "target {} has no visible area",
                current.id
            )));
        }

        Ok(Box::new(SyntheticSource::new(
            current,
            options.clone(),
            Arc::clone(&self.live_sources),
        )))
    }
}

/// A running synthetic capture of one target.
pub struct SyntheticSource {
    target: Target,
    options: CaptureOptions,
    capture_thread: Mutex<Option<JoinHandle<()>>>,
    stop_tx: Mutex<Option<Sender<()>>>,
    is_active: AtomicBool,
    live_sources: Arc<AtomicUsize>,
}

impl SyntheticSource {
    fn new(target: Target, options: CaptureOptions, live_sources: Arc<AtomicUsize>) -> Self {
        Self {
            target,
            options,
            capture_thread: Mutex::new(None),
            stop_tx: Mutex::new(None),
            is_active: AtomicBool::new(false),
            live_sources,
        }
    }
}

impl CaptureSource for SyntheticSource {
    #[instrument(name = "synthetic_start", skip(self), fields(target_id = %self.target.id))]
    fn start(&mut self) -> CaptureResult<Receiver<CapturedFrame>> {
        if self.is_active.load(Ordering::SeqCst) {
            return Err(CaptureError::Acquisition("capture already started".to_string()));
        }

        info!(fps = self.options.fps, "Starting synthetic capture");

        let (sender, receiver): (Sender<CapturedFrame>, Receiver<CapturedFrame>) =
            crossbeam_channel::bounded(FRAME_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let width = self.target.width;
        let height = self.target.height;
        let options = self.options.clone();
        let evict_rx = receiver.clone();

        let handle = thread::Builder::new()
            .name(format!("synthetic-{}", self.target.id))
            .spawn(move || produce_frames(width, height, options, sender, evict_rx, stop_rx))
            .map_err(|e| CaptureError::Acquisition(format!("failed to spawn producer: {}", e)))?;

        *self.capture_thread.lock() = Some(handle);
        *self.stop_tx.lock() = Some(stop_tx);
        self.is_active.store(true, Ordering::SeqCst);
        self.live_sources.fetch_add(1, Ordering::SeqCst);

        Ok(receiver)
    }

    #[instrument(name = "synthetic_stop", skip(self), fields(target_id = %self.target.id))]
    fn stop(&mut self) -> CaptureResult<()> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Dropping the sender wakes the producer immediately.
        drop(self.stop_tx.lock().take());

        if let Some(handle) = self.capture_thread.lock().take() {
            handle
                .join()
                .map_err(|_| CaptureError::Acquisition("producer thread panicked".to_string()))?;
        }

        self.is_active.store(false, Ordering::SeqCst);
        self.live_sources.fetch_sub(1, Ordering::SeqCst);
        info!("Synthetic capture stopped");

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn produce_frames(
    width: u32,
    height: u32,
    options: CaptureOptions,
    sender: Sender<CapturedFrame>,
    evict_rx: Receiver<CapturedFrame>,
    stop_rx: Receiver<()>,
) {
    let start_time = Instant::now();
    let interval = Duration::from_secs(1) / options.fps.max(1);
    let mut sequence = 0u64;

    loop {
        let data = render_test_pattern(width, height, sequence, &options);
        let timestamp = CaptureTimestamp::now(start_time);
        let frame = CapturedFrame::new(Bytes::from(data), width, height, timestamp, sequence);

        // When the channel is full, evict the oldest frame so the queue
        // always ends with the newest one.
        match sender.try_send(frame) {
            Ok(()) => trace!(sequence, "Produced frame"),
            Err(TrySendError::Full(frame)) => {
                if let Ok(stale) = evict_rx.try_recv() {
                    trace!(sequence = stale.sequence, "Frame channel full, evicting oldest");
                }
                let _ = sender.try_send(frame);
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Frame receiver dropped, producer exiting");
                return;
            }
        }

        sequence += 1;

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Render one BGRA frame. The pattern scrolls horizontally with `sequence`.
fn render_test_pattern(
    width: u32,
    height: u32,
    sequence: u64,
    options: &CaptureOptions,
) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let shift = sequence as usize;
    let mut data = vec![0u8; w * h * BGRA_CHANNELS];

    for (i, px) in data.chunks_exact_mut(BGRA_CHANNELS).enumerate() {
        let row = i / w;
        let col = i % w;
        px[0] = ((col + shift) % 256) as u8;
        px[1] = (row % 256) as u8;
        px[2] = (sequence % 256) as u8;
        px[3] = 255;

        if options.show_highlight && (row == 0 || col == 0 || row == h - 1 || col == w - 1) {
            px[..3].copy_from_slice(&[0, 0, 255]);
        }
    }

    if options.show_cursor {
        let cx = (shift * 4) % w;
        let cy = h / 2;
        for row in cy..(cy + CURSOR_SIZE).min(h) {
            for col in cx..(cx + CURSOR_SIZE).min(w) {
                let offset = (row * w + col) * BGRA_CHANNELS;
                data[offset..offset + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
    }

    data
}
