//! Capture session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use tracing::{debug, info, instrument, trace, warn};

use acapture_capture::{
    CaptureBackend, CaptureError, CaptureOptions, CaptureResult, CaptureSource, CapturedFrame,
    Frame, SyntheticBackend,
};
use acapture_types::{
    FrameSize, SessionConfig, SessionInfo, SessionMetrics, SessionState, StepInfo, Target,
};

use crate::discovery::find_target;
use crate::metrics::MetricsCollector;

/// Result of a [`Environment::step`] call.
///
/// Only `observation` and `info` carry data. The remaining fields exist for
/// parity with step-wise environments and always hold inert values.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// The freshest captured frame.
    pub observation: Frame,

    /// Always `0.0`.
    pub reward: f32,

    /// Always `false`.
    pub terminated: bool,

    /// Always `false`.
    pub truncated: bool,

    /// Frame sequencing details.
    pub info: StepInfo,
}

/// The capture resource held while running.
struct ActiveCapture {
    source: Box<dyn CaptureSource>,
    frames: Receiver<CapturedFrame>,
    target: Target,
}

impl ActiveCapture {
    /// Stop the source and release it.
    fn shutdown(mut self) {
        if let Err(e) = self.source.stop() {
            warn!(target_id = %self.target.id, "Failed to stop capture source: {}", e);
        }
    }
}

/// A capture session bound to one target.
///
/// Construction only prepares state. `reset` (re)starts capture and returns
/// the first frame, `step` returns the next one, and `close` releases the
/// capture resource for good.
pub struct Environment {
    backend: Arc<dyn CaptureBackend>,
    requested: Option<Target>,
    config: SessionConfig,
    state: SessionState,
    active: Option<ActiveCapture>,
    metrics: MetricsCollector,
}

impl Environment {
    /// Create a session on `backend`.
    ///
    /// An explicit `target` takes precedence over `config.target`. With
    /// neither, the backend's default target is bound at reset. The target
    /// is not contacted here.
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        target: Option<Target>,
        config: SessionConfig,
    ) -> CaptureResult<Self> {
        config.validate()?;

        debug!(
            backend = backend.name(),
            target_id = ?target.as_ref().map(|t| &t.id),
            "Creating capture session"
        );

        Ok(Self {
            backend,
            requested: target,
            config,
            state: SessionState::NotStarted,
            active: None,
            metrics: MetricsCollector::new(),
        })
    }

    /// Create a session on a fresh [`SyntheticBackend`].
    pub fn with_default_backend(
        target: Option<Target>,
        config: SessionConfig,
    ) -> CaptureResult<Self> {
        Self::new(Arc::new(SyntheticBackend::new()), target, config)
    }

    /// Stop any running capture, start a new one, and return its first frame.
    ///
    /// This is always a full restart. On failure no resource is held and the
    /// session is `NotStarted`.
    #[instrument(name = "env_reset", skip(self), fields(backend = self.backend.name()))]
    pub fn reset(&mut self) -> CaptureResult<(Frame, SessionInfo)> {
        if self.state.is_closed() {
            return Err(CaptureError::Closed);
        }

        if let Some(previous) = self.active.take() {
            info!(target_id = %previous.target.id, "Stopping capture for restart");
            previous.shutdown();
        }
        self.state = SessionState::NotStarted;
        self.metrics.stop();

        self.ensure_access()?;
        let target = self.resolve_target().map_err(into_acquisition)?;

        let mut source = self.backend.open(&target, &CaptureOptions::from(&self.config))?;
        let frames = source.start()?;
        let active = ActiveCapture {
            source,
            frames,
            target,
        };

        let (raw, skipped) =
            match await_frame(&active.frames, self.config.frame_timeout(), &self.metrics) {
                Ok(received) => received,
                Err(e) => {
                    active.shutdown();
                    return Err(e);
                }
            };
        let frame = match raw.to_frame(self.config.frame_format, self.config.resize) {
            Ok(frame) => frame,
            Err(e) => {
                active.shutdown();
                return Err(e);
            }
        };

        let restarts = self.metrics.record_restart();
        self.metrics.record_skipped(skipped);
        self.metrics.record_frame();

        let info = SessionInfo {
            target_id: active.target.id.clone(),
            target_label: active.target.label.clone(),
            width: frame.width(),
            height: frame.height(),
            channels: frame.channels(),
            frame_format: frame.format(),
            fps: self.config.fps,
            restarts,
        };

        info!(
            target_id = %info.target_id,
            width = info.width,
            height = info.height,
            restarts,
            "Capture running"
        );

        self.active = Some(active);
        self.state = SessionState::Running;

        Ok((frame, info))
    }

    /// Return the freshest frame from the running capture.
    ///
    /// `action` is accepted for interface parity with step-wise environments
    /// and has no effect on capture.
    #[instrument(name = "env_step", level = "trace", skip_all)]
    pub fn step<A>(&mut self, _action: A) -> CaptureResult<StepOutcome> {
        let active = match self.state {
            SessionState::Closed => return Err(CaptureError::Closed),
            SessionState::NotStarted => return Err(CaptureError::NotRunning),
            SessionState::Running => self.active.as_ref().ok_or(CaptureError::NotRunning)?,
        };

        let (raw, skipped) =
            await_frame(&active.frames, self.config.frame_timeout(), &self.metrics)?;
        let observation = raw.to_frame(self.config.frame_format, self.config.resize)?;

        self.metrics.record_skipped(skipped);
        self.metrics.record_frame();
        trace!(sequence = observation.sequence(), skipped, "Step");

        Ok(StepOutcome {
            info: StepInfo {
                sequence: observation.sequence(),
                skipped_frames: skipped,
            },
            observation,
            reward: 0.0,
            terminated: false,
            truncated: false,
        })
    }

    /// Release the capture resource and mark the session closed.
    ///
    /// Idempotent. Teardown errors are logged, never returned.
    #[instrument(name = "env_close", skip(self))]
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            info!(target_id = %active.target.id, "Stopping capture");
            active.shutdown();
        }

        if !self.state.is_closed() {
            self.metrics.stop();
            self.state = SessionState::Closed;
            info!("Session closed");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if a capture is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// The bound target while running, otherwise the requested one.
    pub fn target(&self) -> Option<&Target> {
        self.active
            .as_ref()
            .map(|a| &a.target)
            .or(self.requested.as_ref())
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dimensions frames are delivered in, once running.
    pub fn output_frame_size(&self) -> Option<FrameSize> {
        let active = self.active.as_ref()?;
        self.config.resize.or_else(|| {
            let (width, height) = active.source.dimensions();
            Some(FrameSize::new(width, height))
        })
    }

    /// Capture statistics snapshot.
    pub fn metrics(&self) -> SessionMetrics {
        self.metrics.snapshot()
    }

    fn resolve_target(&self) -> CaptureResult<Target> {
        let id = match (&self.requested, &self.config.target) {
            (Some(target), _) => Some(target.id.as_str()),
            (None, Some(id)) => Some(id.as_str()),
            (None, None) => None,
        };

        match id {
            Some(id) => find_target(self.backend.as_ref(), id),
            None => self.backend.default_target(),
        }
    }

    fn ensure_access(&self) -> CaptureResult<()> {
        if !self.backend.is_supported() {
            return Err(CaptureError::Acquisition(format!(
                "{} backend is not supported on this platform",
                self.backend.name()
            )));
        }

        if self.backend.has_permission() {
            return Ok(());
        }

        warn!("Capture permission not granted, requesting");
        if self.backend.request_permission() {
            Ok(())
        } else {
            Err(CaptureError::PermissionDenied)
        }
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.close();
    }
}

/// Take the newest queued frame, or wait up to `timeout` for one.
///
/// Returns the frame and how many older queued frames were discarded.
fn await_frame(
    frames: &Receiver<CapturedFrame>,
    timeout: Duration,
    metrics: &MetricsCollector,
) -> CaptureResult<(CapturedFrame, u64)> {
    let mut latest = None;
    let mut skipped = 0u64;

    loop {
        match frames.try_recv() {
            Ok(frame) => {
                if latest.replace(frame).is_some() {
                    skipped += 1;
                }
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if latest.is_none() {
                    return Err(CaptureError::SourceLost);
                }
                break;
            }
        }
    }

    if let Some(frame) = latest {
        return Ok((frame, skipped));
    }

    match frames.recv_timeout(timeout) {
        Ok(frame) => Ok((frame, 0)),
        Err(RecvTimeoutError::Timeout) => {
            metrics.record_timeout();
            Err(CaptureError::FrameTimeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(CaptureError::SourceLost),
    }
}

/// Discovery failures during reset surface as acquisition failures.
fn into_acquisition(err: CaptureError) -> CaptureError {
    match err {
        CaptureError::Discovery(message) => CaptureError::Acquisition(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use bytes::Bytes;
    use crossbeam_channel::Sender;

    use acapture_capture::{CaptureTimestamp, ErrorKind, FRAME_CHANNEL_CAPACITY};
    use acapture_types::FrameFormat;

    use crate::discovery::list_targets;

    #[derive(Clone, Copy)]
    enum Behavior {
        /// Source starts but never produces a frame.
        Stall,
        /// Source queues this many frames, then disconnects.
        DisconnectAfter(usize),
        /// Permission is missing and requests are refused.
        DenyPermission,
        /// Backend does not work on this platform.
        Unsupported,
        /// Backend does not work on this platform but still lists targets.
        UnsupportedListed,
        /// Source queues one frame, then stays connected without producing.
        StallAfterFirst,
    }

    struct ScriptedBackend {
        behavior: Behavior,
        target: Target,
        live: Arc<AtomicUsize>,
        permission_requests: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                target: Target::display("screen0", "Primary Screen", 8, 6),
                live: Arc::new(AtomicUsize::new(0)),
                permission_requests: AtomicUsize::new(0),
            }
        }
    }

    impl CaptureBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_supported(&self) -> bool {
            !matches!(
                self.behavior,
                Behavior::Unsupported | Behavior::UnsupportedListed
            )
        }

        fn has_permission(&self) -> bool {
            !matches!(self.behavior, Behavior::DenyPermission)
        }

        fn request_permission(&self) -> bool {
            self.permission_requests.fetch_add(1, Ordering::SeqCst);
            self.has_permission()
        }

        fn enumerate_targets(&self) -> CaptureResult<Vec<Target>> {
            if matches!(self.behavior, Behavior::Unsupported) {
                return Err(CaptureError::Discovery("no display server".to_string()));
            }
            Ok(vec![self.target.clone()])
        }

        fn open(
            &self,
            target: &Target,
            _options: &CaptureOptions,
        ) -> CaptureResult<Box<dyn CaptureSource>> {
            Ok(Box::new(ScriptedSource {
                target: target.clone(),
                behavior: self.behavior,
                live: Arc::clone(&self.live),
                sender: None,
                active: false,
            }))
        }
    }

    struct ScriptedSource {
        target: Target,
        behavior: Behavior,
        live: Arc<AtomicUsize>,
        sender: Option<Sender<CapturedFrame>>,
        active: bool,
    }

    impl CaptureSource for ScriptedSource {
        fn start(&mut self) -> CaptureResult<Receiver<CapturedFrame>> {
            let (sender, receiver) = crossbeam_channel::bounded(FRAME_CHANNEL_CAPACITY);
            match self.behavior {
                Behavior::DisconnectAfter(count) => {
                    for sequence in 0..count as u64 {
                        let frame = raw_frame(self.target.width, self.target.height, sequence);
                        sender.try_send(frame).unwrap();
                    }
                }
                Behavior::StallAfterFirst => {
                    let frame = raw_frame(self.target.width, self.target.height, 0);
                    sender.try_send(frame).unwrap();
                    self.sender = Some(sender);
                }
                _ => self.sender = Some(sender),
            }
            self.active = true;
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(receiver)
        }

        fn stop(&mut self) -> CaptureResult<()> {
            if self.active {
                self.sender = None;
                self.active = false;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn dimensions(&self) -> (u32, u32) {
            (self.target.width, self.target.height)
        }
    }

    impl Drop for ScriptedSource {
        fn drop(&mut self) {
            let _ = self.stop();
        }
    }

    fn raw_frame(width: u32, height: u32, sequence: u64) -> CapturedFrame {
        let data = vec![sequence as u8; CapturedFrame::bgra_buffer_size(width, height)];
        CapturedFrame::new(
            Bytes::from(data),
            width,
            height,
            CaptureTimestamp::now(Instant::now()),
            sequence,
        )
    }

    fn fast_config() -> SessionConfig {
        SessionConfig {
            fps: 120,
            frame_timeout_ms: 2000,
            ..Default::default()
        }
    }

    fn synthetic(width: u32, height: u32) -> Arc<SyntheticBackend> {
        Arc::new(SyntheticBackend::with_targets(vec![
            Target::display("screen0", "Primary Screen", width, height),
            Target::window("window:1", "Synthetic Window", width / 2, height / 2),
        ]))
    }

    #[test]
    fn test_step_before_reset_not_running() {
        let mut env = Environment::new(synthetic(32, 24), None, fast_config()).unwrap();

        let err = env.step(()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotRunning);
        assert!(env.state().is_not_started());
        assert!(env.output_frame_size().is_none());
    }

    #[test]
    fn test_reset_frame_matches_native_size() {
        let backend = synthetic(32, 24);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        let (frame, info) = env.reset().unwrap();
        assert_eq!(frame.shape(), (24, 32, 3));
        assert_eq!((info.width, info.height, info.channels), (32, 24, 3));
        assert_eq!(info.target_id, "screen0");
        assert_eq!(env.output_frame_size(), Some(FrameSize::new(32, 24)));
        assert!(env.is_running());
    }

    #[test]
    fn test_reset_frame_matches_resize_and_format() {
        let config = SessionConfig {
            resize: Some(FrameSize::new(10, 5)),
            frame_format: FrameFormat::Bgra,
            ..fast_config()
        };
        let mut env = Environment::new(synthetic(32, 24), None, config).unwrap();

        let (frame, info) = env.reset().unwrap();
        assert_eq!(frame.shape(), (5, 10, 4));
        assert_eq!(info.frame_format, FrameFormat::Bgra);

        let outcome = env.step(()).unwrap();
        assert_eq!(outcome.observation.shape(), (5, 10, 4));
        assert_eq!(env.output_frame_size(), Some(FrameSize::new(10, 5)));
    }

    #[test]
    fn test_reset_twice_replaces_resource() {
        let backend = synthetic(16, 16);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        let (_, first) = env.reset().unwrap();
        assert_eq!(backend.live_sources(), 1);

        let (frame, second) = env.reset().unwrap();
        assert_eq!(backend.live_sources(), 1);
        assert_eq!(first.restarts, 1);
        assert_eq!(second.restarts, 2);
        // A new source numbers its frames from zero.
        assert_eq!(frame.sequence(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let backend = synthetic(16, 16);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();
        env.reset().unwrap();

        for _ in 0..3 {
            env.close();
            assert_eq!(backend.live_sources(), 0);
            assert_eq!(env.state(), SessionState::Closed);
        }
    }

    #[test]
    fn test_close_before_reset() {
        let backend = synthetic(16, 16);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        env.close();
        env.close();
        assert_eq!(env.state(), SessionState::Closed);
        assert_eq!(backend.live_sources(), 0);
    }

    #[test]
    fn test_closed_session_rejects_reset_and_step() {
        let backend = synthetic(16, 16);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();
        env.reset().unwrap();
        env.close();

        assert_eq!(env.reset().unwrap_err().kind(), ErrorKind::Closed);
        assert_eq!(env.step(()).unwrap_err().kind(), ErrorKind::Closed);
        assert_eq!(backend.live_sources(), 0);
    }

    #[test]
    fn test_screen_capture_scenario() {
        let backend = Arc::new(SyntheticBackend::with_targets(vec![Target::display(
            "screen0",
            "Primary Screen",
            64,
            48,
        )]));

        let targets = list_targets(backend.as_ref()).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "screen0");
        assert_eq!(targets[0].label, "Primary Screen");

        let mut env =
            Environment::new(backend.clone(), Some(targets[0].clone()), fast_config()).unwrap();

        let (frame, info) = env.reset().unwrap();
        assert_eq!(frame.shape(), (48, 64, 3));
        assert_eq!(info.target_label, "Primary Screen");
        assert_eq!(info.fps, 120);

        for _ in 0..3 {
            let outcome = env.step(()).unwrap();
            assert_eq!(outcome.observation.shape(), (48, 64, 3));
            assert_eq!(outcome.reward, 0.0);
            assert!(!outcome.terminated && !outcome.truncated);
        }

        env.close();
        assert_eq!(env.step(()).unwrap_err().kind(), ErrorKind::Closed);
        assert_eq!(env.metrics().frames_delivered, 4);
    }

    #[test]
    fn test_step_returns_advancing_frames() {
        let mut env = Environment::new(synthetic(8, 8), None, fast_config()).unwrap();
        let (first, _) = env.reset().unwrap();

        let second = env.step(None::<()>).unwrap().observation;
        let third = env.step(None::<()>).unwrap().observation;
        assert!(second.sequence() > first.sequence());
        assert!(third.sequence() > second.sequence());
    }

    #[test]
    fn test_reset_unknown_target_stays_not_started() {
        let backend = synthetic(16, 16);
        let config = SessionConfig {
            target: Some("screen7".to_string()),
            ..fast_config()
        };
        let mut env = Environment::new(backend.clone(), None, config).unwrap();

        let err = env.reset().unwrap_err();
        assert!(matches!(err, CaptureError::TargetNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert_eq!(env.state(), SessionState::NotStarted);
        assert_eq!(env.step(()).unwrap_err().kind(), ErrorKind::NotRunning);
    }

    #[test]
    fn test_failed_restart_releases_previous_resource() {
        let backend = synthetic(16, 16);
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();
        env.reset().unwrap();

        backend.set_targets(Vec::new());
        assert_eq!(env.reset().unwrap_err().kind(), ErrorKind::Acquisition);
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(env.state(), SessionState::NotStarted);
        assert_eq!(env.step(()).unwrap_err().kind(), ErrorKind::NotRunning);
    }

    #[test]
    fn test_explicit_target_overrides_config_target() {
        let config = SessionConfig {
            target: Some("screen0".to_string()),
            ..fast_config()
        };
        let window = Target::window("window:1", "Synthetic Window", 8, 8);
        let mut env = Environment::new(synthetic(16, 16), Some(window), config).unwrap();

        let (frame, info) = env.reset().unwrap();
        assert_eq!(info.target_id, "window:1");
        assert_eq!(frame.shape(), (8, 8, 3));
        assert_eq!(env.target().map(|t| t.id.as_str()), Some("window:1"));
    }

    #[test]
    fn test_reset_times_out_on_stalled_source() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::Stall));
        let config = SessionConfig {
            frame_timeout_ms: 50,
            ..Default::default()
        };
        let mut env = Environment::new(backend.clone(), None, config).unwrap();

        let started = Instant::now();
        let err = env.reset().unwrap_err();
        assert!(matches!(err, CaptureError::FrameTimeout(_)));
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
        assert_eq!(env.state(), SessionState::NotStarted);
        assert_eq!(env.metrics().timeouts, 1);
    }

    #[test]
    fn test_step_times_out_on_stalled_source() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::StallAfterFirst));
        let config = SessionConfig {
            frame_timeout_ms: 50,
            ..Default::default()
        };
        let mut env = Environment::new(backend.clone(), None, config).unwrap();
        env.reset().unwrap();

        let started = Instant::now();
        let err = env.step(()).unwrap_err();
        assert!(matches!(err, CaptureError::FrameTimeout(_)));
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(env.metrics().timeouts, 1);
        assert_eq!(env.state(), SessionState::Running);
        assert_eq!(backend.live.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_takes_freshest_queued_frame() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::DisconnectAfter(3)));
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        let (frame, _) = env.reset().unwrap();
        assert_eq!(frame.sequence(), 2);
        assert_eq!(env.metrics().frames_skipped, 2);

        let err = env.step(()).unwrap_err();
        assert!(matches!(err, CaptureError::SourceLost));
        assert_eq!(err.kind(), ErrorKind::Acquisition);
    }

    #[test]
    fn test_reset_fails_when_source_never_delivers() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::DisconnectAfter(0)));
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        assert!(matches!(env.reset(), Err(CaptureError::SourceLost)));
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_permission_denied() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::DenyPermission));
        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();

        let err = env.reset().unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied));
        assert_eq!(backend.permission_requests.load(Ordering::SeqCst), 1);
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsupported_backend() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::Unsupported));

        let err = list_targets(backend.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);

        let mut env = Environment::new(backend, None, fast_config()).unwrap();
        assert_eq!(env.reset().unwrap_err().kind(), ErrorKind::Acquisition);
    }

    #[test]
    fn test_unsupported_backend_default_target() {
        let backend = Arc::new(ScriptedBackend::new(Behavior::UnsupportedListed));
        assert_eq!(backend.enumerate_targets().unwrap().len(), 1);

        let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();
        let err = env.reset().unwrap_err();
        assert!(matches!(err, CaptureError::Acquisition(_)));
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
        assert!(env.state().is_not_started());

        let screen = Target::display("screen0", "Primary Screen", 8, 6);
        let mut env = Environment::new(backend.clone(), Some(screen), fast_config()).unwrap();
        assert_eq!(env.reset().unwrap_err().kind(), ErrorKind::Acquisition);
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sessions_are_independent() {
        let backend = synthetic(16, 16);
        let window = Target::window("window:1", "Synthetic Window", 8, 8);

        let mut screen_env = Environment::new(backend.clone(), None, fast_config()).unwrap();
        let mut window_env =
            Environment::new(backend.clone(), Some(window), fast_config()).unwrap();

        screen_env.reset().unwrap();
        window_env.reset().unwrap();
        assert_eq!(backend.live_sources(), 2);

        screen_env.close();
        assert_eq!(backend.live_sources(), 1);
        assert_eq!(window_env.step(()).unwrap().observation.shape(), (8, 8, 3));

        window_env.reset().unwrap();
        assert_eq!(backend.live_sources(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = SessionConfig {
            resize: Some(FrameSize::new(0, 10)),
            ..Default::default()
        };
        let err = Environment::new(synthetic(16, 16), None, config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_drop_releases_resource() {
        let backend = synthetic(16, 16);
        {
            let mut env = Environment::new(backend.clone(), None, fast_config()).unwrap();
            env.reset().unwrap();
            assert_eq!(backend.live_sources(), 1);
        }
        assert_eq!(backend.live_sources(), 0);
    }

    #[test]
    fn test_default_backend_session() {
        let mut env = Environment::with_default_backend(None, fast_config()).unwrap();
        let (frame, info) = env.reset().unwrap();

        assert_eq!(frame.shape(), (720, 1280, 3));
        assert_eq!(info.target_id, "screen0");
        env.close();
    }
}
