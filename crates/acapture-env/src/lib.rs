//! Step-wise capture environment.
//!
//! This crate wraps a capture backend in a session with an explicit
//! `reset`/`step`/`close` lifecycle, and exposes target discovery.
//!
//! ```no_run
//! use acapture_env::{list_default_targets, Environment};
//! use acapture_types::SessionConfig;
//!
//! for target in list_default_targets()? {
//!     println!("{}", target);
//! }
//!
//! let mut env = Environment::with_default_backend(None, SessionConfig::default())?;
//! let (frame, info) = env.reset()?;
//! let outcome = env.step(())?;
//! env.close();
//! # Ok::<(), acapture_capture::CaptureError>(())
//! ```

mod discovery;
mod metrics;
mod session;

pub use discovery::{discover, find_target, list_targets};
pub use metrics::MetricsCollector;
pub use session::{Environment, StepOutcome};

pub use acapture_capture::{CaptureBackend, CaptureError, CaptureResult, ErrorKind, Frame};

use acapture_capture::SyntheticBackend;
use acapture_types::Target;

/// List targets on the default backend.
pub fn list_default_targets() -> CaptureResult<Vec<Target>> {
    list_targets(&SyntheticBackend::new())
}
