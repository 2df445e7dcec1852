//! Capture target discovery.

use tracing::{debug, instrument};

use acapture_capture::{CaptureBackend, CaptureError, CaptureResult};
use acapture_types::{Target, TargetFilter};

/// List every target the backend can currently capture.
///
/// The result is computed fresh on each call and reflects live backend
/// state. No session is started or affected.
#[instrument(name = "list_targets", skip(backend), fields(backend = backend.name()))]
pub fn list_targets(backend: &dyn CaptureBackend) -> CaptureResult<Vec<Target>> {
    if !backend.is_supported() {
        return Err(CaptureError::Discovery(format!(
            "{} backend is not supported on this platform",
            backend.name()
        )));
    }

    let targets = backend.enumerate_targets().map_err(|e| match e {
        CaptureError::Discovery(_) => e,
        other => CaptureError::Discovery(other.to_string()),
    })?;

    debug!(count = targets.len(), "Discovered targets");
    Ok(targets)
}

/// List targets matching `filter`.
pub fn discover(
    backend: &dyn CaptureBackend,
    filter: &TargetFilter,
) -> CaptureResult<Vec<Target>> {
    Ok(list_targets(backend)?
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect())
}

/// Resolve a target id against the backend's current targets.
pub fn find_target(backend: &dyn CaptureBackend, id: &str) -> CaptureResult<Target> {
    list_targets(backend)?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CaptureError::TargetNotFound(id.to_string()))
}
