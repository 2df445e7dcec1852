//! Subcommand handlers.

use anyhow::Context;
use tracing::{debug, instrument};

use acapture_capture::{CaptureBackend, Frame, SyntheticBackend};
use acapture_env::{discover, Environment};
use acapture_types::{FrameSize, SessionConfig, SessionInfo, SessionMetrics, TargetFilter};

use crate::{GrabArgs, TargetsArgs};

/// Print discovered targets.
#[instrument(skip_all)]
pub fn targets(args: &TargetsArgs) -> anyhow::Result<()> {
    let backend = SyntheticBackend::new();
    let filter = TargetFilter {
        kind: args.kind.map(Into::into),
        label_contains: args.label.clone(),
    };

    let targets = discover(&backend, &filter).context("Failed to list capture targets")?;
    debug!(count = targets.len(), backend = backend.name(), "Listing targets");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        for target in &targets {
            println!("{}", target);
        }
    }

    Ok(())
}

/// Run one reset, `args.steps` steps, and close.
#[instrument(skip_all, fields(steps = args.steps))]
pub fn grab(args: &GrabArgs) -> anyhow::Result<()> {
    let (frame, info, metrics) = capture(args)?;

    if args.json {
        let summary = summarize(&info, &frame, &metrics);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "target: {} ({}), {} restart(s)",
            info.target_id, info.target_label, info.restarts
        );
        println!("{}", describe_frame(&frame));
        println!(
            "delivered {} frame(s), skipped {}, {} timeout(s)",
            metrics.frames_delivered, metrics.frames_skipped, metrics.timeouts
        );
    }

    Ok(())
}

/// Drive a session and return the last frame with the session's info and metrics.
pub(crate) fn capture(args: &GrabArgs) -> anyhow::Result<(Frame, SessionInfo, SessionMetrics)> {
    let config = build_config(args)?;
    let mut env = Environment::with_default_backend(None, config)
        .context("Failed to create capture session")?;

    let (mut frame, info) = env.reset().context("Failed to start capture")?;
    for step in 0..args.steps {
        frame = env
            .step(())
            .with_context(|| format!("Failed to capture frame at step {}", step + 1))?
            .observation;
    }
    let metrics = env.metrics();
    env.close();

    Ok((frame, info, metrics))
}

/// JSON summary of a grab.
pub(crate) fn summarize(
    info: &SessionInfo,
    frame: &Frame,
    metrics: &SessionMetrics,
) -> serde_json::Value {
    serde_json::json!({
        "info": info,
        "shape": frame.shape(),
        "size": frame.size(),
        "format": frame.format().name(),
        "sequence": frame.sequence(),
        "pts_ms": frame.timestamp().pts_ms(),
        "mean_sample": frame.mean_sample(),
        "metrics": metrics,
    })
}

/// Merge the config file (if any) with command-line overrides.
pub(crate) fn build_config(args: &GrabArgs) -> anyhow::Result<SessionConfig> {
    let mut config = match args.config {
        Some(ref path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    if let Some(ref target) = args.target {
        config.target = Some(target.clone());
    }
    if let (Some(width), Some(height)) = (args.width, args.height) {
        config.resize = Some(FrameSize::new(width, height));
    }
    if let Some(format) = args.format {
        config.frame_format = format.into();
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }

    config.validate()?;
    Ok(config)
}

fn describe_frame(frame: &Frame) -> String {
    let (h, w, c) = frame.shape();
    format!(
        "frame #{} at {} ms: shape ({}, {}, {}) {}, mean sample {:.1}",
        frame.sequence(),
        frame.timestamp().pts_ms(),
        h,
        w,
        c,
        frame.format().name(),
        frame.mean_sample()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    use acapture_types::FrameFormat;

    use crate::{Cli, Command};

    fn grab_args(argv: &[&str]) -> GrabArgs {
        let mut full = vec!["acapture", "grab"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Grab(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&grab_args(&[])).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_build_config_overrides() {
        let args = grab_args(&[
            "--target", "window:1", "--width", "320", "--height", "200", "--format", "rgb",
            "--fps", "10",
        ]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.target.as_deref(), Some("window:1"));
        assert_eq!(config.resize, Some(FrameSize::new(320, 200)));
        assert_eq!(config.frame_format, FrameFormat::Rgb);
        assert_eq!(config.fps, 10);
    }

    #[test]
    fn test_build_config_rejects_zero_fps() {
        assert!(build_config(&grab_args(&["--fps", "0"])).is_err());
    }

    #[test]
    fn test_width_requires_height() {
        assert!(Cli::try_parse_from(["acapture", "grab", "--width", "10"]).is_err());
    }

    #[test]
    fn test_grab_small_window() {
        let args = grab_args(&[
            "--target", "window:1", "--width", "32", "--height", "24", "--fps", "120",
            "--steps", "2",
        ]);
        let (frame, info, metrics) = capture(&args).unwrap();
        let summary = summarize(&info, &frame, &metrics);

        assert_eq!(summary["shape"], serde_json::json!([24, 32, 3]));
        assert_eq!(summary["size"], serde_json::json!({"width": 32, "height": 24}));
        assert_eq!(summary["format"], "bgr");
        assert_eq!(summary["info"]["target_id"], "window:1");
        assert_eq!(summary["metrics"]["frames_delivered"], 3);
        assert!(describe_frame(&frame).contains("shape (24, 32, 3) bgr"));
    }
}
