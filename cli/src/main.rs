//! acapture command-line entry point.

fn main() -> anyhow::Result<()> {
    acapture_lib::run()
}
