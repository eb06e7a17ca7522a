//! Show media information.

use anyhow::Context;
use std::path::PathBuf;
use stillframe_core::format_timestamp;
use stillframe_media::MediaProbe;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let probe = MediaProbe::probe(&path)
        .with_context(|| format!("Failed to probe {}", path.display()))?;

    println!("File: {}", probe.path);
    println!(
        "  Duration: {} ({:.3}s)",
        format_timestamp(probe.duration),
        probe.duration
    );
    println!("  Resolution: {}x{}", probe.width, probe.height);
    if let Some(fps) = probe.frame_rate {
        println!("  Frame rate: {fps:.3} fps");
    }
    if !probe.codec.is_empty() {
        println!("  Codec: {}", probe.codec);
    }
    if !probe.format.is_empty() {
        println!("  Container: {}", probe.format);
    }
    Ok(())
}
