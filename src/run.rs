//! File-level processing: read, detect flavor, pre-scan, modulate, write.
//!
//! This is the only place the program touches the filesystem. A fatal
//! configuration error aborts before the output file is opened, so a
//! partial or corrupt file is never left behind.

use std::fs;
use std::path::Path;

use anyhow::Context;
use gcodewarp_core::config::ModulationConfig;
use gcodewarp_core::flavor::{self, SlicerFlavor};
use gcodewarp_engine::{NonplanarProcessor, Prescan, ProcessingStats, TracingListener};

/// Post-process `input` and write the result to `output` (which may be the
/// same path for an in-place rewrite).
pub fn process_file(
    input: &Path,
    output: &Path,
    config: ModulationConfig,
) -> anyhow::Result<ProcessingStats> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let lines: Vec<&str> = text.lines().collect();

    let flavor = SlicerFlavor::detect(lines.iter().copied());
    let gcode_flavor = flavor::detect_gcode_flavor(lines.iter().copied());
    match flavor {
        Some(flavor) => tracing::info!(%flavor, gcode_flavor = ?gcode_flavor, "detected slicer"),
        None => tracing::info!("unknown slicer, assuming PrusaSlicer markers"),
    }
    let markers = flavor::marker_table_for(flavor, gcode_flavor.as_deref());

    let prescan = Prescan::scan(lines.iter().copied(), markers);
    let mut processor = NonplanarProcessor::new(config, markers, &prescan, TracingListener)?;
    let rewritten = processor.process(lines.iter().copied());
    let stats = processor.stats();

    let mut out = rewritten.join("\n");
    out.push('\n');
    fs::write(output, out)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        lines_in = stats.lines_in,
        lines_out = stats.lines_out,
        moves_modulated = stats.moves_modulated,
        layers = stats.layers,
        "wrote {}",
        output.display()
    );
    Ok(stats)
}
