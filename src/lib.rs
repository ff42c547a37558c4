//! # GCodeWarp
//!
//! A post-processor that injects non-planar Z-modulation into sliced
//! 3D-printer G-code. Selected move blocks (perimeters, external
//! perimeters, infill) are subdivided and their Z perturbed by a periodic
//! waveform, with the extrusion rescaled to match the true path length.
//!
//! ## Architecture
//!
//! GCodeWarp is organized as a workspace:
//!
//! 1. **gcodewarp-core** - G-code line model, slicer flavors, configuration
//! 2. **gcodewarp-engine** - region tracking, segmentation, modulation,
//!    extrusion compensation, rewriting
//! 3. **gcodewarp** - the command-line binary that integrates both

pub mod run;

pub use gcodewarp_core::{
    classify, detect_gcode_flavor, marker_table_for, GcodeLine, MarkerTable, ModulationConfig,
    MoveCommand, ParameterError, Region, RegionModulation, SlicerFlavor, WaveDirection, Waveform,
};

pub use gcodewarp_engine::{
    NonplanarProcessor, NoOpListener, Prescan, ProcessListener, ProcessingStats, TracingListener,
};

pub use run::process_file;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // The rewritten G-code may go to stdout one day; keep logs on stderr.
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
