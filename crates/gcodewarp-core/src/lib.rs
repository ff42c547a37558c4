//! # GCodeWarp Core
//!
//! Core types for the GCodeWarp post-processor: the G-code line model and
//! classifier, slicer flavor detection with marker tables, and the modulation
//! configuration with startup validation.

pub mod config;
pub mod error;
pub mod flavor;
pub mod gcode;

pub use config::{
    ModulationConfig, ModulationTarget, RegionModulation, WaveDirection, Waveform,
};
pub use error::{ParameterError, ParameterResult};
pub use flavor::{
    detect_gcode_flavor, layer_height_from_header, marker_table_for, MarkerTable, SlicerFlavor,
};
pub use gcode::{classify, GcodeLine, MoveCommand, Region};
