//! # GCodeWarp Engine
//!
//! The segmentation-and-modulation engine: walks a G-code line stream,
//! tracks regions and layers, subdivides eligible moves, perturbs Z with a
//! periodic waveform (damped near solid-infill layers and ramp-limited
//! across layers), and rescales extrusion so volume per unit of true travel
//! distance stays constant.
//!
//! The engine owns no I/O: it consumes lines and produces lines, reporting
//! structured events through [`listener::ProcessListener`].

pub mod listener;
pub mod modulate;
pub mod prescan;
pub mod processor;
pub mod rewrite;
pub mod segment;
pub mod tracker;
pub mod wave;

pub use listener::{NoOpListener, ProcessListener, TracingListener};
pub use modulate::{compensate_extrusion, Modulator};
pub use prescan::Prescan;
pub use processor::{NonplanarProcessor, ProcessingStats};
pub use segment::{PathPoint, Segmenter, SubSegment};
pub use tracker::{RegionTracker, TrackerEvent};
