//! Processing event listeners.
//!
//! The engine reports structured per-line events through this seam instead
//! of writing logs itself. The binary installs [`TracingListener`]; tests
//! mostly run with [`NoOpListener`].

use gcodewarp_core::gcode::Region;

/// Callbacks for notable events during a processing pass.
pub trait ProcessListener {
    /// A type marker switched the active region.
    fn on_region_change(&self, line_number: usize, region: Region) {
        let _ = (line_number, region);
    }

    /// A new layer was committed.
    fn on_layer_change(&self, line_number: usize, index: u32, z: f64) {
        let _ = (line_number, index, z);
    }

    /// An eligible move was subdivided and modulated.
    fn on_move_modulated(&self, line_number: usize, segments: usize) {
        let _ = (line_number, segments);
    }

    /// A move-shaped line had an unparseable field and was passed through.
    fn on_malformed_line(&self, line_number: usize, line: &str, reason: &str) {
        let _ = (line_number, line, reason);
    }
}

/// Listener that ignores every event.
pub struct NoOpListener;

impl ProcessListener for NoOpListener {}

/// Listener that forwards events to `tracing`.
pub struct TracingListener;

impl ProcessListener for TracingListener {
    fn on_region_change(&self, line_number: usize, region: Region) {
        tracing::debug!(line_number, %region, "region change");
    }

    fn on_layer_change(&self, line_number: usize, index: u32, z: f64) {
        tracing::debug!(line_number, layer = index, z, "layer change");
    }

    fn on_move_modulated(&self, line_number: usize, segments: usize) {
        tracing::trace!(line_number, segments, "move modulated");
    }

    fn on_malformed_line(&self, line_number: usize, line: &str, reason: &str) {
        tracing::warn!(line_number, %reason, "malformed move passed through: {}", line);
    }
}
