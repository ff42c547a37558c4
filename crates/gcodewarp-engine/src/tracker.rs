//! Region and layer state tracking.
//!
//! The tracker is the only mutable context of a processing pass. It consumes
//! every line in file order and annotates the stream: current region tag,
//! layer index, nominal layer Z, nozzle position, and the wall-loop counter
//! that drives phase alternation. It never changes the output by itself.

use gcodewarp_core::flavor::MarkerTable;
use gcodewarp_core::gcode::{MoveCommand, Region};

/// State transition reported back to the processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    None,
    /// A type marker switched the active region.
    RegionChanged(Region),
    /// A new layer was committed (0-based creation order).
    LayerCommitted { index: u32, z: f64 },
}

/// Streaming state machine over classified G-code lines.
#[derive(Debug)]
pub struct RegionTracker {
    markers: &'static MarkerTable,
    region: Region,
    layer_index: Option<u32>,
    /// Transient Z from the latest Z-bearing move; includes Z-hops.
    current_z: f64,
    /// Nominal Z of the committed layer; the ramp and proximity key.
    layer_z: f64,
    layer_height: f64,
    /// Proximity window in mm.
    falloff: f64,
    position: Option<(f64, f64)>,
    loop_index: u32,
    extruded_in_loop: bool,
    /// Set when a layer-change marker arms the next Z move as a commit.
    pending_layer: bool,
    /// Once the file shows layer markers, only marker-armed Z moves commit
    /// layers; without markers every Z move does (Z-hops included).
    saw_layer_marker: bool,
    solid_heights: Vec<f64>,
}

impl RegionTracker {
    pub fn new(
        markers: &'static MarkerTable,
        layer_height: f64,
        falloff_layers: f64,
        mut solid_heights: Vec<f64>,
    ) -> Self {
        solid_heights.sort_by(|a, b| a.partial_cmp(b).expect("non-finite solid height"));
        solid_heights.dedup();
        Self {
            markers,
            region: Region::Other,
            layer_index: None,
            current_z: 0.0,
            layer_z: 0.0,
            layer_height,
            falloff: falloff_layers * layer_height,
            position: None,
            loop_index: 0,
            extruded_in_loop: false,
            pending_layer: false,
            saw_layer_marker: false,
            solid_heights,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn layer_index(&self) -> Option<u32> {
        self.layer_index
    }

    /// Nominal Z of the current layer.
    pub fn layer_z(&self) -> f64 {
        self.layer_z
    }

    /// Z of the latest Z-bearing move (Z-hops included).
    pub fn current_z(&self) -> f64 {
        self.current_z
    }

    pub fn layer_height(&self) -> f64 {
        self.layer_height
    }

    /// Last known planar nozzle position.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    /// Index of the wall loop the next extrusion belongs to, 0-based per
    /// region.
    pub fn loop_index(&self) -> u32 {
        self.loop_index
    }

    /// Consume a comment line (raw text, marker tables match full lines).
    pub fn observe_comment(&mut self, line: &str) -> TrackerEvent {
        if self.markers.is_layer_change(line) {
            self.pending_layer = true;
            self.saw_layer_marker = true;
            return TrackerEvent::None;
        }
        if let Some(region) = self.markers.region_change(line) {
            if region != self.region {
                self.region = region;
                self.loop_index = 0;
                self.extruded_in_loop = false;
                tracing::debug!("region changed to {}", region);
                return TrackerEvent::RegionChanged(region);
            }
        }
        TrackerEvent::None
    }

    /// Consume a move line, updating Z/layer, position, and loop state.
    pub fn observe_move(&mut self, command: &MoveCommand) -> TrackerEvent {
        let mut event = TrackerEvent::None;

        if let Some(z) = command.z {
            self.current_z = z;
            let commits = if self.saw_layer_marker {
                std::mem::take(&mut self.pending_layer)
            } else {
                (z - self.layer_z).abs() > f64::EPSILON || self.layer_index.is_none()
            };
            if commits {
                let index = self.layer_index.map_or(0, |i| i + 1);
                self.layer_index = Some(index);
                self.layer_z = z;
                tracing::debug!(layer = index, z, "layer committed");
                event = TrackerEvent::LayerCommitted { index, z };
            }
        }

        if command.is_travel() && self.region.is_wall() && self.extruded_in_loop {
            // A travel between two extrusion runs starts the next wall loop.
            self.loop_index += 1;
            self.extruded_in_loop = false;
        }
        if command.is_extruding() && command.has_xy() {
            self.extruded_in_loop = true;
        }

        if command.has_xy() {
            let (px, py) = self.position.unwrap_or((0.0, 0.0));
            self.position = Some((command.x.unwrap_or(px), command.y.unwrap_or(py)));
        }

        event
    }

    /// Closeness of the current layer to the nearest solid-infill layer:
    /// 1.0 on the solid layer itself, linearly decaying to 0 over the
    /// falloff window. Files without solid-infill markers yield 0.
    pub fn solid_infill_proximity(&self) -> f64 {
        let Some(nearest) = self
            .solid_heights
            .iter()
            .map(|h| (h - self.layer_z).abs())
            .min_by(|a, b| a.partial_cmp(b).expect("non-finite distance"))
        else {
            return 0.0;
        };
        if self.falloff <= 0.0 {
            return if nearest == 0.0 { 1.0 } else { 0.0 };
        }
        (1.0 - nearest / self.falloff).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gcodewarp_core::flavor::marker_table_for;
    use gcodewarp_core::gcode::{classify, GcodeLine};

    fn tracker_with(solid_heights: Vec<f64>) -> RegionTracker {
        RegionTracker::new(marker_table_for(None, None), 0.2, 4.0, solid_heights)
    }

    fn move_command(line: &str) -> MoveCommand {
        match classify(line) {
            GcodeLine::Move { command, .. } => command,
            other => panic!("expected move, got {:?}", other),
        }
    }

    #[test]
    fn test_moves_before_any_marker_are_other() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_move(&move_command("G1 X1 Y1 E0.1"));
        assert_eq!(tracker.region(), Region::Other);
    }

    #[test]
    fn test_region_transitions() {
        let mut tracker = tracker_with(vec![]);
        assert_eq!(
            tracker.observe_comment(";TYPE:Perimeter"),
            TrackerEvent::RegionChanged(Region::Perimeter)
        );
        assert_eq!(tracker.region(), Region::Perimeter);

        // Unknown comments retain the active region.
        assert_eq!(tracker.observe_comment("; unrelated note"), TrackerEvent::None);
        assert_eq!(tracker.region(), Region::Perimeter);

        // An unrecognized type marker resets to Other.
        assert_eq!(
            tracker.observe_comment(";TYPE:Ironing"),
            TrackerEvent::RegionChanged(Region::Other)
        );
    }

    #[test]
    fn test_layer_commits_without_markers() {
        let mut tracker = tracker_with(vec![]);
        let event = tracker.observe_move(&move_command("G1 Z0.2 F9000"));
        assert_eq!(event, TrackerEvent::LayerCommitted { index: 0, z: 0.2 });
        let event = tracker.observe_move(&move_command("G1 Z0.4"));
        assert_eq!(event, TrackerEvent::LayerCommitted { index: 1, z: 0.4 });
        // Same Z again commits nothing.
        let event = tracker.observe_move(&move_command("G1 Z0.4"));
        assert_eq!(event, TrackerEvent::None);
    }

    #[test]
    fn test_layer_markers_gate_commits() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_comment(";LAYER_CHANGE");
        let event = tracker.observe_move(&move_command("G1 Z0.2"));
        assert_eq!(event, TrackerEvent::LayerCommitted { index: 0, z: 0.2 });

        // A Z-hop without a marker must not burn a layer.
        assert_eq!(tracker.observe_move(&move_command("G1 Z0.6")), TrackerEvent::None);
        assert_eq!(tracker.observe_move(&move_command("G1 Z0.2")), TrackerEvent::None);
        assert_relative_eq!(tracker.layer_z(), 0.2);
        assert_relative_eq!(tracker.current_z(), 0.2);

        tracker.observe_comment(";LAYER_CHANGE");
        let event = tracker.observe_move(&move_command("G1 Z0.4"));
        assert_eq!(event, TrackerEvent::LayerCommitted { index: 1, z: 0.4 });
    }

    #[test]
    fn test_position_tracking_fills_missing_axes() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_move(&move_command("G1 X10 Y5 F9000"));
        assert_eq!(tracker.position(), Some((10.0, 5.0)));
        tracker.observe_move(&move_command("G1 X12 E0.3"));
        assert_eq!(tracker.position(), Some((12.0, 5.0)));
    }

    #[test]
    fn test_loop_counting_in_wall_regions() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_comment(";TYPE:Perimeter");
        assert_eq!(tracker.loop_index(), 0);

        // Travel before the first extrusion does not advance the loop.
        tracker.observe_move(&move_command("G1 X0 Y0 F9000"));
        assert_eq!(tracker.loop_index(), 0);

        tracker.observe_move(&move_command("G1 X10 Y0 E1.0"));
        tracker.observe_move(&move_command("G1 X10 Y10 E1.0"));
        assert_eq!(tracker.loop_index(), 0);

        // Travel separating two extrusion runs starts loop 1.
        tracker.observe_move(&move_command("G1 X20 Y0 F9000"));
        assert_eq!(tracker.loop_index(), 1);
        tracker.observe_move(&move_command("G1 X30 Y0 E1.0"));
        assert_eq!(tracker.loop_index(), 1);

        // Re-entering a wall region resets the counter.
        tracker.observe_comment(";TYPE:External perimeter");
        assert_eq!(tracker.loop_index(), 0);
    }

    #[test]
    fn test_loop_counting_ignores_non_wall_regions() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_comment(";TYPE:Internal infill");
        tracker.observe_move(&move_command("G1 X10 Y0 E1.0"));
        tracker.observe_move(&move_command("G1 X20 Y0 F9000"));
        assert_eq!(tracker.loop_index(), 0);
    }

    #[test]
    fn test_proximity_decay() {
        let mut tracker = tracker_with(vec![1.0]);
        // Window is 4 layers × 0.2 mm = 0.8 mm.
        tracker.observe_move(&move_command("G1 Z1.0"));
        assert_relative_eq!(tracker.solid_infill_proximity(), 1.0);

        tracker.observe_move(&move_command("G1 Z1.2"));
        assert_relative_eq!(tracker.solid_infill_proximity(), 0.75);

        tracker.observe_move(&move_command("G1 Z1.8"));
        assert_relative_eq!(tracker.solid_infill_proximity(), 0.0, epsilon = 1e-9);

        tracker.observe_move(&move_command("G1 Z2.4"));
        assert_relative_eq!(tracker.solid_infill_proximity(), 0.0);
    }

    #[test]
    fn test_proximity_without_solid_layers_is_zero() {
        let mut tracker = tracker_with(vec![]);
        tracker.observe_move(&move_command("G1 Z0.2"));
        assert_relative_eq!(tracker.solid_infill_proximity(), 0.0);
    }
}
