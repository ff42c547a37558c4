//! The single-pass modulation processor.
//!
//! Ties the tracker, segmenter, modulator, and rewriter together: one input
//! line maps to one or more output lines, in order, with every ineligible
//! line passed through byte-identical. Configuration is validated before the
//! first line; a bad parameter aborts the run with no output produced.

use gcodewarp_core::config::ModulationConfig;
use gcodewarp_core::error::ParameterResult;
use gcodewarp_core::flavor::MarkerTable;
use gcodewarp_core::gcode::{classify, GcodeLine};
use serde::Serialize;

use crate::listener::ProcessListener;
use crate::modulate::{self, Modulator};
use crate::prescan::Prescan;
use crate::rewrite;
use crate::segment::{PathPoint, Segmenter};
use crate::tracker::{RegionTracker, TrackerEvent};

/// Planar distances below this are degenerate and skipped.
const MIN_PLANAR_LENGTH: f64 = 1e-9;

/// Counters reported after a processing pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProcessingStats {
    pub lines_in: usize,
    pub lines_out: usize,
    pub moves_modulated: usize,
    pub malformed_lines: usize,
    pub layers: u32,
}

/// Streaming line transform that injects non-planar Z modulation.
pub struct NonplanarProcessor<L: ProcessListener> {
    config: ModulationConfig,
    tracker: RegionTracker,
    modulator: Modulator,
    listener: L,
    stats: ProcessingStats,
}

impl<L: ProcessListener> NonplanarProcessor<L> {
    /// Build a processor for one file. Rejects invalid configuration before
    /// any line is touched.
    pub fn new(
        config: ModulationConfig,
        markers: &'static MarkerTable,
        prescan: &Prescan,
        listener: L,
    ) -> ParameterResult<Self> {
        config.validate()?;
        let layer_height = prescan.layer_height(config.default_layer_height);
        tracing::info!(
            layer_height,
            solid_infill_layers = prescan.solid_infill_heights.len(),
            "processor ready"
        );
        let tracker = RegionTracker::new(
            markers,
            layer_height,
            config.falloff_layers,
            prescan.solid_infill_heights.clone(),
        );
        let modulator = Modulator::new(config.clone());
        Ok(Self {
            config,
            tracker,
            modulator,
            listener,
            stats: ProcessingStats::default(),
        })
    }

    /// Process a whole file worth of lines (without terminators).
    pub fn process<'a, I>(&mut self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut output = Vec::new();
        for (number, line) in lines.into_iter().enumerate() {
            output.extend(self.process_line(number + 1, line));
        }
        self.stats.lines_out = output.len();
        output
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ProcessingStats {
        self.stats
    }

    /// Process one line into its replacement lines (usually just itself).
    pub fn process_line(&mut self, line_number: usize, line: &str) -> Vec<String> {
        self.stats.lines_in += 1;
        match classify(line) {
            GcodeLine::Comment(_) => {
                // Marker tables match against the full raw line.
                if let TrackerEvent::RegionChanged(region) = self.tracker.observe_comment(line) {
                    self.listener.on_region_change(line_number, region);
                }
                vec![line.to_string()]
            }
            GcodeLine::Other => vec![line.to_string()],
            GcodeLine::Malformed { reason } => {
                self.stats.malformed_lines += 1;
                self.listener.on_malformed_line(line_number, line, &reason);
                vec![line.to_string()]
            }
            GcodeLine::Move { command, comment } => {
                let start_position = self.tracker.position();
                let start_z = self.tracker.current_z();

                if let TrackerEvent::LayerCommitted { index, z } =
                    self.tracker.observe_move(&command)
                {
                    self.listener.on_layer_change(line_number, index, z);
                    self.modulator
                        .begin_layer(self.tracker.solid_infill_proximity());
                    self.stats.layers = self.stats.layers.max(index + 1);
                }

                // Travels, retractions, Z moves, and rapids pass through.
                if command.rapid || !command.is_extruding() || !command.has_xy() {
                    return vec![line.to_string()];
                }
                let Some(target) = self.config.target_for(self.tracker.region()) else {
                    return vec![line.to_string()];
                };
                let Some((start_x, start_y)) = start_position else {
                    // No prior position: nothing to segment from yet.
                    return vec![line.to_string()];
                };

                let start = PathPoint::new(start_x, start_y, start_z);
                let end = PathPoint::new(
                    command.x.unwrap_or(start_x),
                    command.y.unwrap_or(start_y),
                    command.z.unwrap_or(start_z),
                );
                if start.planar_distance(&end) <= MIN_PLANAR_LENGTH {
                    return vec![line.to_string()];
                }

                // Covers files whose first extrusion precedes any Z move.
                if !self.modulator.primed() {
                    self.modulator
                        .begin_layer(self.tracker.solid_infill_proximity());
                }

                let phase_offset = if self.config.alternate_loops
                    && self.tracker.region().is_wall()
                    && self.tracker.loop_index() % 2 == 1
                {
                    0.5
                } else {
                    0.0
                };

                let segmenter = Segmenter::new(start, end, command.e, self.config.resolution);
                let count = Segmenter::count(&segmenter);
                let mut output = Vec::with_capacity(count);
                let mut previous_z =
                    start.z + self.modulator.z_offset(target, start.x, start.y, phase_offset);

                for (i, segment) in segmenter.enumerate() {
                    let modulated_z = segment.end.z
                        + self
                            .modulator
                            .z_offset(target, segment.end.x, segment.end.y, phase_offset);
                    let extrusion = segment.extrusion.unwrap_or(0.0);
                    let compensated = modulate::compensate_extrusion(
                        extrusion,
                        segment.planar_length,
                        modulated_z - previous_z,
                    );
                    let feed = if i == 0 { command.f } else { None };
                    let tail = if i == 0 { comment } else { None };
                    output.push(rewrite::format_modulated_move(
                        segment.end.x,
                        segment.end.y,
                        modulated_z,
                        compensated,
                        feed,
                        tail,
                    ));
                    previous_z = modulated_z;
                }

                self.listener.on_move_modulated(line_number, count);
                self.stats.moves_modulated += 1;
                output
            }
        }
    }
}
