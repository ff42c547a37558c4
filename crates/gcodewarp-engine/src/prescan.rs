//! Read-only pre-scan pass.
//!
//! Before any line is rewritten, one pass over the file collects the inputs
//! the modulation pass cannot know in advance: the Z heights of solid-infill
//! regions (which damp amplitude nearby) and the layer height. The layer
//! height comes from the `; layer_height =` header when present, otherwise
//! from the most common positive Z-delta between consecutive Z moves, and
//! only then from the configured default.

use std::collections::HashMap;

use gcodewarp_core::flavor::{layer_height_from_header, MarkerTable};
use gcodewarp_core::gcode::{classify, GcodeLine, Region};

/// Z-deltas below this are treated as jitter, not layer steps.
const MIN_LAYER_STEP: f64 = 0.01;

/// Facts gathered by the pre-scan.
#[derive(Debug, Clone, Default)]
pub struct Prescan {
    /// Z heights at which solid-infill regions start, ascending, deduped.
    pub solid_infill_heights: Vec<f64>,
    /// Layer height declared in the header comments, if any.
    pub header_layer_height: Option<f64>,
    /// Layer height inferred from Z-move statistics, if any.
    pub inferred_layer_height: Option<f64>,
}

impl Prescan {
    /// Scan all lines once. `markers` decides what counts as a solid-infill
    /// marker.
    pub fn scan<'a, I>(lines: I, markers: &MarkerTable) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut scan = Prescan::default();
        let mut current_z = 0.0_f64;
        let mut z_values: Vec<f64> = Vec::new();

        for line in lines {
            match classify(line) {
                GcodeLine::Move { command, .. } => {
                    if let Some(z) = command.z {
                        current_z = z;
                        z_values.push(z);
                    }
                }
                GcodeLine::Comment(_) => {
                    if scan.header_layer_height.is_none() {
                        scan.header_layer_height = layer_height_from_header(line);
                    }
                    if markers.region_change(line) == Some(Region::SolidInfill) {
                        scan.solid_infill_heights.push(current_z);
                    }
                }
                _ => {}
            }
        }

        scan.solid_infill_heights
            .sort_by(|a, b| a.partial_cmp(b).expect("non-finite Z height"));
        scan.solid_infill_heights.dedup();
        scan.inferred_layer_height = most_common_z_delta(&z_values);
        scan
    }

    /// The layer height to use for this run.
    pub fn layer_height(&self, default: f64) -> f64 {
        self.header_layer_height
            .or(self.inferred_layer_height)
            .unwrap_or(default)
    }
}

/// Mode of the positive Z-deltas, rounded to 3 decimals. Ties resolve to the
/// smaller height so the result is deterministic.
fn most_common_z_delta(z_values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<i64, u32> = HashMap::new();
    for pair in z_values.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > MIN_LAYER_STEP {
            let key = (delta * 1000.0).round() as i64;
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(key_a, count_a), (key_b, count_b)| {
            count_a.cmp(count_b).then(key_b.cmp(key_a))
        })
        .map(|(key, _)| key as f64 / 1000.0)
}
