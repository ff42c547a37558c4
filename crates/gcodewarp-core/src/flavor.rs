//! Slicer flavor detection and marker tables.
//!
//! Each slicer annotates its G-code with a different comment dialect for
//! region and layer boundaries. The flavor is detected once from the file
//! header; the resulting [`MarkerTable`] is what the engine consults, so the
//! engine itself never sees flavor-specific syntax.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::gcode::Region;

/// How many header lines are scanned for the generator name.
const DETECT_WINDOW: usize = 10;

/// Supported slicer comment dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlicerFlavor {
    PrusaSlicer,
    OrcaSlicer,
    BambuStudio,
}

impl std::fmt::Display for SlicerFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrusaSlicer => write!(f, "PrusaSlicer"),
            Self::OrcaSlicer => write!(f, "OrcaSlicer"),
            Self::BambuStudio => write!(f, "BambuStudio"),
        }
    }
}

/// Region and layer marker strings for one slicer dialect.
///
/// Markers are matched by substring against full comment lines, exactly as
/// the slicers emit them.
#[derive(Debug)]
pub struct MarkerTable {
    pub infill: &'static [&'static str],
    pub solid_infill: &'static [&'static str],
    pub perimeter: &'static [&'static str],
    pub external_perimeter: &'static [&'static str],
    pub layer_change: &'static [&'static str],
    /// Generic feature-type prefix; any unrecognized marker under it resets
    /// the region to [`Region::Other`].
    pub type_prefix: &'static str,
}

static PRUSA_MARKERS: MarkerTable = MarkerTable {
    infill: &[";TYPE:Internal infill"],
    solid_infill: &[";TYPE:Solid infill", ";TYPE:Top solid infill", ";TYPE:Bridge infill"],
    perimeter: &[";TYPE:Perimeter"],
    external_perimeter: &[";TYPE:External perimeter"],
    layer_change: &[";LAYER_CHANGE"],
    type_prefix: ";TYPE:",
};

static ORCA_MARKERS: MarkerTable = MarkerTable {
    infill: &[";TYPE:Internal infill", ";TYPE:internal infill"],
    solid_infill: &[
        ";TYPE:Solid infill",
        ";TYPE:solid infill",
        ";TYPE:Top surface",
        ";TYPE:top surface",
    ],
    perimeter: &[";TYPE:Inner wall", ";TYPE:inner wall"],
    external_perimeter: &[";TYPE:Outer wall", ";TYPE:outer wall"],
    layer_change: &[";LAYER_CHANGE"],
    type_prefix: ";TYPE:",
};

static BAMBU_MARKERS: MarkerTable = MarkerTable {
    infill: &["; FEATURE: Sparse infill", "; FEATURE: Internal infill"],
    solid_infill: &[
        "; FEATURE: Solid infill",
        "; FEATURE: Top surface",
        "; FEATURE: Bridge infill",
    ],
    perimeter: &["; FEATURE: Inner wall"],
    external_perimeter: &["; FEATURE: Outer wall"],
    layer_change: &["; CHANGE_LAYER"],
    type_prefix: "; FEATURE:",
};

impl MarkerTable {
    /// Region change announced by a comment line, if any. `None` means the
    /// line is not a type marker and the active region is retained.
    pub fn region_change(&self, line: &str) -> Option<Region> {
        if self.infill.iter().any(|m| line.contains(m)) {
            Some(Region::Infill)
        } else if self.solid_infill.iter().any(|m| line.contains(m)) {
            Some(Region::SolidInfill)
        } else if self.external_perimeter.iter().any(|m| line.contains(m)) {
            Some(Region::ExternalPerimeter)
        } else if self.perimeter.iter().any(|m| line.contains(m)) {
            Some(Region::Perimeter)
        } else if line.contains(self.type_prefix) {
            Some(Region::Other)
        } else {
            None
        }
    }

    /// Whether the line announces a layer change.
    pub fn is_layer_change(&self, line: &str) -> bool {
        self.layer_change.iter().any(|m| line.contains(m))
    }
}

impl SlicerFlavor {
    /// Detect the generator from the first header lines of the file.
    pub fn detect<'a, I>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for line in lines.into_iter().take(DETECT_WINDOW) {
            if line.contains("PrusaSlicer") {
                return Some(Self::PrusaSlicer);
            } else if line.contains("OrcaSlicer") {
                return Some(Self::OrcaSlicer);
            } else if line.contains("BambuStudio") {
                return Some(Self::BambuStudio);
            }
        }
        None
    }

    /// Marker table for this flavor, taking the declared G-code flavor into
    /// account: OrcaSlicer emitting plain Marlin uses BambuStudio markers.
    pub fn marker_table(self, gcode_flavor: Option<&str>) -> &'static MarkerTable {
        match self {
            Self::PrusaSlicer => &PRUSA_MARKERS,
            Self::OrcaSlicer => {
                if gcode_flavor == Some("marlin") {
                    &BAMBU_MARKERS
                } else {
                    &ORCA_MARKERS
                }
            }
            Self::BambuStudio => &BAMBU_MARKERS,
        }
    }
}

/// Marker table for a detected flavor, falling back to PrusaSlicer markers
/// when the generator is unknown.
pub fn marker_table_for(
    flavor: Option<SlicerFlavor>,
    gcode_flavor: Option<&str>,
) -> &'static MarkerTable {
    flavor
        .map(|f| f.marker_table(gcode_flavor))
        .unwrap_or(&PRUSA_MARKERS)
}

/// Extract the declared G-code flavor from a `; gcode_flavor = ...` header
/// comment anywhere in the file.
pub fn detect_gcode_flavor<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .find(|line| line.starts_with("; gcode_flavor ="))
        .and_then(|line| line.split('=').next_back())
        .map(|v| v.trim().to_string())
}

/// Parse a `; layer_height = 0.2` header comment.
pub fn layer_height_from_header(line: &str) -> Option<f64> {
    static LAYER_HEIGHT_REGEX: OnceLock<Regex> = OnceLock::new();
    // The leading `;` keeps this from matching `first_layer_height`.
    let regex = LAYER_HEIGHT_REGEX.get_or_init(|| {
        Regex::new(r"(?i);\s*layer_height\s*=\s*([0-9]*\.?[0-9]+)").expect("invalid regex pattern")
    });
    regex
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
