//! G-code line model and classification.
//!
//! A slicer-produced file interleaves machine commands (`G1 X.. Y.. E..`)
//! with comment lines that carry region and layer markers. The classifier
//! splits a raw line into one of four shapes; marker interpretation itself is
//! flavor-specific and lives in [`crate::flavor`].
//!
//! Classification is fail-open: a line that looks like a move but carries an
//! unparseable numeric field is reported as [`GcodeLine::Malformed`] so the
//! caller can warn and pass it through verbatim instead of corrupting the
//! file.

use serde::{Deserialize, Serialize};

/// Classification tag for a contiguous run of moves.
///
/// Regions are delimited by slicer-emitted type-change markers; a region's
/// extent is exactly the moves between two consecutive markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Internal perimeter / inner wall.
    Perimeter,
    /// External perimeter / outer wall.
    ExternalPerimeter,
    /// Sparse internal infill.
    Infill,
    /// Solid, top, or bridge infill. Tracked so its layer heights can damp
    /// modulation; never a modulation target itself.
    SolidInfill,
    /// Anything else, including moves seen before the first marker.
    Other,
}

impl Region {
    /// Whether this region is a wall (internal or external perimeter).
    pub fn is_wall(self) -> bool {
        matches!(self, Region::Perimeter | Region::ExternalPerimeter)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perimeter => write!(f, "perimeter"),
            Self::ExternalPerimeter => write!(f, "external perimeter"),
            Self::Infill => write!(f, "infill"),
            Self::SolidInfill => write!(f, "solid infill"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Axis words parsed from a `G0`/`G1` line.
///
/// Words absent from the line are `None`; the tracker substitutes the last
/// known position where the geometry needs them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveCommand {
    /// True for `G0` (rapid), false for `G1`.
    pub rapid: bool,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Extrusion delta. Present only on extrusion moves.
    pub e: Option<f64>,
    /// Feed rate word, preserved verbatim through rewriting.
    pub f: Option<f64>,
}

impl MoveCommand {
    /// Whether the move changes the planar position.
    pub fn has_xy(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Whether the move carries an extrusion delta.
    pub fn is_extruding(&self) -> bool {
        self.e.is_some()
    }

    /// A travel move repositions the nozzle without extruding.
    pub fn is_travel(&self) -> bool {
        self.has_xy() && self.e.is_none()
    }
}

/// One classified input line.
#[derive(Debug, Clone, PartialEq)]
pub enum GcodeLine<'a> {
    /// A `G0`/`G1` move with its parsed words and any trailing comment.
    Move {
        command: MoveCommand,
        comment: Option<&'a str>,
    },
    /// A full-line `;` comment; the payload excludes the semicolon but keeps
    /// inner whitespace so marker tables can match exactly.
    Comment(&'a str),
    /// Any other machine command (`M73`, `M106`, tool changes, ...) or a
    /// blank line. Passes through untouched.
    Other,
    /// Looked like a move but a numeric field failed to parse.
    Malformed { reason: String },
}

/// Classify a single raw line (without its terminator).
pub fn classify(line: &str) -> GcodeLine<'_> {
    let trimmed = line.trim_start();

    if let Some(comment) = trimmed.strip_prefix(';') {
        return GcodeLine::Comment(comment);
    }

    let (code, comment) = match trimmed.find(';') {
        Some(pos) => (&trimmed[..pos], Some(trimmed[pos + 1..].trim_end())),
        None => (trimmed, None),
    };

    let mut words = code.split_whitespace();
    let rapid = match words.next() {
        Some(w) if w.eq_ignore_ascii_case("G0") || w.eq_ignore_ascii_case("G00") => true,
        Some(w) if w.eq_ignore_ascii_case("G1") || w.eq_ignore_ascii_case("G01") => false,
        _ => return GcodeLine::Other,
    };

    let mut command = MoveCommand {
        rapid,
        ..MoveCommand::default()
    };

    for word in words {
        let Some(letter) = word.chars().next() else {
            continue;
        };
        let value = &word[letter.len_utf8()..];
        let slot = match letter.to_ascii_uppercase() {
            'X' => &mut command.x,
            'Y' => &mut command.y,
            'Z' => &mut command.z,
            'E' => &mut command.e,
            'F' => &mut command.f,
            _ => continue,
        };
        match value.parse::<f64>() {
            Ok(v) => *slot = Some(v),
            Err(_) => {
                return GcodeLine::Malformed {
                    reason: format!("unparseable {} word: '{}'", letter.to_ascii_uppercase(), word),
                }
            }
        }
    }

    GcodeLine::Move { command, comment }
}
