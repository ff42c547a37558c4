//! Output line formatting.
//!
//! Modulated sub-segments are re-emitted as `G1` lines with fixed decimal
//! precision: axes at three decimals, extrusion at five. The feed-rate word
//! and any inline comment from the source line ride along on the first
//! emitted sub-segment so no non-geometric content is dropped.

use std::fmt::Write;

/// Format one modulated sub-segment endpoint as a `G1` line.
pub fn format_modulated_move(
    x: f64,
    y: f64,
    z: f64,
    e: f64,
    feed: Option<f64>,
    comment: Option<&str>,
) -> String {
    let mut line = format!("G1 X{:.3} Y{:.3} Z{:.3} E{:.5}", x, y, z, e);
    if let Some(f) = feed {
        let _ = write!(line, " F{}", f);
    }
    if let Some(c) = comment {
        let _ = write!(line, " ;{}", c);
    }
    line
}
