//! Periodic wave functions.
//!
//! Every function maps a phase in [0,1) to a signed unit amplitude in
//! [-1,1]. Sine, triangle, and trapezoid are continuous across the period
//! wrap (`f(0) == f(1⁻)`); sawtooth snaps back at the boundary by
//! definition. All functions are pure, so identical phases always produce
//! identical offsets.

use std::f64::consts::TAU;

use gcodewarp_core::config::{WaveDirection, Waveform};

/// Evaluate the selected waveform at a phase in [0,1).
pub fn evaluate(function: Waveform, phase: f64) -> f64 {
    match function {
        Waveform::Sine => sine(phase),
        Waveform::Triangle => triangle(phase),
        Waveform::Trapezoidal => trapezoidal(phase),
        Waveform::Sawtooth => sawtooth(phase),
    }
}

/// Phase of a planar point: frequency × directional projection plus an
/// optional offset, reduced into [0,1). Negative projections wrap into
/// range, so the waveform stays continuous across the origin.
pub fn phase(frequency: f64, direction: WaveDirection, x: f64, y: f64, offset: f64) -> f64 {
    (frequency * direction.projection(x, y) + offset).rem_euclid(1.0)
}

fn sine(t: f64) -> f64 {
    (TAU * t).sin()
}

/// Ramp from -1 up to +1 over the first half period, back down over the
/// second.
fn triangle(t: f64) -> f64 {
    if t < 0.5 {
        -1.0 + 4.0 * t
    } else {
        3.0 - 4.0 * t
    }
}

/// Quarter-period segments: ramp up, hold +1, ramp down, hold -1.
fn trapezoidal(t: f64) -> f64 {
    if t < 0.25 {
        -1.0 + (t / 0.25) * 2.0
    } else if t < 0.50 {
        1.0
    } else if t < 0.75 {
        1.0 - ((t - 0.50) / 0.25) * 2.0
    } else {
        -1.0
    }
}

/// Linear fall from +1 to -1, snapping back at the wrap.
fn sawtooth(t: f64) -> f64 {
    1.0 - 2.0 * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_continuity_at_wrap() {
        for function in [Waveform::Sine, Waveform::Triangle, Waveform::Trapezoidal] {
            let at_zero = evaluate(function, 0.0);
            let near_one = evaluate(function, 1.0 - EPS);
            assert!(
                (at_zero - near_one).abs() < 1e-6,
                "{function} jumps at wrap: f(0)={at_zero}, f(1-)={near_one}"
            );
        }
    }

    #[test]
    fn test_sawtooth_full_jump_at_wrap() {
        let at_zero = evaluate(Waveform::Sawtooth, 0.0);
        let near_one = evaluate(Waveform::Sawtooth, 1.0 - EPS);
        assert_relative_eq!(at_zero - near_one, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_output_stays_in_unit_range() {
        for function in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Trapezoidal,
            Waveform::Sawtooth,
        ] {
            for i in 0..1000 {
                let t = i as f64 / 1000.0;
                let v = evaluate(function, t);
                assert!((-1.0..=1.0).contains(&v), "{function}({t}) = {v}");
            }
        }
    }

    #[test]
    fn test_triangle_symmetric_about_half() {
        for i in 1..500 {
            let d = i as f64 / 1000.0;
            assert_relative_eq!(
                triangle(0.5 - d),
                triangle(0.5 + d),
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(triangle(0.5), 1.0);
        assert_relative_eq!(triangle(0.0), -1.0);
    }

    #[test]
    fn test_trapezoid_symmetric_with_flat_tops() {
        for i in 1..500 {
            let d = i as f64 / 1000.0;
            assert_relative_eq!(
                trapezoidal(0.5 - d),
                trapezoidal(0.5 + d),
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(trapezoidal(0.3), 1.0);
        assert_relative_eq!(trapezoidal(0.45), 1.0);
        assert_relative_eq!(trapezoidal(0.8), -1.0);
        assert_relative_eq!(trapezoidal(0.99), -1.0);
    }

    #[test]
    fn test_sine_quarter_points() {
        assert_relative_eq!(sine(0.0), 0.0);
        assert_relative_eq!(sine(0.25), 1.0);
        assert_relative_eq!(sine(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(sine(0.75), -1.0);
    }

    #[test]
    fn test_phase_projection_and_wrap() {
        // 0.1 cycles/mm along x: one full cycle per 10 mm.
        assert_relative_eq!(phase(0.1, WaveDirection::X, 2.5, 0.0, 0.0), 0.25);
        assert_relative_eq!(phase(0.1, WaveDirection::X, 12.5, 99.0, 0.0), 0.25, epsilon = 1e-12);
        // Negative projections wrap into [0,1).
        let p = phase(0.1, WaveDirection::NegX, 2.5, 0.0, 0.0);
        assert_relative_eq!(p, 0.75);
        // Offset shifts the phase half a period.
        assert_relative_eq!(phase(0.1, WaveDirection::X, 2.5, 0.0, 0.5), 0.75);
    }

    #[test]
    fn test_phase_diagonal_projection() {
        let p = phase(1.0, WaveDirection::Xy, 1.0, 1.0, 0.0);
        // Projection of (1,1) on the unit diagonal is √2.
        assert_relative_eq!(p, std::f64::consts::SQRT_2 - 1.0, epsilon = 1e-12);
    }
}
