//! Modulation configuration and validation.
//!
//! One [`RegionModulation`] block per target class (walls, infill) plus the
//! shared geometry parameters. Validation happens once, before any line is
//! processed; the engine never self-corrects a bad parameter mid-run.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ParameterError, ParameterResult};
use crate::gcode::Region;

/// Periodic waveform selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Smooth sine wave.
    Sine,
    /// Sharp triangle wave.
    Triangle,
    /// Trapezoid: ramp, hold high, ramp, hold low (quarter-period each).
    Trapezoidal,
    /// Linear fall with a snap-back at the period boundary.
    Sawtooth,
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sine => write!(f, "sine"),
            Self::Triangle => write!(f, "triangle"),
            Self::Trapezoidal => write!(f, "trapezoidal"),
            Self::Sawtooth => write!(f, "sawtooth"),
        }
    }
}

impl FromStr for Waveform {
    type Err = ParameterError;

    fn from_str(s: &str) -> ParameterResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(Self::Sine),
            "triangle" => Ok(Self::Triangle),
            "trapezoidal" => Ok(Self::Trapezoidal),
            "sawtooth" => Ok(Self::Sawtooth),
            _ => Err(ParameterError::InvalidValue {
                name: "function",
                reason: format!("unknown waveform '{}'", s),
            }),
        }
    }
}

/// Projection axis (and sign) for the wave phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveDirection {
    X,
    Y,
    /// Normalized diagonal (1,1)/√2.
    Xy,
    NegX,
    NegY,
    NegXy,
}

impl WaveDirection {
    /// Signed projection of a planar point onto the configured axis, in mm.
    pub fn projection(self, x: f64, y: f64) -> f64 {
        match self {
            Self::X => x,
            Self::Y => y,
            Self::Xy => (x + y) / std::f64::consts::SQRT_2,
            Self::NegX => -x,
            Self::NegY => -y,
            Self::NegXy => -(x + y) / std::f64::consts::SQRT_2,
        }
    }
}

impl std::fmt::Display for WaveDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Xy => write!(f, "xy"),
            Self::NegX => write!(f, "negx"),
            Self::NegY => write!(f, "negy"),
            Self::NegXy => write!(f, "negxy"),
        }
    }
}

impl FromStr for WaveDirection {
    type Err = ParameterError;

    fn from_str(s: &str) -> ParameterResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "xy" => Ok(Self::Xy),
            "negx" => Ok(Self::NegX),
            "negy" => Ok(Self::NegY),
            "negxy" => Ok(Self::NegXy),
            _ => Err(ParameterError::InvalidValue {
                name: "direction",
                reason: format!("unknown direction '{}'", s),
            }),
        }
    }
}

/// Which configuration block a region modulates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationTarget {
    /// Internal and external perimeters share the wall block.
    Walls,
    Infill,
}

/// Wave parameters for one target region class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionModulation {
    /// Peak Z offset in mm.
    pub amplitude: f64,
    /// Cycles per mm of travel along the projection axis.
    pub frequency: f64,
    pub direction: WaveDirection,
    pub function: Waveform,
}

impl Default for RegionModulation {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            frequency: 1.1,
            direction: WaveDirection::X,
            function: Waveform::Sine,
        }
    }
}

impl RegionModulation {
    fn validate(&self, class: &'static str) -> ParameterResult<()> {
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ParameterError::OutOfRange {
                name: amplitude_name(class),
                value: self.amplitude,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: frequency_name(class),
                reason: format!("must be a finite positive number, got {}", self.frequency),
            });
        }
        Ok(())
    }
}

fn amplitude_name(class: &'static str) -> &'static str {
    match class {
        "infill" => "infill-amplitude",
        _ => "wall-amplitude",
    }
}

fn frequency_name(class: &'static str) -> &'static str {
    match class {
        "infill" => "infill-frequency",
        _ => "wall-frequency",
    }
}

/// Full configuration for one processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulationConfig {
    /// Wave parameters applied to perimeter moves.
    pub walls: RegionModulation,
    /// Wave parameters applied to sparse-infill moves.
    pub infill: RegionModulation,
    /// Modulate internal perimeters.
    pub include_perimeters: bool,
    /// Modulate external perimeters.
    pub include_external_perimeters: bool,
    /// Modulate sparse infill.
    pub include_infill: bool,
    /// Maximum planar sub-segment length in mm.
    pub resolution: f64,
    /// Maximum applied-amplitude change between adjacent layers, as a
    /// fraction of the raw configured amplitude.
    pub max_step_size: f64,
    /// Phase-invert every other wall loop.
    pub alternate_loops: bool,
    /// Nominal layer height in mm, used when the file does not reveal one.
    pub default_layer_height: f64,
    /// Distance over which solid-infill proximity decays, in layers.
    pub falloff_layers: f64,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self {
            walls: RegionModulation::default(),
            infill: RegionModulation::default(),
            include_perimeters: false,
            include_external_perimeters: false,
            include_infill: false,
            resolution: 0.2,
            max_step_size: 0.1,
            alternate_loops: false,
            default_layer_height: 0.2,
            falloff_layers: 4.0,
        }
    }
}

impl ModulationConfig {
    /// Reject invalid parameters before any line is processed.
    pub fn validate(&self) -> ParameterResult<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "resolution",
                value: self.resolution,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !self.max_step_size.is_finite() || !(0.0..=1.0).contains(&self.max_step_size) {
            return Err(ParameterError::OutOfRange {
                name: "max-step-size",
                value: self.max_step_size,
                min: 0.0,
                max: 1.0,
            });
        }
        if !self.default_layer_height.is_finite() || self.default_layer_height <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "default-layer-height",
                value: self.default_layer_height,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !self.falloff_layers.is_finite() || self.falloff_layers <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "falloff-layers",
                value: self.falloff_layers,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        self.walls.validate("wall")?;
        self.infill.validate("infill")?;
        Ok(())
    }

    /// The modulation block an enabled region falls under, or `None` when
    /// the region is disabled or never a target.
    pub fn target_for(&self, region: Region) -> Option<ModulationTarget> {
        match region {
            Region::Perimeter if self.include_perimeters => Some(ModulationTarget::Walls),
            Region::ExternalPerimeter if self.include_external_perimeters => {
                Some(ModulationTarget::Walls)
            }
            Region::Infill if self.include_infill => Some(ModulationTarget::Infill),
            _ => None,
        }
    }

    /// Wave parameters for a target class.
    pub fn modulation(&self, target: ModulationTarget) -> &RegionModulation {
        match target {
            ModulationTarget::Walls => &self.walls,
            ModulationTarget::Infill => &self.infill,
        }
    }
}
