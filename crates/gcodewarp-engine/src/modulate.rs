//! Amplitude control and Z modulation.
//!
//! The modulator owns the per-layer amplitude memory. Each committed layer
//! recomputes the applied amplitude per target class: the raw configured
//! amplitude is damped by solid-infill proximity, then the layer-to-layer
//! change is ramp-limited to `max_step_size × amplitude`. A layer sitting on
//! a solid-infill height (proximity 1.0) is forced to exactly zero; the
//! structural protection takes precedence over ramp smoothness.

use gcodewarp_core::config::{ModulationConfig, ModulationTarget};

use crate::wave;

/// Per-layer applied amplitudes and the phase/offset math built on them.
#[derive(Debug)]
pub struct Modulator {
    config: ModulationConfig,
    walls_applied: f64,
    infill_applied: f64,
    primed: bool,
}

impl Modulator {
    /// `config` must already be validated.
    pub fn new(config: ModulationConfig) -> Self {
        Self {
            config,
            walls_applied: 0.0,
            infill_applied: 0.0,
            primed: false,
        }
    }

    /// Whether a layer has been started yet.
    pub fn primed(&self) -> bool {
        self.primed
    }

    /// Recompute applied amplitudes for a newly committed layer.
    ///
    /// The first layer has no predecessor and applies its damped target
    /// directly; later layers ramp toward it.
    pub fn begin_layer(&mut self, proximity: f64) {
        let max_step = self.config.max_step_size;
        let walls_target = damped_target(self.config.walls.amplitude, proximity);
        let infill_target = damped_target(self.config.infill.amplitude, proximity);

        if !self.primed {
            self.walls_applied = walls_target;
            self.infill_applied = infill_target;
            self.primed = true;
            return;
        }
        if proximity >= 1.0 {
            // On a solid-infill layer the amplitude must vanish outright.
            self.walls_applied = 0.0;
            self.infill_applied = 0.0;
            return;
        }
        self.walls_applied = ramp_step(
            self.walls_applied,
            walls_target,
            max_step * self.config.walls.amplitude,
        );
        self.infill_applied = ramp_step(
            self.infill_applied,
            infill_target,
            max_step * self.config.infill.amplitude,
        );
    }

    /// Amplitude currently applied for a target class.
    pub fn applied_amplitude(&self, target: ModulationTarget) -> f64 {
        match target {
            ModulationTarget::Walls => self.walls_applied,
            ModulationTarget::Infill => self.infill_applied,
        }
    }

    /// Signed Z offset at a planar point. `phase_offset` carries the
    /// half-period shift for alternated wall loops.
    pub fn z_offset(&self, target: ModulationTarget, x: f64, y: f64, phase_offset: f64) -> f64 {
        let modulation = self.config.modulation(target);
        let phase = wave::phase(modulation.frequency, modulation.direction, x, y, phase_offset);
        self.applied_amplitude(target) * wave::evaluate(modulation.function, phase)
    }
}

fn damped_target(amplitude: f64, proximity: f64) -> f64 {
    (amplitude * (1.0 - proximity)).max(0.0)
}

fn ramp_step(previous: f64, target: f64, max_delta: f64) -> f64 {
    previous + (target - previous).clamp(-max_delta, max_delta)
}

/// Scale an extrusion delta so extruded volume per unit of true travel
/// distance stays constant after Z perturbation. `dz` is the modulated Z
/// difference across the sub-segment.
pub fn compensate_extrusion(extrusion: f64, planar_length: f64, dz: f64) -> f64 {
    if planar_length <= 0.0 {
        return extrusion;
    }
    extrusion * planar_length.hypot(dz) / planar_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gcodewarp_core::config::ModulationConfig;

    fn modulator() -> Modulator {
        let mut config = ModulationConfig::default();
        config.include_perimeters = true;
        config.include_infill = true;
        Modulator::new(config)
    }

    #[test]
    fn test_first_layer_applies_target_directly() {
        let mut modulator = modulator();
        modulator.begin_layer(0.0);
        assert_relative_eq!(modulator.applied_amplitude(ModulationTarget::Walls), 0.3);
    }

    #[test]
    fn test_ramp_limits_consecutive_layers() {
        let mut modulator = modulator();
        // Raw amplitude 0.3, max step 0.1 → at most 0.03 change per layer.
        modulator.begin_layer(1.0);
        assert_relative_eq!(modulator.applied_amplitude(ModulationTarget::Walls), 0.0);

        let mut previous = 0.0;
        for _ in 0..20 {
            modulator.begin_layer(0.0);
            let applied = modulator.applied_amplitude(ModulationTarget::Walls);
            assert!(applied - previous <= 0.03 + 1e-12);
            assert!(applied >= previous);
            previous = applied;
        }
        // After enough layers the ramp converges to the raw amplitude.
        assert_relative_eq!(previous, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_ramp_bound_holds_for_arbitrary_proximity_sequences() {
        let mut modulator = modulator();
        let proximities = [0.0, 0.9, 0.3, 0.0, 0.99, 0.5, 0.0, 0.7];
        modulator.begin_layer(proximities[0]);
        let mut previous = modulator.applied_amplitude(ModulationTarget::Walls);
        for &p in &proximities[1..] {
            modulator.begin_layer(p);
            let applied = modulator.applied_amplitude(ModulationTarget::Walls);
            assert!(
                (applied - previous).abs() <= 0.03 + 1e-12,
                "step from {previous} to {applied} exceeds bound"
            );
            previous = applied;
        }
    }

    #[test]
    fn test_solid_layer_forces_zero_amplitude() {
        let mut modulator = modulator();
        modulator.begin_layer(0.0);
        assert_relative_eq!(modulator.applied_amplitude(ModulationTarget::Walls), 0.3);
        // Ramp limiting alone could not reach zero in one layer; the solid
        // layer overrides it.
        modulator.begin_layer(1.0);
        assert_relative_eq!(modulator.applied_amplitude(ModulationTarget::Walls), 0.0);
        assert_relative_eq!(modulator.applied_amplitude(ModulationTarget::Infill), 0.0);
    }

    #[test]
    fn test_z_offset_zero_amplitude_is_noop() {
        let mut modulator = {
            let mut config = ModulationConfig::default();
            config.walls.amplitude = 0.0;
            config.include_perimeters = true;
            Modulator::new(config)
        };
        modulator.begin_layer(0.0);
        for x in [0.0, 0.3, 1.7, 9.2] {
            assert_relative_eq!(modulator.z_offset(ModulationTarget::Walls, x, 0.0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_compensation_identity_without_z_change() {
        assert_relative_eq!(compensate_extrusion(0.05, 1.0, 0.0), 0.05);
    }

    #[test]
    fn test_compensation_scales_by_true_length() {
        // 3-4-5 triangle: planar 4, dz 3 → 3D length 5.
        assert_relative_eq!(compensate_extrusion(0.4, 4.0, 3.0), 0.5);
        // Sign of dz is irrelevant.
        assert_relative_eq!(compensate_extrusion(0.4, 4.0, -3.0), 0.5);
    }

    #[test]
    fn test_compensation_degenerate_segment_passes_through() {
        assert_relative_eq!(compensate_extrusion(0.05, 0.0, 0.3), 0.05);
    }
}
