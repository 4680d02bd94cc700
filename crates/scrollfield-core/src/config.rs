use glam::Vec3;

use crate::error::ConfigError;
use crate::math::{rgb_hex, smoothstep};

/// Tunable parameters of the particle field.
///
/// Force magnitudes are visual tuning, not semantics; the combined
/// per-frame interaction offset is always clamped to `max_displacement`.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Seed for shape-state generators.
    pub seed: u64,
    /// Exponential smoothing factor applied to the displayed phase per frame.
    pub smoothing: f32,
    /// One color per shape state.
    pub palette: Vec<Vec3>,
    pub interaction_enabled: bool,
    /// Interaction forces only apply while the displayed phase is below this.
    pub interaction_phase_limit: f32,
    /// Easing factor of the world-space pointer toward the raw pointer.
    pub pointer_follow: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub ripple_speed: f32,
    pub ripple_width: f32,
    pub ripple_strength: f32,
    pub ripple_duration: f32,
    pub max_displacement: f32,
    /// `[active, core]` colors blended in near the pointer, if any.
    pub hover_colors: Option<[Vec3; 2]>,
    /// Fade points out with camera distance; `None` keeps full opacity.
    pub fog: Option<DistanceFog>,
}

/// Linear-ish opacity falloff between `near` and `far` camera distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceFog {
    /// Camera position in world space, before the group offset.
    pub camera: Vec3,
    /// Fully visible at or inside this distance.
    pub near: f32,
    /// Invisible at or beyond this distance.
    pub far: f32,
}

impl Default for DistanceFog {
    fn default() -> Self {
        Self {
            camera: Vec3::new(0.0, 0.0, 40.0),
            near: 20.0,
            far: 60.0,
        }
    }
}

impl DistanceFog {
    /// Visibility in `[0, 1]` of a world-space point.
    pub fn visibility(&self, position: Vec3) -> f32 {
        smoothstep(self.far, self.near, position.distance(self.camera))
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 16_000,
            seed: 0x5eed,
            smoothing: 0.1,
            palette: vec![
                rgb_hex(0xffffff),
                rgb_hex(0xfbbf24),
                rgb_hex(0x22d3ee),
                rgb_hex(0xd946ef),
            ],
            interaction_enabled: true,
            interaction_phase_limit: 0.5,
            pointer_follow: 0.1,
            repulsion_radius: 12.0,
            repulsion_strength: 5.0,
            ripple_speed: 40.0,
            ripple_width: 5.0,
            ripple_strength: 4.0,
            ripple_duration: 1.5,
            max_displacement: 8.0,
            hover_colors: None,
            fog: Some(DistanceFog::default()),
        }
    }
}

impl FieldConfig {
    /// Instanced-box matrix: 16³ nodes, always interactive, hover tint.
    pub fn matrix() -> Self {
        Self {
            particle_count: 16 * 16 * 16,
            palette: vec![
                rgb_hex(0xa1a1aa),
                rgb_hex(0xfbbf24),
                rgb_hex(0x22d3ee),
                rgb_hex(0xd946ef),
            ],
            interaction_phase_limit: f32::INFINITY,
            pointer_follow: 0.08,
            repulsion_radius: 6.0,
            repulsion_strength: 1.8,
            hover_colors: Some([rgb_hex(0x3b82f6), rgb_hex(0xffffff)]),
            fog: None,
            ..Self::default()
        }
    }

    /// Check ranges that would otherwise produce NaN or a frozen animation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        if !(self.pointer_follow > 0.0 && self.pointer_follow <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "pointer_follow",
                value: self.pointer_follow,
            });
        }
        let positive = [
            ("repulsion_radius", self.repulsion_radius),
            ("ripple_width", self.ripple_width),
            ("ripple_duration", self.ripple_duration),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        if let Some(fog) = &self.fog {
            if !(fog.near >= 0.0 && fog.far > fog.near && fog.far.is_finite() && fog.camera.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: "fog.far",
                    value: fog.far,
                });
            }
        }
        Ok(())
    }
}

/// Limits for short-lived decorative elements (data-flow arcs).
#[derive(Clone, Debug)]
pub struct TransientConfig {
    /// Hard cap on concurrently active elements.
    pub max_active: usize,
    /// Seconds between spawn attempts.
    pub spawn_interval: f32,
    /// Seconds an arc stays visible after its packet arrives.
    pub linger: f32,
    /// Per-frame packet progress range along the arc.
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            max_active: 15,
            spawn_interval: 0.6,
            linger: 1.5,
            min_speed: 0.008,
            max_speed: 0.020,
        }
    }
}

impl TransientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_speed > 0.0) || !self.max_speed.is_finite() || self.max_speed < self.min_speed {
            return Err(ConfigError::InvalidValue {
                field: "transient.min_speed",
                value: self.min_speed,
            });
        }
        if !(self.spawn_interval > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "transient.spawn_interval",
                value: self.spawn_interval,
            });
        }
        if self.linger < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "transient.linger",
                value: self.linger,
            });
        }
        Ok(())
    }
}
