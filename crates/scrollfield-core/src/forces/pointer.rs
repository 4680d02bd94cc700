use glam::Vec3;

use crate::config::FieldConfig;
use crate::math::{clamp_length, direction};

/// World position used while no pointer is over the surface.
pub const OFFSCREEN: Vec3 = Vec3::new(9999.0, 9999.0, 0.0);

/// Pointer (cursor) state in world space.
///
/// `raw` is written by input handlers; `position` eases toward it once per
/// frame and is what the forces read.
#[derive(Clone, Copy, Debug)]
pub struct PointerState {
    pub raw: Vec3,
    pub position: Vec3,
    pub previous: Vec3,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            raw: OFFSCREEN,
            position: OFFSCREEN,
            previous: OFFSCREEN,
        }
    }
}

impl PointerState {
    pub fn move_to(&mut self, world: Vec3) {
        if world.is_finite() {
            self.raw = world;
        }
    }

    /// Park the pointer off-screen, e.g. when it leaves the window.
    pub fn leave(&mut self) {
        self.raw = OFFSCREEN;
        self.position = OFFSCREEN;
        self.previous = OFFSCREEN;
    }

    /// Ease `position` toward `raw`. Returning from off-screen snaps.
    pub fn follow(&mut self, factor: f32) {
        self.previous = self.position;
        if self.position == OFFSCREEN {
            self.position = self.raw;
        } else {
            self.position = self.position.lerp(self.raw, factor.clamp(0.0, 1.0));
        }
    }

    /// Displacement of the eased pointer during the last frame.
    pub fn velocity(&self) -> Vec3 {
        if self.previous == OFFSCREEN || self.position == OFFSCREEN {
            Vec3::ZERO
        } else {
            self.position - self.previous
        }
    }
}

/// Last click, stamped with the animation clock.
#[derive(Clone, Copy, Debug)]
pub struct ClickState {
    pub position: Vec3,
    pub time: f32,
}

impl Default for ClickState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            time: -1000.0,
        }
    }
}

/// Force tuning extracted from [`FieldConfig`].
#[derive(Clone, Copy, Debug)]
pub struct InteractionParams {
    /// 1.0 when interaction is enabled, 0.0 otherwise.
    pub gain: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub ripple_speed: f32,
    pub ripple_width: f32,
    pub ripple_strength: f32,
    pub ripple_duration: f32,
    pub max_displacement: f32,
}

impl From<&FieldConfig> for InteractionParams {
    fn from(config: &FieldConfig) -> Self {
        Self {
            gain: if config.interaction_enabled { 1.0 } else { 0.0 },
            repulsion_radius: config.repulsion_radius,
            repulsion_strength: config.repulsion_strength,
            ripple_speed: config.ripple_speed,
            ripple_width: config.ripple_width,
            ripple_strength: config.ripple_strength,
            ripple_duration: config.ripple_duration,
            max_displacement: config.max_displacement,
        }
    }
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self::from(&FieldConfig::default())
    }
}

/// Result of applying interaction forces to one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionResult {
    /// Additive offset, already clamped to `max_displacement`.
    pub offset: Vec3,
    /// Pointer proximity in [0,1] (`1 - d/r` inside the radius).
    pub proximity: f32,
    /// White flash weight from the ripple front.
    pub flash: f32,
}

impl Default for InteractionResult {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            proximity: 0.0,
            flash: 0.0,
        }
    }
}

/// Outward push away from the pointer, linear in `1 - d/r`.
///
/// Returns the offset and the proximity weight.
pub fn repulsion(base: Vec3, pointer: Vec3, params: &InteractionParams) -> (Vec3, f32) {
    let radius = params.repulsion_radius;
    let dist = base.distance(pointer);
    if !(dist < radius) {
        return (Vec3::ZERO, 0.0);
    }
    let proximity = 1.0 - dist / radius;
    let dir = direction(pointer, base);
    (dir * proximity * params.repulsion_strength * params.gain, proximity)
}

/// Expanding shockwave from the last click.
///
/// Particles within `ripple_width` of the ring `Δt * speed` are pushed
/// outward; the push tapers with ring distance and with the remaining time.
/// Returns the offset and the flash weight.
pub fn ripple(
    base: Vec3,
    click: &ClickState,
    elapsed: f32,
    params: &InteractionParams,
) -> (Vec3, f32) {
    let since = elapsed - click.time;
    if !(since > 0.0 && since < params.ripple_duration) {
        return (Vec3::ZERO, 0.0);
    }
    let ring = since * params.ripple_speed;
    let from_ring = (base.distance(click.position) - ring).abs();
    if from_ring >= params.ripple_width {
        return (Vec3::ZERO, 0.0);
    }
    let wave = 1.0 - from_ring / params.ripple_width;
    let fade = 1.0 - since / params.ripple_duration;
    let dir = direction(click.position, base);
    (
        dir * wave * params.ripple_strength * fade * params.gain,
        wave * 0.5 * params.gain,
    )
}

/// Combined pointer repulsion and click ripple for one particle.
///
/// Both forces read the same `base`; their sum is clamped so a click during
/// heavy repulsion cannot fling a particle arbitrarily far.
pub fn compute_interaction(
    base: Vec3,
    pointer: &PointerState,
    click: &ClickState,
    elapsed: f32,
    params: &InteractionParams,
) -> InteractionResult {
    if params.gain <= 0.0 {
        return InteractionResult::default();
    }
    let (push, proximity) = repulsion(base, pointer.position, params);
    let (wave, flash) = ripple(base, click, elapsed, params);
    InteractionResult {
        offset: clamp_length(push + wave, params.max_displacement),
        proximity,
        flash,
    }
}

/// Hover tint: blend toward `active` with proximity, then toward `core`
/// close to the pointer.
pub fn hover_tint(color: Vec3, proximity: f32, active: Vec3, core: Vec3) -> Vec3 {
    if proximity <= 0.0 {
        color
    } else if proximity > 0.8 {
        active.lerp(core, ((proximity - 0.8) * 5.0).min(1.0))
    } else {
        color.lerp(active, proximity * 1.25)
    }
}
