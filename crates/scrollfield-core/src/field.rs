use glam::Vec3;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{DistanceFog, FieldConfig};
use crate::error::ConfigError;
use crate::forces::pointer::{
    compute_interaction, hover_tint, ClickState, InteractionParams, PointerState,
};
use crate::particle::ParticleSet;
use crate::phase::PhaseInterpolator;
use crate::shapes::motion::pulse_wave;
use crate::shapes::{ShapeGenerator, ShapeKind, ShapeState};

/// Highlight color of the traveling pulse over the first segment.
const PULSE_COLOR: Vec3 = Vec3::new(0.0, 0.8, 1.0);
/// Opacity of a fully visible point.
const POINT_OPACITY: f32 = 0.6;

/// GPU-compatible instance: 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuInstance {
    pub position: [f32; 3], // 12 bytes
    pub size: f32,          //  4 bytes
    pub color: [f32; 3],    // 12 bytes
    pub alpha: f32,         //  4 bytes
}

impl GpuInstance {
    fn new(position: Vec3, size: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            size,
            color: color.to_array(),
            alpha,
        }
    }
}

fn point_alpha(fog: Option<&DistanceFog>, world: Vec3) -> f32 {
    fog.map_or(POINT_OPACITY, |fog| POINT_OPACITY * fog.visibility(world))
}

/// Owns the particle buffers and runs the per-frame update.
pub struct ParticleField {
    config: FieldConfig,
    params: InteractionParams,
    particles: ParticleSet,
    interpolator: PhaseInterpolator,
    pointer: PointerState,
    click: ClickState,
    /// Click waiting to be stamped with the animation clock on the next tick.
    pending_click: Option<Vec3>,
    instances: Vec<GpuInstance>,
    elapsed: f32,
    /// Horizontal offset the host applies to the whole field.
    group_offset_x: f32,
}

impl ParticleField {
    /// Allocate buffers and evaluate every generator once.
    pub fn initialize(
        config: FieldConfig,
        generators: &[&dyn ShapeGenerator],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if generators.len() < 2 {
            return Err(ConfigError::TooFewShapeStates(generators.len()));
        }
        if config.palette.len() != generators.len() {
            return Err(ConfigError::PaletteMismatch {
                expected: generators.len(),
                got: config.palette.len(),
            });
        }

        let count = config.particle_count;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut states = Vec::with_capacity(generators.len());
        for generator in generators {
            let positions = generator.generate(count, &mut rng);
            if positions.len() != count {
                return Err(ConfigError::GeneratorCountMismatch {
                    name: generator.name().to_string(),
                    expected: count,
                    got: positions.len(),
                });
            }
            states.push(ShapeState {
                name: generator.name().to_string(),
                kind: generator.kind(),
                positions: positions.into(),
            });
        }

        let particles = ParticleSet::seeded(count, &mut rng);
        let interpolator =
            PhaseInterpolator::new(states, config.palette.clone(), config.smoothing)?;

        let first = &interpolator.states()[0].positions;
        let instances = first
            .iter()
            .zip(&particles.size)
            .map(|(p, size)| {
                let alpha = point_alpha(config.fog.as_ref(), *p);
                GpuInstance::new(*p, *size, config.palette[0], alpha)
            })
            .collect();

        debug!(
            "particle field initialized: {} particles, {} shape states",
            count,
            generators.len()
        );

        Ok(Self {
            params: InteractionParams::from(&config),
            config,
            particles,
            interpolator,
            pointer: PointerState::default(),
            click: ClickState::default(),
            pending_click: None,
            instances,
            elapsed: 0.0,
            group_offset_x: 0.0,
        })
    }

    /// Chaos → stream → grid → core background.
    pub fn pipeline(config: FieldConfig) -> Result<Self, ConfigError> {
        Self::from_kinds(config, &ShapeKind::PIPELINE)
    }

    /// Tensor → cloud → helix → sphere instanced matrix.
    pub fn matrix(config: FieldConfig) -> Result<Self, ConfigError> {
        Self::from_kinds(config, &ShapeKind::MATRIX)
    }

    pub fn from_kinds(config: FieldConfig, kinds: &[ShapeKind]) -> Result<Self, ConfigError> {
        let generators: Vec<&dyn ShapeGenerator> =
            kinds.iter().map(|k| k as &dyn ShapeGenerator).collect();
        Self::initialize(config, &generators)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particle_count(&self) -> usize {
        self.particles.count
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn interpolator(&self) -> &PhaseInterpolator {
        &self.interpolator
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn click_state(&self) -> &ClickState {
        &self.click
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn set_target_phase(&mut self, phase: f32) {
        self.interpolator.set_target_phase(phase);
    }

    /// Map scroll progress in [0,1] onto the full phase range.
    pub fn set_scroll_progress(&mut self, progress: f32) {
        let k = self.interpolator.max_phase() as f32;
        self.interpolator.set_target_phase(progress.clamp(0.0, 1.0) * k);
    }

    pub fn set_interaction_enabled(&mut self, enabled: bool) {
        self.config.interaction_enabled = enabled;
        self.params.gain = if enabled { 1.0 } else { 0.0 };
    }

    /// Horizontal group offset, so fog distances match what the camera sees.
    pub fn set_group_offset_x(&mut self, offset_x: f32) {
        if offset_x.is_finite() {
            self.group_offset_x = offset_x;
        }
    }

    pub fn pointer_move(&mut self, world: Vec3) {
        self.pointer.move_to(world);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.leave();
    }

    /// Latch a click at the current pointer position.
    pub fn click(&mut self) {
        self.pending_click = Some(self.pointer.position);
    }

    /// Latch a click at an explicit world position.
    pub fn click_at(&mut self, world: Vec3) {
        if world.is_finite() {
            self.pending_click = Some(world);
        }
    }

    /// Advance one frame and rewrite the instance buffer.
    ///
    /// Non-finite or backwards clocks skip the frame.
    pub fn tick(&mut self, elapsed: f32, delta: f32) {
        if !elapsed.is_finite() || !delta.is_finite() || delta < 0.0 {
            return;
        }
        if self.particles.count == 0 {
            return;
        }
        self.elapsed = elapsed;

        if let Some(position) = self.pending_click.take() {
            self.click = ClickState {
                position,
                time: elapsed,
            };
        }
        self.pointer.follow(self.config.pointer_follow);

        let phase = self.interpolator.advance();
        self.interpolator
            .sample_into(&mut self.particles.base, &mut self.particles.base_color);

        let segment = self.interpolator.segment();
        let interactive = phase < self.config.interaction_phase_limit;
        let pulsing = segment.index == 0 && phase < 1.0 && self.params.gain > 0.0;
        let fog = self.config.fog;
        let shift = Vec3::new(self.group_offset_x, 0.0, 0.0);

        for i in 0..self.particles.count {
            let size = self.particles.size[i];
            let base = self.particles.base[i]
                + self.interpolator.idle_offset(i, self.particles.hash[i], elapsed);
            let mut color = self.particles.base_color[i];

            if pulsing {
                color = color.lerp(PULSE_COLOR, pulse_wave(base, elapsed) * 0.8);
            }

            let mut position = base;
            if interactive {
                let hit = compute_interaction(
                    base,
                    &self.pointer,
                    &self.click,
                    elapsed,
                    &self.params,
                );
                position += hit.offset;
                if let Some([active, core]) = self.config.hover_colors {
                    color = hover_tint(color, hit.proximity, active, core);
                }
                color = color.lerp(Vec3::ONE, hit.flash);
            }

            self.particles.position[i] = position;
            self.particles.color[i] = color;
            let alpha = point_alpha(fog.as_ref(), position + shift);
            self.instances[i] = GpuInstance::new(position, size, color, alpha);
        }
    }

    pub fn instances(&self) -> &[GpuInstance] {
        &self.instances
    }

    /// Instance buffer as raw bytes for upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}
