use glam::Vec3;

use crate::error::ConfigError;
use crate::math::smoothstep;
use crate::shapes::motion::idle_offset;
use crate::shapes::ShapeState;

/// Displayed phase snaps onto the target once closer than this.
const SNAP_EPSILON: f32 = 1e-4;

/// Pair of shape states being blended and the eased blend weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Blends `states[index]` into `states[index + 1]`.
    pub index: usize,
    /// Smoothstepped local weight in [0,1].
    pub t: f32,
}

/// Select the segment and blend weight for `phase` over `max_phase` transitions.
///
/// The phase is clamped to `[0, max_phase]`; at `max_phase` the result is the
/// last segment with `t = 1`.
pub fn segment_for(phase: f32, max_phase: usize) -> Segment {
    if max_phase == 0 {
        return Segment { index: 0, t: 0.0 };
    }
    let phase = if phase.is_nan() {
        0.0
    } else {
        phase.clamp(0.0, max_phase as f32)
    };
    let index = (phase.floor() as usize).min(max_phase - 1);
    let t = smoothstep(0.0, 1.0, phase - index as f32);
    Segment { index, t }
}

/// Blended positions and colors for every particle.
#[derive(Clone, Debug, Default)]
pub struct Sample {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

/// Maps a smoothed phase scalar onto the ordered shape states.
pub struct PhaseInterpolator {
    states: Vec<ShapeState>,
    palette: Vec<Vec3>,
    count: usize,
    target: f32,
    displayed: f32,
    smoothing: f32,
}

impl PhaseInterpolator {
    pub fn new(
        states: Vec<ShapeState>,
        palette: Vec<Vec3>,
        smoothing: f32,
    ) -> Result<Self, ConfigError> {
        if states.len() < 2 {
            return Err(ConfigError::TooFewShapeStates(states.len()));
        }
        if palette.len() != states.len() {
            return Err(ConfigError::PaletteMismatch {
                expected: states.len(),
                got: palette.len(),
            });
        }
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(smoothing));
        }
        let count = states[0].len();
        if count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if let Some(bad) = states.iter().find(|s| s.len() != count) {
            return Err(ConfigError::GeneratorCountMismatch {
                name: bad.name.clone(),
                expected: count,
                got: bad.len(),
            });
        }

        Ok(Self {
            states,
            palette,
            count,
            target: 0.0,
            displayed: 0.0,
            smoothing,
        })
    }

    pub fn particle_count(&self) -> usize {
        self.count
    }

    pub fn states(&self) -> &[ShapeState] {
        &self.states
    }

    /// Number of transitions `K` (states - 1).
    pub fn max_phase(&self) -> usize {
        self.states.len() - 1
    }

    pub fn target_phase(&self) -> f32 {
        self.target
    }

    pub fn displayed_phase(&self) -> f32 {
        self.displayed
    }

    /// Store a new target, clamped into `[0, K]`. Non-finite input is ignored.
    pub fn set_target_phase(&mut self, raw: f32) {
        if !raw.is_finite() {
            return;
        }
        self.target = raw.clamp(0.0, self.max_phase() as f32);
    }

    /// Move the displayed phase one smoothing step toward the target.
    ///
    /// The step is a convex combination, so it never overshoots and the
    /// remaining error shrinks by `1 - smoothing` every call.
    pub fn advance(&mut self) -> f32 {
        let diff = self.target - self.displayed;
        if diff.abs() < SNAP_EPSILON {
            self.displayed = self.target;
        } else {
            self.displayed += diff * self.smoothing;
        }
        self.displayed
    }

    pub fn segment(&self) -> Segment {
        segment_for(self.displayed, self.max_phase())
    }

    /// Blend of every particle at the displayed phase.
    pub fn sample(&self) -> Sample {
        let mut sample = Sample {
            positions: vec![Vec3::ZERO; self.count],
            colors: vec![Vec3::ZERO; self.count],
        };
        self.sample_into(&mut sample.positions, &mut sample.colors);
        sample
    }

    /// Allocation-free variant of [`sample`](Self::sample).
    ///
    /// Writes `min(len, particle_count)` entries.
    pub fn sample_into(&self, positions: &mut [Vec3], colors: &mut [Vec3]) {
        let Segment { index, t } = self.segment();
        let from = &self.states[index].positions;
        let to = &self.states[index + 1].positions;
        let color = self.palette[index].lerp(self.palette[index + 1], t);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            positions
                .par_iter_mut()
                .zip(colors.par_iter_mut())
                .zip(from.par_iter().zip(to.par_iter()))
                .for_each(|((p, c), (a, b))| {
                    *p = a.lerp(*b, t);
                    *c = color;
                });
        }

        #[cfg(not(feature = "parallel"))]
        for ((p, c), (a, b)) in positions
            .iter_mut()
            .zip(colors.iter_mut())
            .zip(from.iter().zip(to.iter()))
        {
            *p = a.lerp(*b, t);
            *c = color;
        }
    }

    /// Idle motion of particle `i`, blended with the current segment weight.
    pub fn idle_offset(&self, i: usize, seed: f32, time: f32) -> Vec3 {
        let Segment { index, t } = self.segment();
        let a = &self.states[index];
        let b = &self.states[index + 1];
        let (Some(pa), Some(pb)) = (a.positions.get(i), b.positions.get(i)) else {
            return Vec3::ZERO;
        };
        let off_a = idle_offset(a.kind, *pa, seed, time);
        let off_b = idle_offset(b.kind, *pb, seed, time);
        off_a.lerp(off_b, t)
    }
}
