use glam::Vec3;
use rand::Rng;

/// SoA particle storage.
///
/// Shape-state targets live in [`crate::shapes::ShapeState`]; this set only
/// holds per-particle scalars and the buffers recomputed every frame.
pub struct ParticleSet {
    pub count: usize,
    /// Point size scalar, fixed at creation.
    pub size: Vec<f32>,
    /// Stable per-particle hash in [0,1), used to decorrelate idle motion.
    pub hash: Vec<f32>,
    /// Interpolated position before idle motion and interaction forces.
    pub base: Vec<Vec3>,
    /// Interpolated color before interaction flashes.
    pub base_color: Vec<Vec3>,
    /// Final position written to the instance buffer.
    pub position: Vec<Vec3>,
    /// Final color written to the instance buffer.
    pub color: Vec<Vec3>,
}

impl ParticleSet {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            size: vec![1.0; count],
            hash: vec![0.0; count],
            base: vec![Vec3::ZERO; count],
            base_color: vec![Vec3::ONE; count],
            position: vec![Vec3::ZERO; count],
            color: vec![Vec3::ONE; count],
        }
    }

    /// Create a set with sizes drawn from `[0.3, 1.8)` and hashed ids.
    pub fn seeded<R: Rng>(count: usize, rng: &mut R) -> Self {
        let mut set = Self::new(count);
        for i in 0..count {
            set.size[i] = rng.gen::<f32>() * 1.5 + 0.3;
            set.hash[i] = crate::math::hash11(i as f32 + 0.5);
        }
        set
    }
}
