//! Time-seeded idle motion layered on top of interpolated positions.
//!
//! Offsets are computed per shape state from that state's own target and
//! blended with the same weight as the base interpolation. They never feed
//! back into segment selection, so scrubbing stays reversible.

use glam::Vec3;

use crate::math::smoothstep;
use crate::shapes::ShapeKind;

/// Additive idle offset for a particle whose target in this state is `target`.
///
/// `seed` is the particle's stable hash in [0,1).
pub fn idle_offset(kind: Option<ShapeKind>, target: Vec3, seed: f32, time: f32) -> Vec3 {
    match kind {
        Some(ShapeKind::Chaos) => {
            // Rows flow left to right and wrap inside [-50, 50).
            let speed = 18.0 + seed * 10.0;
            let wrapped = (target.x + time * speed + 50.0).rem_euclid(100.0) - 50.0;
            Vec3::new(wrapped - target.x, 0.0, 0.0)
        }
        Some(ShapeKind::Stream) => {
            let a = time * 2.0 + target.x * 0.5;
            Vec3::new(0.0, a.cos(), a.sin())
        }
        Some(ShapeKind::Grid) => {
            let a = time * 1.5 + target.x * 0.2 + target.z * 0.2;
            Vec3::new(0.0, a.sin() * 2.0, 0.0)
        }
        Some(ShapeKind::Core) => {
            let breath = 1.0 + (time * 2.0).sin() * 0.05 + (time * 5.0).sin() * 0.02;
            let p = target * breath;
            let (s, c) = (time * 0.5).sin_cos();
            let rotated = Vec3::new(p.x * c - p.z * s, p.y, p.x * s + p.z * c);
            rotated - target
        }
        Some(ShapeKind::Tensor | ShapeKind::Cloud | ShapeKind::Dna | ShapeKind::Sphere) => {
            let bob = (target.x * 0.5 + time).sin() * (target.z * 0.5 + time).cos() * 0.15;
            Vec3::new(0.0, bob, 0.0)
        }
        Some(ShapeKind::Torus) | None => Vec3::new(
            (time * 0.5 + target.y).sin() * 0.05,
            (time * 0.3 + target.x).cos() * 0.05,
            (time * 0.4 + target.z).sin() * 0.05,
        ),
    }
}

/// Strength in [0,1] of the traveling highlight wave across the first segment.
pub fn pulse_wave(position: Vec3, time: f32) -> f32 {
    smoothstep(0.8, 1.0, (time * 3.0 - position.x * 0.08).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaos_offset_stays_in_band() {
        for i in 0..50 {
            let x = -50.0 + i as f32 * 2.0;
            let target = Vec3::new(x, 3.0, 1.0);
            let p = target + idle_offset(Some(ShapeKind::Chaos), target, 0.7, 12.3);
            assert!(p.x >= -50.0 && p.x < 50.0, "wrapped x {} out of band", p.x);
            assert_eq!(p.y, 3.0);
        }
    }

    #[test]
    fn test_core_offset_at_time_zero_is_zero() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let off = idle_offset(Some(ShapeKind::Core), target, 1.0, 0.0);
        assert!(off.length() < 1e-5, "core offset at t=0 should vanish: {off:?}");
    }

    #[test]
    fn test_offsets_are_small() {
        let kinds = [
            Some(ShapeKind::Stream),
            Some(ShapeKind::Grid),
            Some(ShapeKind::Tensor),
            None,
        ];
        for kind in kinds {
            let off = idle_offset(kind, Vec3::new(4.0, -2.0, 1.0), 1.0, 7.0);
            assert!(off.length() <= 2.0 + 1e-4, "{kind:?} offset too large: {off:?}");
        }
    }
}
