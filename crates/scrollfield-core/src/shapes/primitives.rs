//! Shape-state generators.
//!
//! Each function returns the target of particle `i` out of `count`. Seeded
//! randomness comes from the caller's `Rng` so generation is reproducible.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

/// Symmetric jitter in `[-half, half)`.
#[inline]
fn jitter<R: Rng>(rng: &mut R, half: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half
}

/// Horizontal data rows: 50 quantized rows over a 60-unit height, full
/// 100-unit width, some depth.
pub fn shape_chaos_rows<R: Rng>(rng: &mut R) -> Vec3 {
    const ROWS: u32 = 50;
    let y_step = 60.0 / ROWS as f32;
    let row_y = rng.gen_range(0..ROWS) as f32 * y_step - 30.0;
    let row_z = jitter(rng, 10.0);
    let x = jitter(rng, 50.0);
    Vec3::new(x, row_y + jitter(rng, 0.1), row_z)
}

/// Twisted tube along X, length 60 and radius 3.
pub fn shape_stream<R: Rng>(i: usize, count: usize, rng: &mut R) -> Vec3 {
    let u = i as f32 / count as f32;
    let twist = u * PI * 4.0;
    let x = (u - 0.5) * 60.0;
    let a = twist + x * 0.5;
    Vec3::new(x, a.sin() * 3.0 + jitter(rng, 1.0), a.cos() * 3.0 + jitter(rng, 1.0))
}

/// Lattice of side 30 with `cbrt(count)` points per dimension.
pub fn shape_lattice(i: usize, count: usize) -> Vec3 {
    let per_dim = (count as f32).cbrt();
    let idx = i as f32;
    let gx = (idx % per_dim) / per_dim;
    let gy = ((idx / per_dim).floor() % per_dim) / per_dim;
    let gz = (idx / (per_dim * per_dim)).floor() / per_dim;
    Vec3::new(gx - 0.5, gy - 0.5, gz - 0.5) * 30.0
}

/// Fibonacci sphere of radius 6 with brain-like wrinkles.
pub fn shape_core(i: usize, count: usize) -> Vec3 {
    let phi = (1.0 - 2.0 * (i as f32 + 0.5) / count as f32).clamp(-1.0, 1.0).acos();
    let theta = PI * (1.0 + 5.0_f32.sqrt()) * (i as f32 + 0.5);
    let r = 6.0 * (1.0 + 0.2 * (phi * 10.0).sin() * (theta * 10.0).cos());
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Cubic tensor grid with spacing 1.2, centered, z varying fastest.
pub fn shape_tensor(i: usize, count: usize) -> Vec3 {
    let mut side = 1;
    while side * side * side < count {
        side += 1;
    }
    let spacing = 1.2;
    let offset = side as f32 * spacing / 2.0 - spacing / 2.0;
    let x = i / (side * side);
    let y = (i / side) % side;
    let z = i % side;
    Vec3::new(
        x as f32 * spacing - offset,
        y as f32 * spacing - offset,
        z as f32 * spacing - offset,
    )
}

/// Diffuse nebula of radius 25, dense in the middle, flattened on Z.
pub fn shape_cloud<R: Rng>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let r = 25.0 * rng.gen::<f32>().sqrt();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos() * 0.5,
    )
}

/// Double helix, radius 10, height 40, five turns.
pub fn shape_dna<R: Rng>(i: usize, count: usize, rng: &mut R) -> Vec3 {
    let strand = if i % 2 == 0 { 1.0 } else { -1.0 };
    let u = i as f32 / count as f32;
    let t = u * PI * 10.0;
    Vec3::new(
        t.cos() * 10.0 * strand + jitter(rng, 1.0),
        (u - 0.5) * 40.0,
        t.sin() * 10.0 * strand + jitter(rng, 1.0),
    )
}

/// Even sphere of radius 15.
pub fn shape_fibonacci_sphere(i: usize, count: usize) -> Vec3 {
    let phi = (-1.0 + 2.0 * i as f32 / count as f32).clamp(-1.0, 1.0).acos();
    let theta = (count as f32 * PI).sqrt() * phi;
    Vec3::new(
        15.0 * theta.cos() * phi.sin(),
        15.0 * theta.sin() * phi.sin(),
        15.0 * phi.cos(),
    )
}

/// Torus with ring radius 12 and tube radius 4, random surface scatter.
pub fn shape_torus<R: Rng>(rng: &mut R) -> Vec3 {
    let tube = rng.gen::<f32>() * TAU;
    let ring = rng.gen::<f32>() * TAU;
    let r = 12.0 + 4.0 * tube.cos();
    Vec3::new(r * ring.cos(), r * ring.sin(), 4.0 * tube.sin())
}
