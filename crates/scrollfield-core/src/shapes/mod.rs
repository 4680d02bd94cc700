//! Shape states and the generators that produce them.
//!
//! A shape state is a complete target configuration of every particle. It is
//! generated once at initialization and never mutated afterwards.
pub mod motion;
pub mod primitives;

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::StdRng;

use crate::shapes::primitives::*;

/// Named, immutable target positions for every particle.
#[derive(Clone, Debug)]
pub struct ShapeState {
    pub name: String,
    pub kind: Option<ShapeKind>,
    pub positions: Arc<[Vec3]>,
}

impl ShapeState {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Produces one full target array for a shape state.
///
/// Implementations must return exactly `count` positions; the field rejects
/// generators that don't.
pub trait ShapeGenerator {
    fn name(&self) -> &str;

    /// Idle motion family used for this state, if any.
    fn kind(&self) -> Option<ShapeKind> {
        None
    }

    fn generate(&self, count: usize, rng: &mut StdRng) -> Vec<Vec3>;
}

/// Built-in shape states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Horizontal rows of data drifting left to right.
    Chaos,
    /// Twisted tube along X.
    Stream,
    /// 3D lattice.
    Grid,
    /// Wrinkled Fibonacci sphere.
    Core,
    /// Dense cubic tensor grid (instanced boxes variant).
    Tensor,
    /// Diffuse, Z-flattened nebula.
    Cloud,
    /// Two intertwined strands.
    Dna,
    /// Even Fibonacci sphere.
    Sphere,
    /// Ring torus with random surface scatter.
    Torus,
}

impl ShapeKind {
    /// The four-state narrative of the particle background.
    pub const PIPELINE: [ShapeKind; 4] = [
        ShapeKind::Chaos,
        ShapeKind::Stream,
        ShapeKind::Grid,
        ShapeKind::Core,
    ];

    /// The four-state narrative of the instanced-box matrix.
    pub const MATRIX: [ShapeKind; 4] = [
        ShapeKind::Tensor,
        ShapeKind::Cloud,
        ShapeKind::Dna,
        ShapeKind::Sphere,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Chaos => "chaos",
            ShapeKind::Stream => "stream",
            ShapeKind::Grid => "grid",
            ShapeKind::Core => "core",
            ShapeKind::Tensor => "tensor",
            ShapeKind::Cloud => "cloud",
            ShapeKind::Dna => "dna",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Torus => "torus",
        }
    }
}

impl ShapeGenerator for ShapeKind {
    fn name(&self) -> &str {
        self.label()
    }

    fn kind(&self) -> Option<ShapeKind> {
        Some(*self)
    }

    fn generate(&self, count: usize, rng: &mut StdRng) -> Vec<Vec3> {
        (0..count)
            .map(|i| match self {
                ShapeKind::Chaos => shape_chaos_rows(rng),
                ShapeKind::Stream => shape_stream(i, count, rng),
                ShapeKind::Grid => shape_lattice(i, count),
                ShapeKind::Core => shape_core(i, count),
                ShapeKind::Tensor => shape_tensor(i, count),
                ShapeKind::Cloud => shape_cloud(rng),
                ShapeKind::Dna => shape_dna(i, count, rng),
                ShapeKind::Sphere => shape_fibonacci_sphere(i, count),
                ShapeKind::Torus => shape_torus(rng),
            })
            .collect()
    }
}

/// Wraps a closure as a named generator.
pub struct FnGenerator<F> {
    name: String,
    f: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(usize, &mut StdRng) -> Vec<Vec3>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> ShapeGenerator for FnGenerator<F>
where
    F: Fn(usize, &mut StdRng) -> Vec<Vec3>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, count: usize, rng: &mut StdRng) -> Vec<Vec3> {
        (self.f)(count, rng)
    }
}

/// Generator returning a fixed array, mostly useful for tests and for
/// point clouds computed elsewhere.
pub struct FixedShape {
    pub name: String,
    pub positions: Vec<Vec3>,
}

impl ShapeGenerator for FixedShape {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, _count: usize, _rng: &mut StdRng) -> Vec<Vec3> {
        self.positions.clone()
    }
}
