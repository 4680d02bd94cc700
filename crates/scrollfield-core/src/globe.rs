//! Landmass globe: blocks derived from a raster, cursor-aware rig and
//! data-flow arcs between sampled cities.

use std::cell::RefCell;
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use glam::{Vec2, Vec3};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TransientConfig;
use crate::error::ConfigError;
use crate::math::mix;
use crate::transient::{FlowNetwork, ResourceSink};

pub const GLOBE_RADIUS: f32 = 15.0;
pub const LAT_ROWS: usize = 120;
pub const LON_COLS: usize = 240;
pub const CITY_COUNT: usize = 14;
/// Red channel below this marks land in the specular map.
const LAND_THRESHOLD: u8 = 50;
/// Polar band (radians) skipped at both poles.
const POLAR_MARGIN: f32 = 0.2;

/// One land sample on the globe surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandPoint {
    pub position: Vec3,
    /// Polar angle from +Y.
    pub lat: f32,
    pub lon: f32,
}

/// Position on a sphere of `radius` for polar angle `lat` and azimuth `lon`.
pub fn spherical(radius: f32, lat: f32, lon: f32) -> Vec3 {
    Vec3::new(
        radius * lat.sin() * lon.cos(),
        radius * lat.cos(),
        radius * lat.sin() * lon.sin(),
    )
}

/// Sample an RGBA raster on a 120×240 lat/lon grid and keep land pixels.
///
/// A buffer that doesn't match `width * height * 4` yields no points.
pub fn parse_land_points(rgba: &[u8], width: usize, height: usize) -> Vec<LandPoint> {
    if width == 0 || height == 0 || rgba.len() < width * height * 4 {
        warn!(
            "land raster {}x{} with {} bytes is unusable",
            width,
            height,
            rgba.len()
        );
        return Vec::new();
    }

    let mut points = Vec::new();
    for row in 0..LAT_ROWS {
        let lat = PI * row as f32 / LAT_ROWS as f32;
        if !(lat > POLAR_MARGIN && lat < PI - POLAR_MARGIN) {
            continue;
        }
        let v = row * height / LAT_ROWS;
        for col in 0..LON_COLS {
            let lon = TAU * col as f32 / LON_COLS as f32;
            let u = col * width / LON_COLS;
            let red = rgba[(v * width + u) * 4];
            if red < LAND_THRESHOLD {
                points.push(LandPoint {
                    position: spherical(GLOBE_RADIUS, lat, lon),
                    lat,
                    lon,
                });
            }
        }
    }
    points
}

/// Publishes the land point cloud from the asset loader to the frame loop.
///
/// The loader swaps in a complete immutable list; readers only ever see
/// "nothing yet" or the whole list.
#[derive(Clone, Default)]
pub struct LandSlot(Rc<RefCell<Option<Rc<[LandPoint]>>>>);

impl LandSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, points: Vec<LandPoint>) {
        debug!("land point cloud published: {} points", points.len());
        *self.0.borrow_mut() = Some(points.into());
    }

    /// Asset failed to load: publish an empty set so the feature disables.
    pub fn fail(&self, reason: &str) {
        warn!("land texture unavailable: {reason}");
        *self.0.borrow_mut() = Some(Vec::<LandPoint>::new().into());
    }

    pub fn snapshot(&self) -> Option<Rc<[LandPoint]>> {
        self.0.borrow().clone()
    }
}

/// City anchors sampled from land points, slightly above the surface.
pub fn pick_cities<R: Rng>(points: &[LandPoint], count: usize, rng: &mut R) -> Vec<Vec3> {
    if points.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| {
            let p = points[rng.gen_range(0..points.len())];
            spherical(GLOBE_RADIUS + 0.6, p.lat, p.lon)
        })
        .collect()
}

/// GPU-compatible block transform: 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockTransform {
    pub position: [f32; 3],
    pub scale: f32,
    /// Unit vector pointing at the globe center.
    pub facing: [f32; 3],
    pub _pad: f32,
}

/// Land blocks that assemble from a scattered cloud onto the globe.
pub struct LandBlocks {
    points: Rc<[LandPoint]>,
    offsets: Vec<(Vec3, f32)>,
    chaos: f32,
    transforms: Vec<BlockTransform>,
}

impl LandBlocks {
    pub fn new<R: Rng>(points: Rc<[LandPoint]>, rng: &mut R) -> Self {
        let offsets = points
            .iter()
            .map(|_| {
                let offset = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 40.0,
                    (rng.gen::<f32>() - 0.5) * 40.0,
                    (rng.gen::<f32>() - 0.5) * 40.0,
                );
                (offset, rng.gen::<f32>() * TAU)
            })
            .collect();
        let transforms = vec![<BlockTransform as bytemuck::Zeroable>::zeroed(); points.len()];
        Self {
            points,
            offsets,
            chaos: 1.0,
            transforms,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 1.0 fully scattered, decays toward 0.
    pub fn chaos(&self) -> f32 {
        self.chaos
    }

    pub fn transforms(&self) -> &[BlockTransform] {
        &self.transforms
    }

    pub fn tick(&mut self, time: f32) {
        if self.points.is_empty() {
            return;
        }
        self.chaos = mix(self.chaos, 0.0, 0.02);
        let chaos = self.chaos;
        let scale = 1.0 - chaos * 0.5;

        for ((point, (offset, phase)), out) in self
            .points
            .iter()
            .zip(&self.offsets)
            .zip(self.transforms.iter_mut())
        {
            let vibration = (time * 2.0 + phase).sin() * 0.02 * chaos;
            let position = point.position + *offset * chaos + Vec3::splat(vibration);
            let facing = (-position).try_normalize().unwrap_or(Vec3::NEG_Y);
            *out = BlockTransform {
                position: position.to_array(),
                scale,
                facing: facing.to_array(),
                _pad: 0.0,
            };
        }
    }
}

/// Cursor-aware globe rotation with a constant slow spin.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobeRig {
    /// Current (x, y) rotation in radians.
    pub rotation: Vec2,
    target: Vec2,
}

impl GlobeRig {
    const SPIN: f32 = 0.0012;
    const EASE: f32 = 0.03;

    /// `mouse` is the pointer in normalized device coordinates.
    pub fn tick(&mut self, mouse: Vec2) {
        let mouse = if mouse.is_finite() { mouse } else { Vec2::ZERO };
        self.target.y = mix(self.target.y, mouse.x * 0.15, Self::EASE);
        self.target.x = mix(self.target.x, -mouse.y * 0.1, Self::EASE);

        self.rotation.y += Self::SPIN;
        self.rotation.y += (self.target.y - self.rotation.y) * Self::EASE;
        self.rotation.x += (self.target.x - self.rotation.x) * Self::EASE;
    }
}

/// Everything the globe variant animates per frame.
pub struct Globe {
    slot: LandSlot,
    blocks: Option<LandBlocks>,
    cities: Vec<Vec3>,
    flows: FlowNetwork,
    rig: GlobeRig,
    rng: StdRng,
}

impl Globe {
    pub fn new(config: TransientConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            slot: LandSlot::new(),
            blocks: None,
            cities: Vec::new(),
            flows: FlowNetwork::new(config, GLOBE_RADIUS, seed ^ 0xf10f)?,
            rig: GlobeRig::default(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Slot the asset loader publishes into.
    pub fn land_slot(&self) -> LandSlot {
        self.slot.clone()
    }

    pub fn blocks(&self) -> Option<&LandBlocks> {
        self.blocks.as_ref()
    }

    pub fn cities(&self) -> &[Vec3] {
        &self.cities
    }

    pub fn flows(&self) -> &FlowNetwork {
        &self.flows
    }

    pub fn rig(&self) -> &GlobeRig {
        &self.rig
    }

    /// Advance one frame. Blocks and cities appear on the first frame after
    /// the land point cloud is published.
    pub fn tick(&mut self, elapsed: f32, delta: f32, mouse: Vec2, sink: &mut dyn ResourceSink) {
        if self.blocks.is_none() {
            if let Some(points) = self.slot.snapshot() {
                self.cities = pick_cities(&points, CITY_COUNT, &mut self.rng);
                self.flows.set_anchors(self.cities.clone());
                self.blocks = Some(LandBlocks::new(points, &mut self.rng));
            }
        }

        self.rig.tick(mouse);
        if let Some(blocks) = &mut self.blocks {
            blocks.tick(elapsed);
        }
        self.flows.tick(elapsed, delta, sink);
    }

    /// Release every transient resource.
    pub fn teardown(&mut self, sink: &mut dyn ResourceSink) {
        self.flows.clear(sink);
    }
}
