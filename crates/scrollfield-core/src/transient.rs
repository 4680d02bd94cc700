//! Short-lived data-flow arcs: a curve plus a packet traveling along it.
//!
//! Lifecycle of one arc:
//! 1. spawned with a line and a packet resource,
//! 2. packet arrives: packet resource released, arc lingers,
//! 3. linger elapsed: line resource released, arc removed.
//!
//! Each resource id is held in an `Option` and released through `take()`,
//! so release happens exactly once. The arc leaves the active collection
//! only after both resources are gone.

use glam::Vec3;
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TransientConfig;
use crate::error::ConfigError;
use crate::math::rgb_hex;

/// Arc colors.
pub const NEON_COLORS: [u32; 5] = [0x00ff99, 0xff00ff, 0x00ffff, 0xffff00, 0xff3366];
/// Segments used to tessellate an arc line.
pub const ARC_SEGMENTS: usize = 40;

/// Identifier of a host-side graphics resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// Description of a resource the host must create.
#[derive(Clone, Debug, PartialEq)]
pub enum TransientResource {
    Line {
        points: Vec<Vec3>,
        color: Vec3,
        opacity: f32,
    },
    Packet {
        radius: f32,
        color: Vec3,
    },
}

/// Host side of transient graphics: creates, moves and releases resources.
pub trait ResourceSink {
    fn create(&mut self, id: ResourceId, resource: &TransientResource);

    fn move_packet(&mut self, _id: ResourceId, _position: Vec3) {}

    fn release(&mut self, id: ResourceId);
}

/// Quadratic Bézier curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier {
    pub fn point(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }

    /// `segments + 1` evenly parameterized points.
    pub fn points(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point(i as f32 / segments as f32))
            .collect()
    }

    /// Arc between two points on a sphere of `radius`, bulging outward in
    /// proportion to their distance.
    pub fn surface_arc(start: Vec3, end: Vec3, radius: f32) -> Self {
        let dist = start.distance(end);
        let mid = ((start + end) * 0.5).try_normalize().unwrap_or(Vec3::Y);
        Self {
            start,
            control: mid * (radius + dist * 0.4),
            end,
        }
    }
}

/// Where an arc is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlowStage {
    Traveling,
    Lingering { completed_at: f32 },
}

/// One active data-flow arc.
#[derive(Debug)]
pub struct FlowArc {
    pub curve: QuadraticBezier,
    pub color: Vec3,
    /// Packet position along the curve in [0,1].
    pub progress: f32,
    /// Progress added per frame.
    pub speed: f32,
    pub stage: FlowStage,
    packet: Option<ResourceId>,
    line: Option<ResourceId>,
}

impl FlowArc {
    pub fn packet(&self) -> Option<ResourceId> {
        self.packet
    }

    pub fn line(&self) -> Option<ResourceId> {
        self.line
    }

    fn release_packet(&mut self, sink: &mut dyn ResourceSink) {
        if let Some(id) = self.packet.take() {
            sink.release(id);
        }
    }

    fn release_line(&mut self, sink: &mut dyn ResourceSink) {
        if let Some(id) = self.line.take() {
            sink.release(id);
        }
    }

    fn is_released(&self) -> bool {
        self.packet.is_none() && self.line.is_none()
    }
}

/// Spawns, animates and disposes data-flow arcs between anchor points.
pub struct FlowNetwork {
    config: TransientConfig,
    anchors: Vec<Vec3>,
    radius: f32,
    flows: Vec<FlowArc>,
    spawn_clock: f32,
    next_resource: u64,
    rng: StdRng,
}

impl FlowNetwork {
    pub fn new(config: TransientConfig, radius: f32, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "radius",
                value: radius,
            });
        }
        Ok(Self {
            config,
            anchors: Vec::new(),
            radius,
            flows: Vec::new(),
            spawn_clock: 0.0,
            next_resource: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &TransientConfig {
        &self.config
    }

    /// Replace the anchor set. Existing arcs keep running.
    pub fn set_anchors(&mut self, anchors: Vec<Vec3>) {
        self.anchors = anchors;
    }

    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    pub fn flows(&self) -> &[FlowArc] {
        &self.flows
    }

    pub fn active_count(&self) -> usize {
        self.flows.len()
    }

    fn allocate(&mut self) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource += 1;
        id
    }

    fn spawn(&mut self, sink: &mut dyn ResourceSink) {
        let n = self.anchors.len();
        let a = self.rng.gen_range(0..n);
        // Pick from the remaining n-1 anchors so the endpoints differ.
        let mut b = self.rng.gen_range(0..n - 1);
        if b >= a {
            b += 1;
        }

        let curve = QuadraticBezier::surface_arc(self.anchors[a], self.anchors[b], self.radius);
        let color = rgb_hex(NEON_COLORS[self.rng.gen_range(0..NEON_COLORS.len())]);
        let speed = self
            .rng
            .gen_range(self.config.min_speed..=self.config.max_speed);

        let line = self.allocate();
        sink.create(
            line,
            &TransientResource::Line {
                points: curve.points(ARC_SEGMENTS),
                color,
                opacity: 0.25,
            },
        );
        let packet = self.allocate();
        sink.create(packet, &TransientResource::Packet { radius: 0.25, color });
        sink.move_packet(packet, curve.start);

        trace!("spawned flow arc {a} -> {b}");
        self.flows.push(FlowArc {
            curve,
            color,
            progress: 0.0,
            speed,
            stage: FlowStage::Traveling,
            packet: Some(packet),
            line: Some(line),
        });
    }

    /// Advance every arc one frame and spawn when allowed.
    ///
    /// `elapsed` is the animation clock, used for the linger deadline.
    pub fn tick(&mut self, elapsed: f32, delta: f32, sink: &mut dyn ResourceSink) {
        if !elapsed.is_finite() || !delta.is_finite() {
            return;
        }

        if self.anchors.len() >= 2 {
            self.spawn_clock += delta.max(0.0);
            if self.spawn_clock > self.config.spawn_interval
                && self.flows.len() < self.config.max_active
            {
                self.spawn_clock = 0.0;
                self.spawn(sink);
            }
        }

        let linger = self.config.linger;
        for flow in &mut self.flows {
            match flow.stage {
                FlowStage::Traveling => {
                    flow.progress += flow.speed;
                    if flow.progress >= 1.0 {
                        flow.progress = 1.0;
                        flow.release_packet(sink);
                        flow.stage = FlowStage::Lingering {
                            completed_at: elapsed,
                        };
                    } else if let Some(id) = flow.packet {
                        sink.move_packet(id, flow.curve.point(flow.progress));
                    }
                }
                FlowStage::Lingering { completed_at } => {
                    if elapsed - completed_at >= linger {
                        flow.release_line(sink);
                    }
                }
            }
        }
        self.flows.retain(|f| !f.is_released());
    }

    /// Release every remaining resource and drop all arcs.
    pub fn clear(&mut self, sink: &mut dyn ResourceSink) {
        for flow in &mut self.flows {
            flow.release_packet(sink);
            flow.release_line(sink);
        }
        self.flows.clear();
        self.spawn_clock = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints() {
        let c = QuadraticBezier {
            start: Vec3::X,
            control: Vec3::Y * 3.0,
            end: -Vec3::X,
        };
        assert_eq!(c.point(0.0), Vec3::X);
        assert_eq!(c.point(1.0), -Vec3::X);
        assert_eq!(c.points(40).len(), 41);
    }

    #[test]
    fn test_surface_arc_bulges_outward() {
        let a = Vec3::new(15.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 15.0, 0.0);
        let arc = QuadraticBezier::surface_arc(a, b, 15.0);
        assert!(arc.control.length() > 15.0);
        assert!(arc.point(0.5).length() > 10.0);
    }

    #[test]
    fn test_surface_arc_antipodal_has_finite_control() {
        let a = Vec3::new(15.0, 0.0, 0.0);
        let arc = QuadraticBezier::surface_arc(a, -a, 15.0);
        assert!(arc.control.is_finite());
    }
}
