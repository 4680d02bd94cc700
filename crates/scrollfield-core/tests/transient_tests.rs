use std::collections::{HashMap, HashSet};

use glam::Vec3;
use scrollfield_core::transient::{
    FlowNetwork, FlowStage, ResourceId, ResourceSink, TransientResource,
};
use scrollfield_core::{ConfigError, TransientConfig};

const DT: f32 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Recording sink
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSink {
    now: f32,
    live: HashSet<ResourceId>,
    created: Vec<ResourceId>,
    release_counts: HashMap<ResourceId, usize>,
    released_at: HashMap<ResourceId, f32>,
    lines: usize,
    packets: usize,
}

impl ResourceSink for RecordingSink {
    fn create(&mut self, id: ResourceId, resource: &TransientResource) {
        assert!(self.live.insert(id), "{id:?} created twice");
        self.created.push(id);
        match resource {
            TransientResource::Line { points, .. } => {
                assert_eq!(points.len(), 41);
                self.lines += 1;
            }
            TransientResource::Packet { .. } => self.packets += 1,
        }
    }

    fn move_packet(&mut self, id: ResourceId, position: Vec3) {
        assert!(self.live.contains(&id), "moving released packet {id:?}");
        assert!(position.is_finite());
    }

    fn release(&mut self, id: ResourceId) {
        assert!(self.live.remove(&id), "{id:?} released while not live");
        *self.release_counts.entry(id).or_default() += 1;
        self.released_at.insert(id, self.now);
    }
}

fn anchors() -> Vec<Vec3> {
    vec![
        Vec3::new(15.6, 0.0, 0.0),
        Vec3::new(0.0, 15.6, 0.0),
        Vec3::new(0.0, 0.0, 15.6),
        Vec3::new(-11.0, 11.0, 0.0),
    ]
}

fn network(config: TransientConfig) -> FlowNetwork {
    let mut net = FlowNetwork::new(config, 15.0, 7).unwrap();
    net.set_anchors(anchors());
    net
}

fn run(net: &mut FlowNetwork, sink: &mut RecordingSink, frames: usize) {
    for frame in 1..=frames {
        let elapsed = frame as f32 * DT;
        sink.now = elapsed;
        net.tick(elapsed, DT, sink);
    }
}

// ---------------------------------------------------------------------------
// Cap
// ---------------------------------------------------------------------------

#[test]
fn test_active_count_never_exceeds_cap() {
    let config = TransientConfig {
        spawn_interval: 0.001,
        min_speed: 0.001,
        max_speed: 0.002,
        ..TransientConfig::default()
    };
    let mut net = network(config);
    let mut sink = RecordingSink::default();

    let mut peak = 0;
    for frame in 1..=600 {
        let elapsed = frame as f32 * DT;
        sink.now = elapsed;
        net.tick(elapsed, DT, &mut sink);
        assert!(net.active_count() <= 15, "frame {frame}: {} active", net.active_count());
        peak = peak.max(net.active_count());
    }
    assert_eq!(peak, 15);
}

#[test]
fn test_fewer_than_two_anchors_never_spawns() {
    let mut net = FlowNetwork::new(TransientConfig::default(), 15.0, 1).unwrap();
    net.set_anchors(vec![Vec3::X * 15.0]);
    let mut sink = RecordingSink::default();
    run(&mut net, &mut sink, 300);
    assert_eq!(net.active_count(), 0);
    assert!(sink.created.is_empty());
}

#[test]
fn test_arc_endpoints_differ() {
    let config = TransientConfig {
        spawn_interval: 0.001,
        min_speed: 0.001,
        max_speed: 0.001,
        ..TransientConfig::default()
    };
    let mut net = network(config);
    let mut sink = RecordingSink::default();
    run(&mut net, &mut sink, 30);
    for flow in net.flows() {
        assert_ne!(flow.curve.start, flow.curve.end);
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_completed_arc_removed_after_linger() {
    let config = TransientConfig {
        max_active: 1,
        spawn_interval: 0.001,
        min_speed: 0.5,
        max_speed: 0.5,
        linger: 1.5,
    };
    let mut net = network(config);
    let mut sink = RecordingSink::default();

    // Line is allocated first, then the packet.
    let line = ResourceId(0);
    let packet = ResourceId(1);

    let mut removed_at = None;
    for frame in 1..=200 {
        let elapsed = frame as f32 * DT;
        sink.now = elapsed;
        net.tick(elapsed, DT, &mut sink);

        let still_active = net.flows().iter().any(|f| f.line() == Some(line));
        if removed_at.is_none() && sink.released_at.contains_key(&packet) && !still_active {
            removed_at = Some(elapsed);
        }
        if let Some(flow) = net.flows().iter().find(|f| f.line() == Some(line)) {
            if flow.packet().is_none() {
                assert!(matches!(flow.stage, FlowStage::Lingering { .. }));
            }
        }
    }

    let completed = sink.released_at[&packet];
    let line_released = sink.released_at[&line];
    let removed = removed_at.expect("arc should have been removed");
    let linger = line_released - completed;
    assert!(
        linger >= 1.5 - 1e-3 && linger <= 1.5 + DT + 1e-3,
        "line released {linger}s after arrival"
    );
    assert_eq!(removed, line_released, "removed in the same frame as release");
}

#[test]
fn test_every_resource_released_exactly_once() {
    let config = TransientConfig {
        spawn_interval: 0.05,
        min_speed: 0.05,
        max_speed: 0.2,
        linger: 0.3,
        ..TransientConfig::default()
    };
    let mut net = network(config);
    let mut sink = RecordingSink::default();
    run(&mut net, &mut sink, 1200);

    net.clear(&mut sink);
    assert_eq!(net.active_count(), 0);
    assert!(sink.live.is_empty(), "leaked: {:?}", sink.live);
    assert_eq!(sink.lines, sink.packets);
    for id in &sink.created {
        assert_eq!(sink.release_counts.get(id), Some(&1), "{id:?}");
    }

    // Clearing again releases nothing.
    net.clear(&mut sink);
    for id in &sink.created {
        assert_eq!(sink.release_counts.get(id), Some(&1), "{id:?}");
    }
}

#[test]
fn test_non_finite_clock_is_ignored() {
    let mut net = network(TransientConfig::default());
    let mut sink = RecordingSink::default();
    net.tick(f32::NAN, DT, &mut sink);
    net.tick(1.0, f32::INFINITY, &mut sink);
    assert_eq!(net.active_count(), 0);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_inverted_speed_range_rejected() {
    let config = TransientConfig {
        min_speed: 0.02,
        max_speed: 0.01,
        ..TransientConfig::default()
    };
    assert!(matches!(
        FlowNetwork::new(config, 15.0, 7),
        Err(ConfigError::InvalidValue {
            field: "transient.min_speed",
            ..
        })
    ));
}

#[test]
fn test_non_finite_speed_and_radius_rejected() {
    let config = TransientConfig {
        max_speed: f32::NAN,
        ..TransientConfig::default()
    };
    assert!(FlowNetwork::new(config, 15.0, 7).is_err());
    assert!(FlowNetwork::new(TransientConfig::default(), 0.0, 7).is_err());
    assert!(FlowNetwork::new(TransientConfig::default(), f32::INFINITY, 7).is_err());
}

#[test]
fn test_custom_cap_is_respected() {
    let config = TransientConfig {
        max_active: 3,
        spawn_interval: 0.001,
        min_speed: 0.001,
        max_speed: 0.001,
        ..TransientConfig::default()
    };
    let mut net = network(config);
    assert_eq!(net.config().max_active, 3);
    let mut sink = RecordingSink::default();
    run(&mut net, &mut sink, 120);
    assert_eq!(net.active_count(), 3);
}
