use std::collections::HashSet;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scrollfield_core::globe::{
    parse_land_points, pick_cities, Globe, LandBlocks, LandSlot, GLOBE_RADIUS, LAT_ROWS, LON_COLS,
};
use scrollfield_core::transient::{ResourceId, ResourceSink, TransientResource};
use scrollfield_core::{ConfigError, TransientConfig};

fn raster(width: usize, height: usize, red: u8) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * 4];
    for px in rgba.chunks_exact_mut(4) {
        px[0] = red;
        px[3] = 255;
    }
    rgba
}

#[derive(Default)]
struct CountingSink {
    live: HashSet<ResourceId>,
}

impl ResourceSink for CountingSink {
    fn create(&mut self, id: ResourceId, _resource: &TransientResource) {
        self.live.insert(id);
    }

    fn release(&mut self, id: ResourceId) {
        assert!(self.live.remove(&id));
    }
}

// ---------------------------------------------------------------------------
// Land raster
// ---------------------------------------------------------------------------

#[test]
fn test_dark_raster_is_all_land_outside_poles() {
    let points = parse_land_points(&raster(LON_COLS, LAT_ROWS, 0), LON_COLS, LAT_ROWS);
    assert!(!points.is_empty());
    assert!(points.len() < LAT_ROWS * LON_COLS);
    for p in &points {
        assert!((p.position.length() - GLOBE_RADIUS).abs() < 1e-3);
        assert!(p.lat > 0.2 && p.lat < std::f32::consts::PI - 0.2);
    }
}

#[test]
fn test_bright_raster_has_no_land() {
    let points = parse_land_points(&raster(512, 256, 200), 512, 256);
    assert!(points.is_empty());
}

#[test]
fn test_threshold_is_exclusive() {
    assert!(parse_land_points(&raster(240, 120, 50), 240, 120).is_empty());
    assert!(!parse_land_points(&raster(240, 120, 49), 240, 120).is_empty());
}

#[test]
fn test_short_buffer_yields_nothing() {
    assert!(parse_land_points(&[0u8; 16], 240, 120).is_empty());
    assert!(parse_land_points(&[], 0, 0).is_empty());
}

#[test]
fn test_raster_resolution_does_not_change_grid() {
    let small = parse_land_points(&raster(240, 120, 0), 240, 120);
    let large = parse_land_points(&raster(1024, 512, 0), 1024, 512);
    assert_eq!(small.len(), large.len());
}

// ---------------------------------------------------------------------------
// Slot and blocks
// ---------------------------------------------------------------------------

#[test]
fn test_slot_publish_and_fail() {
    let slot = LandSlot::new();
    assert!(slot.snapshot().is_none());

    let reader = slot.clone();
    slot.publish(parse_land_points(&raster(240, 120, 0), 240, 120));
    assert!(!reader.snapshot().unwrap().is_empty());

    let failed = LandSlot::new();
    failed.fail("404");
    assert_eq!(failed.snapshot().map(|p| p.len()), Some(0));
}

#[test]
fn test_cities_sit_above_surface() {
    let points = parse_land_points(&raster(240, 120, 0), 240, 120);
    let mut rng = StdRng::seed_from_u64(3);
    let cities = pick_cities(&points, 14, &mut rng);
    assert_eq!(cities.len(), 14);
    for c in cities {
        assert!(c.length() > GLOBE_RADIUS);
    }
    assert!(pick_cities(&[], 14, &mut rng).is_empty());
}

#[test]
fn test_blocks_assemble_onto_globe() {
    let points: std::rc::Rc<[_]> = parse_land_points(&raster(240, 120, 0), 240, 120).into();
    let mut rng = StdRng::seed_from_u64(9);
    let mut blocks = LandBlocks::new(points.clone(), &mut rng);
    assert_eq!(blocks.len(), points.len());
    assert_eq!(blocks.chaos(), 1.0);

    let mut last = blocks.chaos();
    for frame in 0..600 {
        blocks.tick(frame as f32 / 60.0);
        assert!(blocks.chaos() < last);
        last = blocks.chaos();
    }
    assert!(blocks.chaos() < 1e-4);

    for (t, p) in blocks.transforms().iter().zip(points.iter()) {
        let pos = Vec3::from_array(t.position);
        assert!((pos - p.position).length() < 0.01);
        assert!((Vec3::from_array(t.facing).length() - 1.0).abs() < 1e-4);
    }
}

// ---------------------------------------------------------------------------
// Globe
// ---------------------------------------------------------------------------

#[test]
fn test_globe_waits_for_land_then_builds() {
    let mut globe = Globe::new(TransientConfig::default(), 1).unwrap();
    let mut sink = CountingSink::default();

    globe.tick(0.016, 0.016, Vec2::ZERO, &mut sink);
    assert!(globe.blocks().is_none());
    assert!(globe.cities().is_empty());

    globe
        .land_slot()
        .publish(parse_land_points(&raster(240, 120, 0), 240, 120));
    for frame in 2..=300 {
        let t = frame as f32 * 0.016;
        globe.tick(t, 0.016, Vec2::new(0.5, -0.5), &mut sink);
    }
    assert!(globe.blocks().is_some());
    assert_eq!(globe.cities().len(), 14);
    assert!(globe.flows().active_count() > 0);
    assert!(globe.flows().active_count() <= 15);
    assert!(globe.rig().rotation.y > 0.0);

    globe.teardown(&mut sink);
    assert!(sink.live.is_empty());
}

#[test]
fn test_failed_texture_disables_globe_features() {
    let mut globe = Globe::new(TransientConfig::default(), 1).unwrap();
    let mut sink = CountingSink::default();
    globe.land_slot().fail("network error");
    for frame in 1..=120 {
        globe.tick(frame as f32 * 0.016, 0.016, Vec2::ZERO, &mut sink);
    }
    assert!(globe.blocks().map(|b| b.is_empty()).unwrap_or(false));
    assert!(globe.cities().is_empty());
    assert_eq!(globe.flows().active_count(), 0);
}

#[test]
fn test_globe_rejects_invalid_flow_config() {
    let config = TransientConfig {
        min_speed: 0.02,
        max_speed: 0.01,
        ..TransientConfig::default()
    };
    assert!(matches!(
        Globe::new(config, 1),
        Err(ConfigError::InvalidValue { .. })
    ));
}
