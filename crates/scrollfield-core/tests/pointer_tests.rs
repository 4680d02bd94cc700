use glam::Vec3;
use scrollfield_core::forces::pointer::{
    compute_interaction, hover_tint, repulsion, ripple, ClickState, InteractionParams,
    PointerState, OFFSCREEN,
};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

/// Default tuning: repulsion radius 12 / strength 5, ripple speed 40,
/// width 5, strength 4, window 1.5s, total clamp 8.
fn params() -> InteractionParams {
    InteractionParams::default()
}

fn pointer_at(p: Vec3) -> PointerState {
    PointerState {
        raw: p,
        position: p,
        previous: p,
    }
}

fn click_at(p: Vec3, time: f32) -> ClickState {
    ClickState { position: p, time }
}

// ---------------------------------------------------------------------------
// Repulsion
// ---------------------------------------------------------------------------

#[test]
fn test_repulsion_pushes_outward() {
    let (offset, proximity) = repulsion(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, &params());
    assert!(offset.x > 0.0, "should push away along +X, got {offset:?}");
    assert!(offset.y.abs() < 1e-6 && offset.z.abs() < 1e-6);
    assert!((proximity - 0.75).abs() < 1e-6);
    // Force proportional to (1 - d/r): 0.75 * 5.
    assert!((offset.length() - 3.75).abs() < 1e-5);
}

#[test]
fn test_repulsion_zero_outside_radius() {
    let (offset, proximity) = repulsion(Vec3::new(12.5, 0.0, 0.0), Vec3::ZERO, &params());
    assert_eq!(offset, Vec3::ZERO);
    assert_eq!(proximity, 0.0);
}

#[test]
fn test_repulsion_scaled_by_gain() {
    let disabled = InteractionParams {
        gain: 0.0,
        ..params()
    };
    let (offset, _) = repulsion(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, &disabled);
    assert_eq!(offset, Vec3::ZERO);
}

#[test]
fn test_repulsion_at_pointer_is_finite() {
    let (offset, _) = repulsion(Vec3::ZERO, Vec3::ZERO, &params());
    assert!(offset.is_finite());
}

// ---------------------------------------------------------------------------
// Ripple
// ---------------------------------------------------------------------------

#[test]
fn test_ripple_displaces_particles_on_the_ring() {
    let p = params();
    let click = click_at(Vec3::ZERO, 0.0);
    let ring = 0.75 * p.ripple_speed;

    let (offset, flash) = ripple(Vec3::new(ring, 0.0, 0.0), &click, 0.75, &p);
    assert!(offset.x > 0.0, "ring particle should move outward: {offset:?}");
    // Full wave weight, half the time left: 4 * 1 * 0.5.
    assert!((offset.length() - 2.0).abs() < 1e-4);
    assert!(flash > 0.0);

    // Far inside the ring: untouched.
    let (inside, _) = ripple(Vec3::new(ring - 10.0, 0.0, 0.0), &click, 0.75, &p);
    assert_eq!(inside, Vec3::ZERO);
}

#[test]
fn test_ripple_tapers_with_ring_distance() {
    let p = params();
    let click = click_at(Vec3::ZERO, 0.0);
    let ring = 0.5 * p.ripple_speed;
    let (on_ring, _) = ripple(Vec3::new(ring, 0.0, 0.0), &click, 0.5, &p);
    let (near_ring, _) = ripple(Vec3::new(ring + 2.5, 0.0, 0.0), &click, 0.5, &p);
    assert!(on_ring.length() > near_ring.length());
    assert!(near_ring.length() > 0.0);
}

#[test]
fn test_ripple_gone_after_window() {
    let p = params();
    let click = click_at(Vec3::ZERO, 0.0);
    for x in 0..120 {
        let base = Vec3::new(x as f32, 0.0, 0.0);
        assert_eq!(ripple(base, &click, 2.0, &p).0, Vec3::ZERO);
        assert_eq!(ripple(base, &click, 1.5, &p).0, Vec3::ZERO);
    }
}

#[test]
fn test_ripple_ignores_clicks_in_the_future() {
    let p = params();
    let click = click_at(Vec3::ZERO, 5.0);
    assert_eq!(ripple(Vec3::new(1.0, 0.0, 0.0), &click, 4.0, &p).0, Vec3::ZERO);
}

// ---------------------------------------------------------------------------
// Combined
// ---------------------------------------------------------------------------

#[test]
fn test_combined_offset_is_clamped() {
    let p = InteractionParams {
        repulsion_strength: 50.0,
        ripple_strength: 50.0,
        max_displacement: 3.0,
        ..params()
    };
    let base = Vec3::new(1.0, 0.0, 0.0);
    let click = click_at(Vec3::ZERO, 0.0);
    let r = compute_interaction(base, &pointer_at(Vec3::ZERO), &click, 0.01, &p);
    assert!(r.offset.length() <= 3.0 + 1e-5, "offset not clamped: {:?}", r.offset);
    assert!(r.offset.x > 0.0);
}

#[test]
fn test_combined_reads_same_base() {
    let p = params();
    let base = Vec3::new(4.0, 0.0, 0.0);
    let pointer = pointer_at(Vec3::ZERO);
    let click = click_at(Vec3::ZERO, 0.0);
    let elapsed = 0.1;

    let (push, _) = repulsion(base, pointer.position, &p);
    let (wave, _) = ripple(base, &click, elapsed, &p);
    let combined = compute_interaction(base, &pointer, &click, elapsed, &p);
    assert!((combined.offset - (push + wave)).length() < 1e-5);
}

#[test]
fn test_offscreen_pointer_exerts_nothing() {
    let r = compute_interaction(
        Vec3::new(1.0, 2.0, 3.0),
        &PointerState::default(),
        &ClickState::default(),
        10.0,
        &params(),
    );
    assert_eq!(r.offset, Vec3::ZERO);
    assert_eq!(r.proximity, 0.0);
    assert_eq!(r.flash, 0.0);
}

// ---------------------------------------------------------------------------
// Pointer state
// ---------------------------------------------------------------------------

#[test]
fn test_pointer_follow_eases_and_snaps_from_offscreen() {
    let mut pointer = PointerState::default();
    pointer.move_to(Vec3::new(10.0, 0.0, 0.0));
    pointer.follow(0.1);
    assert_eq!(pointer.position, Vec3::new(10.0, 0.0, 0.0), "first sample snaps");
    assert_eq!(pointer.velocity(), Vec3::ZERO);

    pointer.move_to(Vec3::new(20.0, 0.0, 0.0));
    pointer.follow(0.1);
    assert!((pointer.position.x - 11.0).abs() < 1e-5);
    assert!((pointer.velocity().x - 1.0).abs() < 1e-5);

    pointer.leave();
    assert_eq!(pointer.position, OFFSCREEN);
}

#[test]
fn test_pointer_ignores_non_finite_input() {
    let mut pointer = PointerState::default();
    pointer.move_to(Vec3::new(1.0, 1.0, 0.0));
    pointer.move_to(Vec3::new(f32::NAN, 0.0, 0.0));
    assert_eq!(pointer.raw, Vec3::new(1.0, 1.0, 0.0));
}

#[test]
fn test_hover_tint_regions() {
    let base = Vec3::new(0.5, 0.5, 0.5);
    let active = Vec3::new(0.0, 0.0, 1.0);
    let core = Vec3::ONE;
    assert_eq!(hover_tint(base, 0.0, active, core), base);
    assert_eq!(hover_tint(base, 0.8, active, core), active);
    assert!((hover_tint(base, 1.0, active, core) - core).length() < 1e-5);
}
