#![cfg(target_arch = "wasm32")]

use scrollfield_wasm::{GlobeView, ScrollField};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn noop() -> js_sys::Function {
    js_sys::Function::new_no_args("")
}

#[wasm_bindgen_test]
fn scroll_field_exposes_instance_buffer() {
    let mut field = ScrollField::new("pipeline", 256).unwrap();
    assert_eq!(field.particle_count(), 256);
    assert_eq!(field.get_instance_buffer_byte_length(), 256 * 32);
    assert!(!field.get_instance_buffer_ptr().is_null());

    field.set_scroll(0.0);
    assert!(field.frame(0.0));
    assert!(field.frame(16.0));
}

#[wasm_bindgen_test]
fn unknown_variant_is_rejected() {
    assert!(ScrollField::new("spiral", 64).is_err());
}

#[wasm_bindgen_test]
fn scroll_field_destroy_is_idempotent() {
    let mut field = ScrollField::new("matrix", 512).unwrap();
    field.start().unwrap();
    field.destroy();
    assert!(field.is_destroyed());
    assert!(!field.frame(32.0));
    field.destroy();
}

#[wasm_bindgen_test]
fn globe_builds_from_pixels() {
    let mut globe = GlobeView::new(noop(), noop(), noop(), 7, 0).unwrap();
    assert_eq!(globe.max_flows(), 15);
    assert!(!globe.is_land_ready());

    let rgba = vec![0u8; 240 * 120 * 4];
    globe.set_land_pixels(&rgba, 240, 120);
    for frame in 0..120 {
        globe.tick(frame as f64 * 16.0);
    }
    assert!(globe.is_land_ready());
    assert!(globe.block_count() > 0);
    assert_eq!(globe.get_block_buffer_byte_length(), globe.block_count() * 32);
    assert!(globe.active_flows() <= 15);
    globe.destroy();
}

#[wasm_bindgen_test]
fn globe_honors_custom_flow_cap() {
    let mut globe = GlobeView::new(noop(), noop(), noop(), 3, 4).unwrap();
    assert_eq!(globe.max_flows(), 4);

    let rgba = vec![0u8; 240 * 120 * 4];
    globe.set_land_pixels(&rgba, 240, 120);
    for frame in 0..600 {
        globe.tick(frame as f64 * 16.0);
        assert!(globe.active_flows() <= 4);
    }
    globe.destroy();
    assert_eq!(globe.active_flows(), 0);
}
