// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

#[test]
fn rect_corners_map_to_ndc_extremes() {
    let origin = Vec2::new(100.0, 50.0);
    let size = Vec2::new(800.0, 600.0);

    let top_left = client_to_ndc(origin, origin, size);
    assert!((top_left - Vec2::new(-1.0, -1.0)).length() < 1e-6);

    let bottom_right = client_to_ndc(origin + size, origin, size);
    assert!((bottom_right - Vec2::new(1.0, 1.0)).length() < 1e-6);
}

#[test]
fn rect_centre_maps_to_origin() {
    let origin = Vec2::new(0.0, 0.0);
    let size = Vec2::new(1280.0, 720.0);
    let centre = client_to_ndc(size * 0.5, origin, size);
    assert!(centre.length() < 1e-6);
}

#[test]
fn y_grows_downwards() {
    let size = Vec2::new(400.0, 400.0);
    let upper = client_to_ndc(Vec2::new(200.0, 100.0), Vec2::ZERO, size);
    let lower = client_to_ndc(Vec2::new(200.0, 300.0), Vec2::ZERO, size);
    assert!(upper.y < 0.0);
    assert!(lower.y > 0.0);
}

#[test]
fn degenerate_rect_maps_to_centre() {
    let p = Vec2::new(10.0, 10.0);
    assert_eq!(client_to_ndc(p, Vec2::ZERO, Vec2::ZERO), Vec2::ZERO);
    assert_eq!(client_to_ndc(p, Vec2::ZERO, Vec2::new(300.0, 0.0)), Vec2::ZERO);
}

#[test]
fn points_outside_the_rect_are_not_clamped_here() {
    // Clamping happens when the view stores the pointer.
    let v = client_to_ndc(Vec2::new(-100.0, 0.0), Vec2::ZERO, Vec2::new(100.0, 100.0));
    assert!(v.x < -1.0);
}
