// Host-side tests for front-end constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
fn star_quad_covers_unit_square_with_two_triangles() {
    assert_eq!(STAR_QUAD.len(), 6);
    for c in STAR_QUAD.iter() {
        assert!(c[0].abs() == 1.0 && c[1].abs() == 1.0);
    }
    // Signed areas of both triangles share a winding.
    let area = |a: [f32; 2], b: [f32; 2], c: [f32; 2]| {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    };
    let first = area(STAR_QUAD[0], STAR_QUAD[1], STAR_QUAD[2]);
    let second = area(STAR_QUAD[3], STAR_QUAD[4], STAR_QUAD[5]);
    assert!(first > 0.0 && second > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn frame_tuning_is_sane() {
    assert!(MAX_FRAME_DT_SEC > 1.0 / 60.0);
    assert!(MAX_FRAME_DT_SEC <= 1.0);
    assert!(OVERLAY_MIN_ALPHA > 0.0 && OVERLAY_MIN_ALPHA < 0.01);
}

#[test]
fn canvas_never_takes_pointer_input() {
    assert!(CANVAS_STYLE.contains("pointer-events:none"));
    assert!(CANVAS_STYLE.contains("position:absolute"));
    assert!(REDUCED_MOTION_QUERY.contains("prefers-reduced-motion"));
}
