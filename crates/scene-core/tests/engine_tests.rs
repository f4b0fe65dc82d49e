// Host-side tests for the per-frame engine: convergence, jitter bounds and
// metric clamping.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scene_core::*;

const SEED: u64 = 42;

fn make_engine(initial: PageScene) -> SceneEngine {
    let config = EngineConfig {
        seed: Some(SEED),
        ..EngineConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut engine = SceneEngine::new(config, &SceneInputs::for_scene(initial), &mut rng);
    engine.set_viewport(1280, 720);
    engine
}

/// Clock stuck at one instant so the per-vertex targets stop moving.
fn frozen(_frame: u32) -> FrameClock {
    FrameClock {
        elapsed: 1.0,
        dt: 1.0 / 60.0,
    }
}

#[test]
fn home_to_projects_converges_within_two_seconds() {
    let mut engine = make_engine(PageScene::Home);
    let inputs = SceneInputs::for_scene(PageScene::Projects);

    let deform = DeformClock::at(1.0);
    let targets: Vec<Vec3> = (0..engine.shape().vertex_count())
        .map(|i| engine.shape().target(PageScene::Projects, i, &deform))
        .collect();
    let initial: Vec<f32> = engine
        .positions()
        .iter()
        .zip(&targets)
        .map(|(p, t)| p.distance(*t))
        .collect();

    for n in 0..120 {
        engine.frame(&inputs, Vec2::ZERO, frozen(n));
    }

    let grid = engine.visual().grid_opacity;
    assert!(
        (grid - GRID_OPACITY_MAX).abs() <= GRID_OPACITY_MAX * 0.05,
        "grid opacity {grid}"
    );
    assert!(engine.visual().grid_visible);
    for (i, (p, t)) in engine.positions().iter().zip(&targets).enumerate() {
        let remaining = p.distance(*t);
        assert!(
            remaining <= initial[i] * 0.1 + 1e-4,
            "vertex {i}: {remaining} left of {}",
            initial[i]
        );
    }
}

#[test]
fn leaving_projects_fades_the_grid_out() {
    let mut engine = make_engine(PageScene::Projects);
    let projects = SceneInputs::for_scene(PageScene::Projects);
    for n in 0..60 {
        engine.frame(&projects, Vec2::ZERO, frozen(n));
    }
    let home = SceneInputs::for_scene(PageScene::Home);
    engine.frame(&home, Vec2::ZERO, frozen(60));
    assert!(!engine.visual().grid_visible);
    let mut prev = engine.visual().grid_opacity;
    for n in 61..200 {
        engine.frame(&home, Vec2::ZERO, frozen(n));
        let now = engine.visual().grid_opacity;
        assert!(now <= prev);
        prev = now;
    }
    assert!(prev < 0.001);
}

#[test]
fn scene_change_snaps_material_scalars() {
    let mut engine = make_engine(PageScene::Home);
    engine.frame(
        &SceneInputs::for_scene(PageScene::About),
        Vec2::ZERO,
        frozen(0),
    );
    let about = palette(PageScene::About);
    let v = engine.visual();
    assert_eq!(v.transmission, about.transmission);
    assert_eq!(v.metalness, about.metalness);
    assert_eq!(v.roughness, about.roughness);
    // Colours ease rather than snap.
    assert_ne!(v.core_color, about.base);
}

#[test]
fn pre_phase_jitter_stays_within_amplitude() {
    let mut shaking = make_engine(PageScene::Home);
    let mut calm = make_engine(PageScene::Home);
    let mut pre = SceneInputs::for_scene(PageScene::Home);
    pre.phase = TransitionPhase::Pre;
    let idle = SceneInputs::for_scene(PageScene::Home);

    for n in 0..600 {
        let clock = FrameClock::fixed(n, 60.0);
        let pointer = Vec2::new((n as f32 * 0.01).sin(), (n as f32 * 0.013).cos());
        shaking.frame(&pre, pointer, clock);
        calm.frame(&idle, pointer, clock);
        let d = shaking.visual().camera_position - calm.visual().camera_position;
        assert!(
            d.abs().max_element() <= JITTER_AMPLITUDE + 1e-5,
            "frame {n}: offset {d:?}"
        );
    }
}

#[test]
fn out_of_range_metrics_are_clamped() {
    let mut engine = make_engine(PageScene::Home);
    let mut inputs = SceneInputs::for_scene(PageScene::Home);
    inputs.phase = TransitionPhase::Pre;
    inputs.metrics = SceneMetrics {
        project_count: 500.0,
        collaboration_factor: 5.0,
        outreach_level: -3.0,
    };
    let ceiling = STICK_INTENSITY_BASE + STICK_INTENSITY_SPAN + STICK_PRE_BONUS;
    for n in 0..400 {
        engine.frame(&inputs, Vec2::ZERO, FrameClock::fixed(n, 60.0));
        let v = engine.visual();
        assert!(v.stick_intensity <= ceiling + 1e-5);
        assert!(v.star_size <= STAR_SIZE_BASE + STAR_SIZE_SPAN + 1e-5);
        assert!(v.star_opacity >= STAR_OPACITY_BASE - 1e-5);
    }
    assert!((engine.visual().stick_intensity - ceiling).abs() < 1e-3);
}

#[test]
fn nan_metrics_do_not_poison_the_frame() {
    let mut engine = make_engine(PageScene::Contact);
    let mut inputs = SceneInputs::for_scene(PageScene::Contact);
    inputs.metrics.outreach_level = f32::NAN;
    for n in 0..10 {
        engine.frame(&inputs, Vec2::ZERO, FrameClock::fixed(n, 60.0));
    }
    assert!(engine.visual().star_opacity.is_finite());
}

#[test]
fn layouts_match_the_mesh() {
    let engine = make_engine(PageScene::Home);
    let shape = engine.shape();
    let v = shape.vertex_count();
    assert_eq!(v, 960);
    assert_eq!(shape.layouts.vertex_count(), v);
    assert_eq!(shape.layouts.fragment.len(), v);
    assert_eq!(shape.layouts.lattice.len(), v);
    assert_eq!(shape.layouts.portal.len(), v);
    assert_eq!(shape.layouts.angles.len(), v);
    let floats: &[f32] = bytemuck::cast_slice(&shape.layouts.lattice);
    assert_eq!(floats.len(), 3 * v);
    assert_eq!(engine.normals().len(), v);
}

#[test]
fn lattice_lands_on_grid_steps() {
    let engine = make_engine(PageScene::Home);
    for p in &engine.shape().layouts.lattice {
        for (c, step) in [(p.x, LATTICE_CELL), (p.y, LATTICE_Y_STEP), (p.z, LATTICE_CELL)] {
            let k = c / step;
            assert!((k - k.round()).abs() < 1e-3, "{c} is not a multiple of {step}");
        }
    }
}

#[test]
fn home_shape_stays_inside_max_radius() {
    let engine = make_engine(PageScene::Home);
    for n in 0..50 {
        let clock = DeformClock::at(n as f32 * 0.37);
        for i in 0..engine.shape().vertex_count() {
            let p = engine.shape().target(PageScene::Home, i, &clock);
            assert!(p.length() <= ORGANIC_MAX_RADIUS + 1e-4);
        }
    }
}

#[test]
fn time_scaled_mode_matches_per_frame_at_reference_rate() {
    let mut rng_a = StdRng::seed_from_u64(SEED);
    let mut rng_b = StdRng::seed_from_u64(SEED);
    let start = SceneInputs::for_scene(PageScene::Home);
    let mut per_frame = SceneEngine::new(EngineConfig::default(), &start, &mut rng_a);
    let mut scaled = SceneEngine::new(
        EngineConfig {
            smoothing: SmoothingMode::TimeScaled { reference_hz: 60.0 },
            ..EngineConfig::default()
        },
        &start,
        &mut rng_b,
    );
    let target = SceneInputs::for_scene(PageScene::Contact);
    for n in 0..90 {
        let clock = FrameClock::fixed(n, 60.0);
        per_frame.frame(&target, Vec2::ZERO, clock);
        scaled.frame(&target, Vec2::ZERO, clock);
    }
    let a = per_frame.visual();
    let b = scaled.visual();
    assert!((a.portal_alpha - b.portal_alpha).abs() < 1e-3);
    assert!(a.camera_position.distance(b.camera_position) < 1e-3);
}

#[test]
fn normals_stay_unit_or_zero() {
    let mut engine = make_engine(PageScene::Home);
    let inputs = SceneInputs::for_scene(PageScene::About);
    for n in 0..8 {
        engine.frame(&inputs, Vec2::new(0.3, -0.2), FrameClock::fixed(n, 60.0));
    }
    for n in engine.normals() {
        let len = n.length();
        assert!(len == 0.0 || (len - 1.0).abs() < 1e-3);
    }
}

#[test]
fn zero_sized_viewport_still_draws_finite_frames() {
    let mut engine = make_engine(PageScene::Home);
    engine.set_viewport(0, 0);
    let inputs = SceneInputs::for_scene(PageScene::Home);
    for n in 0..3 {
        engine.frame(&inputs, Vec2::ZERO, FrameClock::fixed(n, 60.0));
    }
    let snap = engine.snapshot();
    assert!(snap.visual.aspect > 0.0 && snap.visual.aspect.is_finite());
    let m = snap.camera.projection_matrix() * snap.camera.view_matrix();
    assert!(m.is_finite());
}
