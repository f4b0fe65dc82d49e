//! Per-frame driver for the background scene.
//!
//! Each frame the engine resolves targets from the current page, eases every
//! visual parameter towards them, places the camera and morphs every vertex
//! of the core mesh. The output is read through [`FrameSnapshot`].

use crate::camera::{viewport_aspect, Camera};
use crate::constants::*;
use crate::geometry::{recompute_flat_normals, IcosphereMesh};
use crate::layouts::VertexLayoutSet;
use crate::noise::SimplexNoise;
use crate::registry::{
    camera_anchor, emissive_pulse, key_intensity, palette, pointer_influence, rim_intensity,
    vertex_ease,
};
use crate::scene::{PageScene, SceneMetrics, TransitionPhase};
use crate::smoothing::{approach, approach_vec3, SmoothingMode};
use crate::store::SceneInputs;
use glam::{Vec2, Vec3};
use instant::Instant;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub smoothing: SmoothingMode,
    /// Fixed seed for layout, noise and decor generation; `None` draws one.
    pub seed: Option<u64>,
    pub detail: u32,
    /// Normals are recomputed on every n-th drawn frame.
    pub normal_interval: u32,
    /// Star field spin per frame around (x, y), radians.
    pub star_spin: Vec2,
    /// Upper bound on the device pixel ratio used for the backing store.
    pub pixel_ratio_cap: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingMode::PerFrame,
            seed: None,
            detail: CORE_DETAIL,
            normal_interval: 2,
            star_spin: Vec2::new(0.0003, 0.00045),
            pixel_ratio_cap: 1.2,
        }
    }
}

/// Time sample for one frame, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    pub elapsed: f32,
    pub dt: f32,
}

impl FrameClock {
    /// Frame `n` of a fixed-rate simulation.
    pub fn fixed(n: u32, hz: f32) -> Self {
        Self {
            elapsed: n as f32 / hz,
            dt: 1.0 / hz,
        }
    }
}

/// Wall clock producing [`FrameClock`] samples.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameClock {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        FrameClock {
            elapsed: (now - self.start).as_secs_f32(),
            dt,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Current (not target) values of everything the renderer draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    pub core_color: Vec3,
    pub emissive_color: Vec3,
    pub emissive_intensity: f32,
    pub transmission: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub key_color: Vec3,
    pub key_intensity: f32,
    pub rim_color: Vec3,
    pub rim_intensity: f32,
    pub background: Vec3,
    pub fog_color: Vec3,
    pub fog_density: f32,
    /// Smoothed goal the camera chases.
    pub camera_goal: Vec3,
    pub camera_position: Vec3,
    pub look_at: Vec3,
    pub grid_visible: bool,
    pub grid_opacity: f32,
    pub portal_alpha: f32,
    pub portal_scale: f32,
    pub star_size: f32,
    pub star_opacity: f32,
    pub star_rotation: Vec2,
    pub stick_intensity: f32,
    pub time: f32,
    pub aspect: f32,
}

#[derive(Clone, Copy, Debug)]
struct PaletteTargets {
    base: Vec3,
    emissive: Vec3,
    key: Vec3,
    rim: Vec3,
    background: Vec3,
    fog_density: f32,
}

/// Where the metric-driven decor is heading this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricTargets {
    pub star_size: f32,
    pub star_opacity: f32,
    pub stick_intensity: f32,
}

/// Metrics are clamped before the affine maps, so out-of-range input can
/// never push a target past its designed ceiling.
pub fn metric_targets(metrics: &SceneMetrics, phase: TransitionPhase) -> MetricTargets {
    let m = metrics.normalized();
    let pre = if phase == TransitionPhase::Pre {
        STICK_PRE_BONUS
    } else {
        0.0
    };
    MetricTargets {
        star_size: STAR_SIZE_BASE + m.projects * STAR_SIZE_SPAN,
        star_opacity: STAR_OPACITY_BASE + m.outreach * STAR_OPACITY_SPAN,
        stick_intensity: STICK_INTENSITY_BASE + m.collaboration * STICK_INTENSITY_SPAN + pre,
    }
}

/// Bounded high-frequency camera shake, one amplitude per axis.
pub fn camera_jitter(t: f32) -> Vec3 {
    let j = JITTER_AMPLITUDE;
    Vec3::new(
        (t * 56.0).sin() * j,
        (t * 48.0).cos() * j * 0.9,
        (t * 40.0).sin() * j * 0.5,
    )
}

pub fn look_at_jitter(t: f32) -> Vec3 {
    let j = JITTER_AMPLITUDE;
    Vec3::new((t * 36.0).sin() * j, (t * 32.0).cos() * j * 0.8, 0.0)
}

/// Time-dependent signals shared by all vertices of one frame.
#[derive(Clone, Copy, Debug)]
pub struct DeformClock {
    pub time: f32,
    pulse: f32,
    flow: f32,
}

impl DeformClock {
    pub fn at(time: f32) -> Self {
        Self {
            time,
            pulse: 0.25 + (time * 0.8).sin() * 0.1,
            flow: (time * 0.35).sin() * 0.5,
        }
    }
}

/// Immutable inputs of the vertex state machine.
pub struct CoreShape {
    pub base: IcosphereMesh,
    pub layouts: VertexLayoutSet,
    noise: SimplexNoise,
}

impl CoreShape {
    pub fn new<R: Rng + ?Sized>(detail: u32, rng: &mut R) -> Self {
        let base = IcosphereMesh::new(CORE_RADIUS, detail);
        let layouts = VertexLayoutSet::generate(&base.positions, &base.normals, rng);
        let noise = SimplexNoise::new(rng);
        Self {
            base,
            layouts,
            noise,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.base.vertex_count()
    }

    /// Where vertex `i` wants to be on `scene` at this instant.
    pub fn target(&self, scene: PageScene, i: usize, clock: &DeformClock) -> Vec3 {
        let t = clock.time;
        let seed = self.layouts.seeds[i];
        match scene {
            PageScene::Home => self.organic(self.base.positions[i], clock),
            PageScene::About => {
                let drift = (t * 0.8 + seed).sin() * 0.65;
                self.layouts.fragment[i] + self.base.normals[i] * FRAGMENT_DRIFT * drift
            }
            PageScene::Projects => {
                let l = self.layouts.lattice[i];
                Vec3::new(
                    l.x + (t * 1.1 + seed).sin() * 0.32,
                    l.y + (t * 1.6 + self.layouts.angles[i] * 2.4).sin() * 0.7,
                    l.z + (t * 1.05 + seed).cos() * 0.32,
                )
            }
            PageScene::Contact => {
                let p = self.layouts.portal[i];
                Vec3::new(
                    p.x + (t * 0.7 + seed).cos() * 0.28,
                    p.y + (t * 1.2 + seed).sin() * 0.35,
                    p.z + (t * 0.9 + seed).sin() * 0.24,
                )
            }
        }
    }

    fn organic(&self, b: Vec3, clock: &DeformClock) -> Vec3 {
        let f = NOISE_FREQUENCY;
        let primary = self
            .noise
            .noise4d(b.x * f, b.y * f, b.z * f, clock.time * 0.55);
        let f2 = f * 0.7;
        let secondary = self.noise.noise4d(
            (b.x + 12.0) * f2,
            (b.y - 18.0) * f2,
            (b.z + 6.0) * f2,
            clock.time * 0.92,
        );
        let displacement = 1.0 + primary * (0.38 + clock.pulse) + secondary * 0.22;
        let swirl = clock.flow * 0.18;
        let target = Vec3::new(
            b.x * displacement + (-b.y * swirl + primary * 0.22),
            b.y * displacement + (b.x * swirl + secondary * 0.2),
            b.z * displacement + (primary - secondary) * 0.16,
        );
        target.clamp_length_max(ORGANIC_MAX_RADIUS)
    }
}

/// Borrowed view of one finished frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameSnapshot<'a> {
    pub scene: PageScene,
    pub phase: TransitionPhase,
    pub visual: &'a VisualState,
    pub camera: Camera,
    pub positions: &'a [Vec3],
    pub normals: &'a [Vec3],
}

pub struct SceneEngine {
    config: EngineConfig,
    shape: CoreShape,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    visual: VisualState,
    targets: PaletteTargets,
    previous_scene: PageScene,
    phase: TransitionPhase,
    frames: u64,
}

impl SceneEngine {
    pub fn new<R: Rng + ?Sized>(config: EngineConfig, initial: &SceneInputs, rng: &mut R) -> Self {
        let shape = CoreShape::new(config.detail, rng);
        let scene = initial.scene;
        let pal = palette(scene);
        let anchor = camera_anchor(scene);
        let visual = VisualState {
            core_color: pal.base,
            emissive_color: pal.emissive,
            emissive_intensity: 0.36,
            transmission: pal.transmission,
            metalness: pal.metalness,
            roughness: pal.roughness,
            key_color: pal.key,
            key_intensity: INITIAL_KEY_INTENSITY,
            rim_color: pal.rim,
            rim_intensity: INITIAL_RIM_INTENSITY,
            background: pal.background,
            fog_color: pal.background,
            fog_density: pal.fog_density,
            camera_goal: anchor.position,
            camera_position: anchor.position,
            look_at: anchor.look_at,
            grid_visible: false,
            grid_opacity: 0.0,
            portal_alpha: 0.0,
            portal_scale: PORTAL_SCALE_MIN,
            star_size: INITIAL_STAR_SIZE,
            star_opacity: INITIAL_STAR_OPACITY,
            star_rotation: Vec2::ZERO,
            stick_intensity: INITIAL_STICK_INTENSITY,
            time: 0.0,
            aspect: 1.0,
        };
        let positions = shape.base.positions.clone();
        let normals = shape.base.normals.clone();
        log::debug!(
            "[engine] core vertices={} scene={}",
            positions.len(),
            scene
        );
        Self {
            config,
            shape,
            positions,
            normals,
            visual,
            targets: palette_targets(scene),
            previous_scene: scene,
            phase: initial.phase,
            frames: 0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.visual.aspect = viewport_aspect(width, height);
    }

    /// Advance one frame. `pointer` is in normalized device coordinates with
    /// y growing downwards.
    pub fn frame(&mut self, inputs: &SceneInputs, pointer: Vec2, clock: FrameClock) {
        let scene = inputs.scene;
        let mode = self.config.smoothing;
        let f = |rate: f32| mode.factor(rate, clock.dt);
        self.phase = inputs.phase;
        self.visual.time = clock.elapsed;

        self.resolve_targets(scene);
        self.smooth_palette(scene, &f);
        self.update_overlays(scene, &f);
        self.place_camera(scene, inputs.phase, pointer, clock.elapsed, &f);
        self.deform(scene, clock.elapsed, f(vertex_ease(scene)));

        if self.frames % self.config.normal_interval.max(1) as u64 == 0 {
            recompute_flat_normals(&self.positions, &mut self.normals);
        }
        self.frames += 1;

        let (emi_base, emi_amp) = emissive_pulse(scene);
        self.visual.emissive_intensity = emi_base + (clock.elapsed * 0.6).sin() * emi_amp;

        let m = metric_targets(&inputs.metrics, inputs.phase);
        let v = &mut self.visual;
        v.star_size = approach(v.star_size, m.star_size, f(STAR_RATE));
        v.star_opacity = approach(v.star_opacity, m.star_opacity, f(STAR_RATE));
        v.stick_intensity = approach(v.stick_intensity, m.stick_intensity, f(STICK_RATE));
        v.star_rotation += self.config.star_spin * mode.frame_scale(clock.dt);
    }

    fn resolve_targets(&mut self, scene: PageScene) {
        if scene == self.previous_scene {
            return;
        }
        log::info!("[engine] scene {} -> {}", self.previous_scene, scene);
        self.targets = palette_targets(scene);
        // Material scalars snap; colours ease.
        let pal = palette(scene);
        self.visual.transmission = pal.transmission;
        self.visual.metalness = pal.metalness;
        self.visual.roughness = pal.roughness;
        self.previous_scene = scene;
    }

    fn smooth_palette(&mut self, scene: PageScene, f: &impl Fn(f32) -> f32) {
        let t = self.targets;
        let v = &mut self.visual;
        v.core_color = approach_vec3(v.core_color, t.base, f(CORE_COLOR_RATE));
        v.emissive_color = approach_vec3(v.emissive_color, t.emissive, f(EMISSIVE_COLOR_RATE));
        v.key_color = approach_vec3(v.key_color, t.key, f(LIGHT_COLOR_RATE));
        v.rim_color = approach_vec3(v.rim_color, t.rim, f(LIGHT_COLOR_RATE));
        v.key_intensity = approach(v.key_intensity, key_intensity(scene), f(LIGHT_INTENSITY_RATE));
        v.rim_intensity = approach(v.rim_intensity, rim_intensity(scene), f(LIGHT_INTENSITY_RATE));
        v.background = approach_vec3(v.background, t.background, f(BACKGROUND_RATE));
        v.fog_color = approach_vec3(v.fog_color, v.background, f(FOG_COLOR_RATE));
        v.fog_density = approach(v.fog_density, t.fog_density, f(FOG_DENSITY_RATE));
    }

    fn update_overlays(&mut self, scene: PageScene, f: &impl Fn(f32) -> f32) {
        let v = &mut self.visual;
        let projects = scene == PageScene::Projects;
        let contact = scene == PageScene::Contact;
        v.grid_visible = projects;
        let grid_goal = if projects { GRID_OPACITY_MAX } else { 0.0 };
        v.grid_opacity = approach(v.grid_opacity, grid_goal, f(GRID_RATE));
        let alpha_goal = if contact { PORTAL_ALPHA_MAX } else { 0.0 };
        v.portal_alpha = approach(v.portal_alpha, alpha_goal, f(PORTAL_ALPHA_RATE));
        let scale_goal = if contact { 1.0 } else { PORTAL_SCALE_MIN };
        v.portal_scale = approach(v.portal_scale, scale_goal, f(PORTAL_SCALE_RATE));
    }

    fn place_camera(
        &mut self,
        scene: PageScene,
        phase: TransitionPhase,
        pointer: Vec2,
        t: f32,
        f: &impl Fn(f32) -> f32,
    ) {
        let anchor = camera_anchor(scene);
        let influence = pointer_influence(scene);
        let shaking = phase == TransitionPhase::Pre;

        let mut goal = anchor.position
            + Vec3::new(
                pointer.x * influence,
                -pointer.y * influence * POINTER_Y_INFLUENCE,
                -pointer.y * POINTER_Z_PUSH,
            );
        if shaking {
            goal += camera_jitter(t);
        }
        let mut look = anchor.look_at
            + Vec3::new(pointer.x * LOOK_AT_POINTER, -pointer.y * LOOK_AT_POINTER, 0.0);
        if shaking {
            look += look_at_jitter(t);
        }

        let v = &mut self.visual;
        v.camera_goal = approach_vec3(v.camera_goal, goal, f(CAMERA_TARGET_RATE));
        v.camera_position = approach_vec3(v.camera_position, v.camera_goal, f(CAMERA_RATE));
        v.look_at = approach_vec3(v.look_at, look, f(LOOK_AT_RATE));
    }

    fn deform(&mut self, scene: PageScene, t: f32, ease: f32) {
        let clock = DeformClock::at(t);
        for (i, p) in self.positions.iter_mut().enumerate() {
            let target = self.shape.target(scene, i, &clock);
            *p = approach_vec3(*p, target, ease);
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            scene: self.previous_scene,
            phase: self.phase,
            visual: &self.visual,
            camera: Camera::new(
                self.visual.camera_position,
                self.visual.look_at,
                self.visual.aspect,
            ),
            positions: &self.positions,
            normals: &self.normals,
        }
    }

    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn shape(&self) -> &CoreShape {
        &self.shape
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

fn palette_targets(scene: PageScene) -> PaletteTargets {
    let p = palette(scene);
    PaletteTargets {
        base: p.base,
        emissive: p.emissive,
        key: p.key,
        rim: p.rim,
        background: p.background,
        fog_density: p.fog_density,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_never_exceeds_amplitude() {
        for n in 0..5000 {
            let j = camera_jitter(n as f32 * 0.0037);
            assert!(j.abs().max_element() <= JITTER_AMPLITUDE);
        }
    }

    #[test]
    fn metric_targets_hit_designed_range() {
        let low = metric_targets(
            &SceneMetrics {
                project_count: 0.0,
                collaboration_factor: 0.0,
                outreach_level: 0.0,
            },
            TransitionPhase::Idle,
        );
        assert!((low.star_size - 0.07).abs() < 1e-6);
        assert!((low.star_opacity - 0.55).abs() < 1e-6);
        assert!((low.stick_intensity - 0.28).abs() < 1e-6);
    }
}
