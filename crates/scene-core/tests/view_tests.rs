// Host-side tests for the mount lifecycle using a backend that counts the
// resources it holds.

use glam::Vec2;
use scene_core::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Counters {
    created: Cell<usize>,
    released: Cell<usize>,
    draws: Cell<usize>,
    resizes: Cell<usize>,
}

struct CountingBackend {
    counters: Rc<Counters>,
    handles: usize,
    fail_upload: bool,
}

impl RenderBackend for CountingBackend {
    type Error = String;

    fn upload(&mut self, scene: &StaticScene) -> Result<(), String> {
        // core positions, core normals, stars, sticks, grid, portal, uniforms
        self.handles = 7;
        assert!(!scene.stars.is_empty());
        assert_eq!(scene.core_vertex_count, 960);
        if self.fail_upload {
            return Err("out of memory".into());
        }
        Ok(())
    }

    fn resize(&mut self, _width: u32, _height: u32) {
        self.counters.resizes.set(self.counters.resizes.get() + 1);
    }

    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), String> {
        assert_eq!(frame.positions.len(), frame.normals.len());
        self.counters.draws.set(self.counters.draws.get() + 1);
        Ok(())
    }

    fn release(&mut self) {
        self.handles = 0;
        self.counters.released.set(self.counters.released.get() + 1);
    }

    fn live_handles(&self) -> usize {
        self.handles
    }
}

fn supported() -> Environment {
    Environment {
        graphics_available: true,
        reduced_motion: false,
    }
}

fn viewport() -> Viewport {
    Viewport {
        width: 1280,
        height: 720,
        window_min_side: 720.0,
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        seed: Some(9),
        ..EngineConfig::default()
    }
}

fn mount_with(
    counters: &Rc<Counters>,
    env: Environment,
    fail_upload: bool,
) -> SceneResult<SceneView<CountingBackend>> {
    let counters = counters.clone();
    SceneView::mount(
        env,
        SceneStore::new(SceneInputs::for_scene(PageScene::Home)),
        config(),
        viewport(),
        move || {
            counters.created.set(counters.created.get() + 1);
            Ok::<_, String>(CountingBackend {
                counters,
                handles: 0,
                fail_upload,
            })
        },
    )
}

#[test]
fn unmount_releases_everything_once() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    let mut view = mount_with(&counters, supported(), false)?;
    assert_eq!(view.backend().live_handles(), 7);
    for n in 0..5 {
        assert_eq!(
            view.tick(FrameClock::fixed(n, 60.0), true)?,
            TickOutcome::Drawn
        );
    }
    view.unmount();
    view.unmount();
    assert_eq!(view.backend().live_handles(), 0);
    assert!(!view.is_mounted());
    drop(view);
    assert_eq!(counters.released.get(), 1);
    assert_eq!(counters.draws.get(), 5);
    Ok(())
}

#[test]
fn dropping_a_mounted_view_releases() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    {
        let _view = mount_with(&counters, supported(), false)?;
    }
    assert_eq!(counters.created.get(), 1);
    assert_eq!(counters.released.get(), 1);
    Ok(())
}

#[test]
fn repeated_mounts_do_not_leak() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    for _ in 0..10 {
        let mut view = mount_with(&counters, supported(), false)?;
        view.tick(FrameClock::fixed(0, 60.0), true)?;
        view.unmount();
        assert_eq!(view.backend().live_handles(), 0);
    }
    assert_eq!(counters.created.get(), counters.released.get());
    Ok(())
}

#[test]
fn unsupported_environment_never_builds_a_backend() {
    let counters = Rc::new(Counters::default());
    for env in [
        Environment {
            graphics_available: false,
            reduced_motion: false,
        },
        Environment {
            graphics_available: true,
            reduced_motion: true,
        },
    ] {
        let result = mount_with(&counters, env, false);
        assert!(matches!(result, Err(SceneError::Unsupported(_))));
    }
    assert_eq!(counters.created.get(), 0);
}

#[test]
fn unsupported_hosts_get_an_inert_mount() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    let no_gpu = Environment {
        graphics_available: false,
        reduced_motion: false,
    };
    assert!(mount_or_inert(mount_with(&counters, no_gpu, false))?.is_none());

    // Environment check passed but no adapter or device came back.
    let no_adapter: SceneResult<()> = Err(SceneError::Unsupported("no usable WebGPU adapter or device"));
    assert!(mount_or_inert(no_adapter)?.is_none());

    assert!(matches!(
        mount_or_inert(mount_with(&counters, supported(), true)),
        Err(SceneError::Backend(_))
    ));
    let view = mount_or_inert(mount_with(&counters, supported(), false))?;
    assert!(view.is_some_and(|v| v.is_mounted()));
    assert_eq!(counters.created.get(), counters.released.get());
    Ok(())
}

#[test]
fn failed_upload_releases_partial_resources() {
    let counters = Rc::new(Counters::default());
    let result = mount_with(&counters, supported(), true);
    assert!(matches!(result, Err(SceneError::Backend(_))));
    assert_eq!(counters.released.get(), 1);
}

#[test]
fn hidden_or_unmounted_ticks_are_skipped() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    let mut view = mount_with(&counters, supported(), false)?;
    assert_eq!(
        view.tick(FrameClock::fixed(0, 60.0), false)?,
        TickOutcome::Skipped
    );
    assert_eq!(view.engine().frames_drawn(), 0);
    assert_eq!(
        view.tick(FrameClock::fixed(1, 60.0), true)?,
        TickOutcome::Drawn
    );
    assert_eq!(view.engine().frames_drawn(), 1);
    view.unmount();
    assert_eq!(
        view.tick(FrameClock::fixed(2, 60.0), true)?,
        TickOutcome::Skipped
    );
    assert_eq!(counters.draws.get(), 1);
    Ok(())
}

#[test]
fn zero_sized_resize_is_ignored() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    let mut view = mount_with(&counters, supported(), false)?;
    let after_mount = counters.resizes.get();
    assert_eq!(after_mount, 0);
    view.resize(0, 400);
    view.resize(800, 0);
    assert_eq!(counters.resizes.get(), after_mount);
    view.resize(800, 600);
    assert_eq!(counters.resizes.get(), after_mount + 1);
    Ok(())
}

#[test]
fn store_writes_reach_the_next_frame() -> SceneResult<()> {
    let counters = Rc::new(Counters::default());
    let mut view = mount_with(&counters, supported(), false)?;
    view.store().set_scene(PageScene::Contact);
    view.set_pointer(Vec2::new(4.0, -4.0));
    for n in 0..240 {
        view.tick(FrameClock::fixed(n, 60.0), true)?;
    }
    let v = view.engine().visual();
    assert!(v.portal_alpha > PORTAL_ALPHA_MAX * 0.9);
    assert!(v.portal_scale > 0.9);
    Ok(())
}
