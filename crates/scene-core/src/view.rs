//! Mounted scene: owns the engine plus one render backend and guarantees the
//! backend's resources are released exactly once.

use crate::decor::{
    grid_lines, star_count, PortalDisc, StarField, StaticScene, StickField, PORTAL_DISC_RADIUS,
    PORTAL_SEGMENTS,
};
use crate::engine::{EngineConfig, FrameClock, FrameSnapshot, SceneEngine};
use crate::error::{SceneError, SceneResult};
use crate::store::SceneStore;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Debug;

/// Host capabilities probed before anything is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Environment {
    pub graphics_available: bool,
    pub reduced_motion: bool,
}

impl Environment {
    /// Mounting only proceeds when graphics exist and the user has not asked
    /// for reduced motion.
    pub fn check(&self) -> SceneResult<()> {
        if !self.graphics_available {
            return Err(SceneError::Unsupported("graphics context unavailable"));
        }
        if self.reduced_motion {
            return Err(SceneError::Unsupported("reduced motion requested"));
        }
        Ok(())
    }
}

/// Host-side mount policy: an unsupported environment (failed check, or no
/// usable adapter) yields `Ok(None)` so the page keeps an inert handle.
/// Any other error is a real failure.
pub fn mount_or_inert<T>(result: SceneResult<T>) -> SceneResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(SceneError::Unsupported(why)) => {
            log::info!("[view] {why}; rendering nothing");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// GPU (or test) side of a mounted scene.
pub trait RenderBackend {
    type Error: Debug;

    /// Allocate buffers for the static decor and the core mesh.
    fn upload(&mut self, scene: &StaticScene) -> Result<(), Self::Error>;
    fn resize(&mut self, width: u32, height: u32);
    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), Self::Error>;
    /// Free every resource. Called at most once per backend.
    fn release(&mut self);
    /// Resources currently held; zero after `release`.
    fn live_handles(&self) -> usize;
}

/// Container size in CSS pixels plus the smaller window side, which picks
/// the star density. Only the engine sees these units; the backend is sized
/// in device pixels through [`SceneView::resize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub window_min_side: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Page hidden or view unmounted; nothing advanced.
    Skipped,
    Drawn,
}

pub struct SceneView<B: RenderBackend> {
    store: SceneStore,
    engine: SceneEngine,
    backend: B,
    pointer: Vec2,
    mounted: bool,
}

impl<B: RenderBackend> SceneView<B> {
    /// The environment is checked before `make_backend` runs, so an
    /// unsupported host never allocates anything.
    pub fn mount<E: Debug>(
        env: Environment,
        store: SceneStore,
        config: EngineConfig,
        viewport: Viewport,
        make_backend: impl FnOnce() -> Result<B, E>,
    ) -> SceneResult<Self> {
        env.check()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let inputs = store.snapshot();
        let mut engine = SceneEngine::new(config, &inputs, &mut rng);
        engine.set_viewport(viewport.width, viewport.height);

        let stars = star_count(
            Vec2::new(viewport.width as f32, viewport.height as f32),
            viewport.window_min_side,
        );
        let decor = StaticScene {
            core_vertex_count: engine.positions().len(),
            stars: StarField::generate(stars, &mut rng),
            sticks: StickField::generate(&mut rng),
            grid: grid_lines(),
            portal: PortalDisc::new(PORTAL_DISC_RADIUS, PORTAL_SEGMENTS),
        };

        let mut backend =
            make_backend().map_err(|e| SceneError::Backend(format!("{e:?}")))?;
        if let Err(e) = backend.upload(&decor) {
            backend.release();
            return Err(SceneError::Backend(format!("{e:?}")));
        }
        log::info!(
            "[view] mounted scene={} stars={} vertices={}",
            inputs.scene,
            stars,
            decor.core_vertex_count
        );

        Ok(Self {
            store,
            engine,
            backend,
            pointer: Vec2::ZERO,
            mounted: true,
        })
    }

    /// Advance and draw one frame unless hidden or unmounted.
    pub fn tick(&mut self, clock: FrameClock, visible: bool) -> SceneResult<TickOutcome> {
        if !self.mounted || !visible {
            return Ok(TickOutcome::Skipped);
        }
        let inputs = self.store.snapshot();
        self.engine.frame(&inputs, self.pointer, clock);
        self.backend
            .draw(&self.engine.snapshot())
            .map_err(|e| SceneError::Backend(format!("{e:?}")))?;
        Ok(TickOutcome::Drawn)
    }

    /// Pointer in normalized device coordinates, y downwards.
    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Zero-sized containers are ignored rather than producing a
    /// degenerate projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.mounted || width == 0 || height == 0 {
            return;
        }
        self.engine.set_viewport(width, height);
        self.backend.resize(width, height);
    }

    /// Release every backend resource. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.backend.release();
        log::info!("[view] unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn engine(&self) -> &SceneEngine {
        &self.engine
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: RenderBackend> Drop for SceneView<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduced_motion_refuses_mount() {
        let env = Environment {
            graphics_available: true,
            reduced_motion: true,
        };
        assert!(matches!(env.check(), Err(SceneError::Unsupported(_))));
    }

    #[test]
    fn missing_graphics_refuses_mount() {
        let env = Environment {
            graphics_available: false,
            reduced_motion: false,
        };
        assert!(env.check().is_err());
    }
}
