//! Page transition timing: decides when the camera shake starts, when the
//! route change is due and when the phase settles back to idle.
//!
//! Times are milliseconds on any monotonic clock the host chooses.

use crate::scene::{PageScene, SceneMetrics, TransitionPhase};
use crate::store::SceneStore;

pub const PRE_TO_BLAST_MS: f64 = 800.0;
pub const DEFAULT_ROUTE_DELAY_MS: f64 = 700.0;
pub const SETTLE_TO_IDLE_MS: f64 = 350.0;

/// Pages ranked by visual weight; moving to a lower rank plays the shake.
pub fn scene_rank(scene: PageScene) -> u8 {
    match scene {
        PageScene::Home => 4,
        PageScene::Projects => 3,
        PageScene::Contact => 2,
        PageScene::About => 1,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Navigation {
    /// Route change can happen right away.
    Immediate,
    /// Route change is held back; [`Choreographer::poll`] returns it once due.
    Deferred { at_ms: f64 },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Choreographer {
    blast_at: Option<f64>,
    route_at: Option<(f64, PageScene)>,
    idle_at: Option<f64>,
}

impl Choreographer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a navigation towards `next`. A negative delay is treated as 0.
    /// Every request, immediate ones included, drops the pending blast and
    /// route.
    pub fn request(
        &mut self,
        store: &SceneStore,
        next: PageScene,
        now_ms: f64,
        delay_ms: Option<f64>,
    ) -> Navigation {
        let current = store.snapshot().scene;
        self.blast_at = None;
        self.route_at = None;
        if scene_rank(next) >= scene_rank(current) {
            return Navigation::Immediate;
        }
        store.set_phase(TransitionPhase::Pre);
        self.blast_at = Some(now_ms + PRE_TO_BLAST_MS);
        let at_ms = now_ms + delay_ms.unwrap_or(DEFAULT_ROUTE_DELAY_MS).max(0.0);
        self.route_at = Some((at_ms, next));
        log::info!("[choreo] {current} -> {next}: pre, route in {:.0}ms", at_ms - now_ms);
        Navigation::Deferred { at_ms }
    }

    /// The host has switched pages: publish the scene and its metric preset,
    /// and let the phase settle shortly after.
    pub fn arrive(&mut self, store: &SceneStore, scene: PageScene, now_ms: f64) {
        store.set_scene(scene);
        store.replace_metrics(SceneMetrics::preset(scene));
        self.idle_at = Some(now_ms + SETTLE_TO_IDLE_MS);
    }

    /// Fire due timers. Returns the scene whose route is now due, once.
    pub fn poll(&mut self, store: &SceneStore, now_ms: f64) -> Option<PageScene> {
        if let Some(at) = self.blast_at {
            if now_ms >= at {
                self.blast_at = None;
                store.set_phase(TransitionPhase::Blast);
            }
        }
        if let Some(at) = self.idle_at {
            if now_ms >= at {
                self.idle_at = None;
                // a blast that has not fired yet would otherwise stick
                self.blast_at = None;
                store.set_phase(TransitionPhase::Idle);
            }
        }
        match self.route_at {
            Some((at, scene)) if now_ms >= at => {
                self.route_at = None;
                Some(scene)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.blast_at.is_some() || self.route_at.is_some() || self.idle_at.is_some()
    }
}
