//! Shared handle to the engine inputs.
//!
//! Writers (pages, the navigation controller) and the render loop hold
//! clones of the same [`SceneStore`]. The loop reads one [`SceneInputs`]
//! snapshot per frame, so the last write before a frame wins.

use crate::scene::{MetricsPatch, PageScene, SceneMetrics, TransitionPhase};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneInputs {
    pub scene: PageScene,
    pub phase: TransitionPhase,
    pub metrics: SceneMetrics,
}

impl SceneInputs {
    /// Inputs for a freshly loaded page: its scene, its metric preset, idle.
    pub fn for_scene(scene: PageScene) -> Self {
        Self {
            scene,
            phase: TransitionPhase::Idle,
            metrics: SceneMetrics::preset(scene),
        }
    }
}

/// Bitwise on the metrics so a NaN compares equal to itself and no-op
/// writes never bump the revision.
fn same_inputs(a: &SceneInputs, b: &SceneInputs) -> bool {
    let bits = |m: &SceneMetrics| {
        [
            m.project_count.to_bits(),
            m.collaboration_factor.to_bits(),
            m.outreach_level.to_bits(),
        ]
    };
    a.scene == b.scene && a.phase == b.phase && bits(&a.metrics) == bits(&b.metrics)
}

#[derive(Debug, Default)]
struct StoreInner {
    inputs: SceneInputs,
    revision: u64,
}

/// Single-threaded observable store; clones share state.
#[derive(Clone, Debug, Default)]
pub struct SceneStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl SceneStore {
    pub fn new(inputs: SceneInputs) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                inputs,
                revision: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> SceneInputs {
        self.inner.borrow().inputs
    }

    /// Bumped on every write that changed a value.
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    pub fn set_scene(&self, scene: PageScene) {
        self.update(|i| i.scene = scene);
    }

    pub fn set_phase(&self, phase: TransitionPhase) {
        self.update(|i| i.phase = phase);
    }

    pub fn merge_metrics(&self, patch: MetricsPatch) {
        self.update(|i| i.metrics.merge(patch));
    }

    pub fn replace_metrics(&self, metrics: SceneMetrics) {
        self.update(|i| i.metrics = metrics);
    }

    fn update(&self, f: impl FnOnce(&mut SceneInputs)) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.inputs;
        f(&mut inner.inputs);
        if !same_inputs(&inner.inputs, &before) {
            inner.revision += 1;
            log::debug!(
                "[store] rev={} scene={} phase={}",
                inner.revision,
                inner.inputs.scene,
                inner.inputs.phase
            );
        }
    }
}
