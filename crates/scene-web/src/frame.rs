use crate::constants::MAX_FRAME_DT_SEC;
use crate::dom;
use crate::render::GpuState;
use instant::Instant;
use scene_core::{Choreographer, Clock, PageScene, SceneStore, SceneView};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub type SharedView = Rc<RefCell<SceneView<GpuState>>>;
pub type RouteCallback = Rc<RefCell<Option<js_sys::Function>>>;

/// Milliseconds since `epoch`; the time base of the choreographer.
#[inline]
pub fn elapsed_ms(epoch: Instant) -> f64 {
    epoch.elapsed().as_secs_f64() * 1000.0
}

/// Hand a due route to the page. The callback is cloned out first so it may
/// freely call back into the handle.
pub fn notify_route(on_route: &RouteCallback, scene: PageScene) {
    let callback = on_route.borrow().clone();
    match callback {
        Some(f) => {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(scene.path())) {
                log::warn!("[route] callback failed: {:?}", e);
            }
        }
        None => log::debug!("[route] {} due with no listener", scene.path()),
    }
}

/// State touched by one animation-frame callback.
pub struct FrameContext {
    pub view: SharedView,
    pub store: SceneStore,
    pub choreo: Rc<RefCell<Choreographer>>,
    pub on_route: RouteCallback,
    pub epoch: Instant,
    pub document: web::Document,
    pub clock: Clock,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let due = self
            .choreo
            .borrow_mut()
            .poll(&self.store, elapsed_ms(self.epoch));
        if let Some(scene) = due {
            notify_route(&self.on_route, scene);
        }

        let mut clock = self.clock.tick();
        clock.dt = clock.dt.min(MAX_FRAME_DT_SEC);
        let visible = dom::page_visible(&self.document);
        if let Err(e) = self.view.borrow_mut().tick(clock, visible) {
            log::error!("[frame] {e}");
        }
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame loop. `stop` cancels the pending frame and frees the
/// callback on the next microtask, so it is safe to call from inside a frame.
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    slot: FrameSlot,
}

impl FrameLoop {
    pub fn start(mut ctx: FrameContext) -> Self {
        let running = Rc::new(Cell::new(true));
        let raf_id = Rc::new(Cell::new(None::<i32>));
        let slot: FrameSlot = Rc::new(RefCell::new(None));

        let running_tick = running.clone();
        let raf_tick = raf_id.clone();
        let slot_tick = slot.clone();
        *slot.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            raf_tick.set(None);
            if !running_tick.get() {
                return;
            }
            ctx.frame();
            if running_tick.get() {
                raf_tick.set(request_frame(&slot_tick));
            }
        }) as Box<dyn FnMut()>));
        raf_id.set(request_frame(&slot));

        Self {
            running,
            raf_id,
            slot,
        }
    }

    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        let slot = self.slot.clone();
        spawn_local(async move {
            slot.borrow_mut().take();
        });
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(slot: &FrameSlot) -> Option<i32> {
    let window = web::window()?;
    let slot = slot.borrow();
    let cb = slot.as_ref()?;
    window
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .ok()
}
