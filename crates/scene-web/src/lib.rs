#![cfg(target_arch = "wasm32")]
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod render;

use anyhow::anyhow;
use events::ListenerSet;
use frame::{FrameContext, FrameLoop, RouteCallback, SharedView};
use instant::Instant;
use render::GpuState;
use scene_core::{
    mount_or_inert, Choreographer, Clock, EngineConfig, MetricsPatch, Navigation, PageScene,
    SceneError, SceneInputs, SceneMetrics, SceneStore, SceneView, TransitionPhase,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scene-web loaded");
    Ok(())
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

/// Live pieces of a mounted background; torn down together.
struct Mounted {
    view: SharedView,
    frame_loop: FrameLoop,
    listeners: ListenerSet,
    canvas: web::HtmlCanvasElement,
}

impl Mounted {
    fn teardown(mut self) {
        self.frame_loop.stop();
        self.listeners.clear();
        self.view.borrow_mut().unmount();
        dom::detach_canvas(&self.canvas);
    }
}

/// Page-facing handle. Store writes are accepted whether or not a view is
/// mounted; an unsupported environment or a failed WebGPU init yields a
/// handle that draws nothing.
#[wasm_bindgen]
pub struct SceneHandle {
    store: SceneStore,
    choreo: Rc<RefCell<Choreographer>>,
    on_route: RouteCallback,
    epoch: Instant,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Mount the background into the element with id `container_id`. The
    /// initial scene comes from the current location path.
    pub async fn mount(container_id: String) -> Result<SceneHandle, JsValue> {
        let (window, _) = dom::window_document().map_err(to_js)?;
        let initial = window
            .location()
            .pathname()
            .map(|p| PageScene::from_path(&p))
            .unwrap_or_default();
        let mut handle = SceneHandle {
            store: SceneStore::new(SceneInputs::for_scene(initial)),
            choreo: Rc::new(RefCell::new(Choreographer::new())),
            on_route: Rc::new(RefCell::new(None)),
            epoch: Instant::now(),
            mounted: None,
        };
        handle.mounted = handle.mount_view(&container_id).await.map_err(|e| {
            log::error!("[mount] {e:#}");
            to_js(e)
        })?;
        Ok(handle)
    }

    #[wasm_bindgen(js_name = setScene)]
    pub fn set_scene(&self, tag: &str) {
        self.store.set_scene(PageScene::from_tag_or_home(tag));
    }

    #[wasm_bindgen(js_name = setPhase)]
    pub fn set_phase(&self, tag: &str) {
        self.store.set_phase(TransitionPhase::from_tag_or_idle(tag));
    }

    /// Update only the metrics that are given.
    #[wasm_bindgen(js_name = mergeMetrics)]
    pub fn merge_metrics(
        &self,
        project_count: Option<f64>,
        collaboration_factor: Option<f64>,
        outreach_level: Option<f64>,
    ) {
        self.store.merge_metrics(MetricsPatch {
            project_count: project_count.map(|v| v as f32),
            collaboration_factor: collaboration_factor.map(|v| v as f32),
            outreach_level: outreach_level.map(|v| v as f32),
        });
    }

    #[wasm_bindgen(js_name = replaceMetrics)]
    pub fn replace_metrics(
        &self,
        project_count: f64,
        collaboration_factor: f64,
        outreach_level: f64,
    ) {
        self.store.replace_metrics(SceneMetrics {
            project_count: project_count as f32,
            collaboration_factor: collaboration_factor as f32,
            outreach_level: outreach_level as f32,
        });
    }

    /// Called with the route path once a deferred navigation is due.
    #[wasm_bindgen(js_name = onRoute)]
    pub fn on_route(&self, callback: Option<js_sys::Function>) {
        *self.on_route.borrow_mut() = callback;
    }

    /// Start a navigation to the scene `tag`. Returns true when the page may
    /// route right away; otherwise the route arrives through `onRoute`.
    pub fn navigate(&self, tag: &str, delay_ms: Option<f64>) -> bool {
        if self.mounted.is_none() {
            return true;
        }
        let next = PageScene::from_tag_or_home(tag);
        let now = frame::elapsed_ms(self.epoch);
        let nav = self
            .choreo
            .borrow_mut()
            .request(&self.store, next, now, delay_ms);
        matches!(nav, Navigation::Immediate)
    }

    /// The page now shows `path`.
    pub fn arrive(&self, path: &str) {
        let scene = PageScene::from_path(path);
        let now = frame::elapsed_ms(self.epoch);
        self.choreo.borrow_mut().arrive(&self.store, scene, now);
    }

    /// Stop the loop, remove listeners and free every GPU resource. Safe to
    /// call more than once.
    pub fn unmount(&mut self) {
        if let Some(m) = self.mounted.take() {
            m.teardown();
        }
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn scene(&self) -> String {
        self.store.snapshot().scene.tag().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.store.snapshot().phase.tag().to_string()
    }
}

impl SceneHandle {
    async fn mount_view(&self, container_id: &str) -> anyhow::Result<Option<Mounted>> {
        let (window, document) = dom::window_document()?;
        let env = dom::probe_environment(&window);
        if mount_or_inert(env.check())?.is_none() {
            return Ok(None);
        }
        let container = dom::container_by_id(&document, container_id)?;
        let config = EngineConfig::default();
        let cap = config.pixel_ratio_cap;

        let canvas = dom::attach_canvas(&document, &container)?;
        dom::sync_canvas_backing_size(&window, &canvas, &container, cap);
        // navigator.gpu can exist without a usable adapter; that is the same
        // unsupported case as the environment check above.
        let gpu = GpuState::new(&canvas).await.map_err(|e| {
            log::warn!("[mount] WebGPU init failed: {e:#}");
            SceneError::Unsupported("no usable WebGPU adapter or device")
        });
        let Some(gpu) = mount_or_inert(gpu)? else {
            dom::detach_canvas(&canvas);
            return Ok(None);
        };
        let viewport = dom::viewport(&window, &container);
        let mut view = match SceneView::mount(env, self.store.clone(), config, viewport, move || {
            Ok::<_, anyhow::Error>(gpu)
        }) {
            Ok(v) => v,
            Err(e) => {
                dom::detach_canvas(&canvas);
                return Err(anyhow!(e));
            }
        };
        let (w_px, h_px) = dom::sync_canvas_backing_size(&window, &canvas, &container, cap);
        view.resize(w_px, h_px);
        let view: SharedView = Rc::new(RefCell::new(view));

        let mut listeners = ListenerSet::new();
        let target: &web::EventTarget = window.as_ref();
        {
            let view = view.clone();
            let container = container.clone();
            listeners.add(target, "pointermove", move |ev: web::Event| {
                if let Some(pe) = ev.dyn_ref::<web::PointerEvent>() {
                    let rect = container.get_bounding_client_rect();
                    view.borrow_mut().set_pointer(input::pointer_ndc(pe, &rect));
                }
            });
        }
        {
            let view = view.clone();
            let window_r = window.clone();
            let canvas = canvas.clone();
            let container = container.clone();
            listeners.add(target, "resize", move |_ev: web::Event| {
                let (w, h) = dom::sync_canvas_backing_size(&window_r, &canvas, &container, cap);
                view.borrow_mut().resize(w, h);
            });
        }

        let frame_loop = FrameLoop::start(FrameContext {
            view: view.clone(),
            store: self.store.clone(),
            choreo: self.choreo.clone(),
            on_route: self.on_route.clone(),
            epoch: self.epoch,
            document,
            clock: Clock::new(),
        });
        log::info!(
            "[mount] #{container_id} {}x{} px, {} listeners",
            w_px,
            h_px,
            listeners.len()
        );

        Ok(Some(Mounted {
            view,
            frame_loop,
            listeners,
            canvas,
        }))
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
