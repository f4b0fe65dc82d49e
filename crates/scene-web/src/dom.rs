use crate::constants::{CANVAS_STYLE, REDUCED_MOTION_QUERY};
use anyhow::anyhow;
use scene_core::{Environment, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> anyhow::Result<(web::Window, web::Document)> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("no document"))?;
    Ok((window, document))
}

/// WebGPU presence and the user's motion preference. Nothing is created.
pub fn probe_environment(window: &web::Window) -> Environment {
    let navigator = window.navigator();
    let graphics_available = js_sys::Reflect::get(&navigator, &JsValue::from_str("gpu"))
        .map(|gpu| !gpu.is_undefined() && !gpu.is_null())
        .unwrap_or(false);
    let reduced_motion = window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false);
    Environment {
        graphics_available,
        reduced_motion,
    }
}

pub fn container_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow!(format!("{:?}", e)))
}

/// Append an absolutely positioned canvas filling `container`.
pub fn attach_canvas(
    document: &web::Document,
    container: &web::HtmlElement,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow!(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow!(format!("{:?}", e)))?;
    canvas
        .set_attribute("style", CANVAS_STYLE)
        .map_err(|e| anyhow!(format!("{:?}", e)))?;
    canvas
        .set_attribute("aria-hidden", "true")
        .map_err(|e| anyhow!(format!("{:?}", e)))?;
    container
        .append_child(&canvas)
        .map_err(|e| anyhow!(format!("{:?}", e)))?;
    Ok(canvas)
}

pub fn detach_canvas(canvas: &web::HtmlCanvasElement) {
    canvas.remove();
}

/// Container size in CSS pixels and the smaller window side.
pub fn viewport(window: &web::Window, container: &web::HtmlElement) -> Viewport {
    let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let min_side = inner(window.inner_width()).min(inner(window.inner_height()));
    Viewport {
        width: container.client_width().max(0) as u32,
        height: container.client_height().max(0) as u32,
        window_min_side: min_side as f32,
    }
}

/// Size the canvas backing store to the container at a capped pixel ratio.
/// Returns the backing size in device pixels.
pub fn sync_canvas_backing_size(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    container: &web::HtmlElement,
    pixel_ratio_cap: f32,
) -> (u32, u32) {
    let dpr = window.device_pixel_ratio().min(pixel_ratio_cap as f64);
    let w_px = (container.client_width().max(0) as f64 * dpr) as u32;
    let h_px = (container.client_height().max(0) as f64 * dpr) as u32;
    canvas.set_width(w_px.max(1));
    canvas.set_height(h_px.max(1));
    (w_px, h_px)
}

#[inline]
pub fn page_visible(document: &web::Document) -> bool {
    !document.hidden()
}
