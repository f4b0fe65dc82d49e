use glam::Vec2;
use web_sys as web;

/// Map a client-space point onto normalized device coordinates over the
/// rectangle at `origin` with `size`. Both axes span [-1, 1]; y grows
/// downwards, as the engine expects. A degenerate rectangle maps to centre.
#[inline]
pub fn client_to_ndc(client: Vec2, origin: Vec2, size: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    (client - origin) / size * 2.0 - Vec2::ONE
}

#[inline]
pub fn pointer_ndc(ev: &web::PointerEvent, rect: &web::DomRect) -> Vec2 {
    client_to_ndc(
        Vec2::new(ev.client_x() as f32, ev.client_y() as f32),
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
    )
}
