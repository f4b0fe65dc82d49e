//! Static decoration around the core: star field, glitch sticks, the
//! projects grid and the contact portal disc. Generated once per mount.

use crate::registry::hsl_color;
use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::PI;

pub const STICK_COUNT: usize = 50;
pub const STICK_SIZE: Vec3 = Vec3::new(0.06, 0.06, 0.8);
pub const GRID_LAYERS: [f32; 5] = [-1.7, -0.85, 0.0, 0.85, 1.7];
pub const GRID_HALF_SIZE: f32 = 8.0;
pub const GRID_STEP: f32 = 0.9;
pub const GRID_COLOR: u32 = 0x247b6d;
pub const PORTAL_DISC_RADIUS: f32 = 3.6;
pub const PORTAL_SEGMENTS: usize = 96;
pub const PORTAL_POSITION: Vec3 = Vec3::new(0.0, -0.2, 2.2);

#[derive(Clone, Debug)]
pub struct StarField {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

/// Star count scales with the container height and drops on small screens.
pub fn star_count(container: Vec2, window_min_side: f32) -> usize {
    let base: f64 = if container.x > 960.0 { 1800.0 } else { 1100.0 };
    let small = if window_min_side < 900.0 { 0.75 } else { 1.0 };
    (base * (container.y as f64 / 900.0 + 0.3) * small)
        .max(0.0)
        .floor() as usize
}

impl StarField {
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let radius = rng.gen_range(6.0..38.0_f32);
            // Spread over ±180 and used as radians; the wrap-around gives an
            // even-looking shell.
            let theta = rng.gen_range(-180.0..180.0_f32);
            let phi = rng.gen_range(-180.0..180.0_f32);
            positions.push(Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * phi.sin(),
                radius * theta.cos() * phi.cos(),
            ));
            let h = 0.58 + rng.gen::<f32>() * 0.12;
            let l = 0.68 + rng.gen::<f32>() * 0.22;
            colors.push(hsl_color(h, 0.8, l));
        }
        Self { positions, colors }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct StickField {
    pub offsets: Vec<Vec3>,
    /// Euler angles (x, y, z) in radians.
    pub orientations: Vec<Vec3>,
    /// Box triangles shared by every instance.
    pub box_vertices: Vec<Vec3>,
}

impl StickField {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut spread = |half: f32| rng.gen_range(-half..half);
        let mut offsets = Vec::with_capacity(STICK_COUNT);
        let mut orientations = Vec::with_capacity(STICK_COUNT);
        for _ in 0..STICK_COUNT {
            offsets.push(Vec3::new(spread(4.0), spread(4.0), spread(4.0)));
            orientations.push(Vec3::new(
                spread(PI / 2.0),
                spread(PI / 2.0),
                spread(PI / 2.0),
            ));
        }
        Self {
            offsets,
            orientations,
            box_vertices: box_triangles(STICK_SIZE),
        }
    }
}

/// Axis-aligned box centred on the origin as 12 triangles.
pub fn box_triangles(size: Vec3) -> Vec<Vec3> {
    let h = size * 0.5;
    let c = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
    // Four corners per face, counter-clockwise seen from outside.
    let faces = [
        [c(1., -1., 1.), c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.)],
        [c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)],
        [c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.), c(-1., 1., -1.)],
        [c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)],
        [c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)],
        [c(1., -1., -1.), c(-1., -1., -1.), c(-1., 1., -1.), c(1., 1., -1.)],
    ];
    faces
        .iter()
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect()
}

/// Line-list vertices for every grid layer.
pub fn grid_lines() -> Vec<Vec3> {
    let mut pts = Vec::new();
    for &y in GRID_LAYERS.iter() {
        let mut i = -GRID_HALF_SIZE;
        while i <= GRID_HALF_SIZE {
            pts.push(Vec3::new(-GRID_HALF_SIZE, y, i));
            pts.push(Vec3::new(GRID_HALF_SIZE, y, i));
            pts.push(Vec3::new(i, y, -GRID_HALF_SIZE));
            pts.push(Vec3::new(i, y, GRID_HALF_SIZE));
            i += GRID_STEP;
        }
    }
    pts
}

#[derive(Clone, Debug)]
pub struct PortalDisc {
    /// Triangle list in the disc's local XY plane.
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl PortalDisc {
    pub fn new(radius: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let rim = |s: usize| {
            let a = s as f32 / segments as f32 * 2.0 * PI;
            Vec2::new(a.cos(), a.sin())
        };
        let mut positions = Vec::with_capacity(segments * 3);
        let mut uvs = Vec::with_capacity(segments * 3);
        for s in 0..segments {
            let (a, b) = (rim(s), rim(s + 1));
            for p in [Vec2::ZERO, a, b] {
                positions.push((p * radius).extend(0.0));
                uvs.push(Vec2::new((p.x + 1.0) * 0.5, (p.y + 1.0) * 0.5));
            }
        }
        Self { positions, uvs }
    }
}

/// Everything the backend uploads once at mount.
#[derive(Clone, Debug)]
pub struct StaticScene {
    pub core_vertex_count: usize,
    pub stars: StarField,
    pub sticks: StickField,
    pub grid: Vec<Vec3>,
    pub portal: PortalDisc,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn star_count_follows_viewport() {
        assert_eq!(star_count(Vec2::new(1280.0, 900.0), 900.0), 2340);
        assert_eq!(star_count(Vec2::new(400.0, 900.0), 400.0), 1072);
        assert_eq!(star_count(Vec2::ZERO, 0.0), 247);
    }

    #[test]
    fn stars_sit_inside_the_shell() {
        let stars = StarField::generate(500, &mut StdRng::seed_from_u64(1));
        assert_eq!(stars.len(), 500);
        for p in &stars.positions {
            assert!(p.length() <= 38.0 + 1e-3);
        }
    }

    #[test]
    fn grid_has_matching_line_pairs() {
        let lines = grid_lines();
        assert_eq!(lines.len() % 4, 0);
        assert_eq!(lines.len() / 4 % GRID_LAYERS.len(), 0);
    }

    #[test]
    fn box_is_twelve_triangles() {
        assert_eq!(box_triangles(STICK_SIZE).len(), 36);
    }

    #[test]
    fn portal_disc_uvs_stay_in_unit_square() {
        let disc = PortalDisc::new(PORTAL_DISC_RADIUS, PORTAL_SEGMENTS);
        assert_eq!(disc.positions.len(), PORTAL_SEGMENTS * 3);
        assert!(disc.uvs.iter().all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));
    }
}
