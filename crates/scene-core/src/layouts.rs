//! Alternate vertex layouts precomputed once from the base mesh.
//!
//! `home` has no table: its shape is evaluated live from noise every frame.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct VertexLayoutSet {
    /// Shattered silhouette (`about`).
    pub fragment: Vec<Vec3>,
    /// Grid-snapped silhouette (`projects`).
    pub lattice: Vec<Vec3>,
    /// Flattened disc in front of the core (`contact`).
    pub portal: Vec<Vec3>,
    /// Random phase per vertex in [0, 2π).
    pub seeds: Vec<f32>,
    /// Polar angle `atan2(z, x)` of the base vertex.
    pub angles: Vec<f32>,
}

impl VertexLayoutSet {
    /// `normals` are expected to be unit length; a zero normal simply
    /// contributes no outward push.
    pub fn generate<R: Rng + ?Sized>(positions: &[Vec3], normals: &[Vec3], rng: &mut R) -> Self {
        let n = positions.len();
        let mut set = Self {
            fragment: Vec::with_capacity(n),
            lattice: Vec::with_capacity(n),
            portal: Vec::with_capacity(n),
            seeds: Vec::with_capacity(n),
            angles: Vec::with_capacity(n),
        };
        for (&base, &normal) in positions.iter().zip(normals.iter()) {
            let seed = rng.gen::<f32>() * TAU;
            let angle = base.z.atan2(base.x);
            let explode = FRAGMENT_RADIUS_MIN + rng.gen::<f32>() * FRAGMENT_RADIUS_SPAN;
            let scatter = (rng.gen::<f32>() - 0.5) * 2.8;

            set.fragment.push(fragment_target(base, normal, seed, angle, explode, scatter));
            set.lattice.push(lattice_target(base));
            set.portal.push(portal_target(base, seed));
            set.seeds.push(seed);
            set.angles.push(angle);
        }
        set
    }

    pub fn vertex_count(&self) -> usize {
        self.seeds.len()
    }
}

fn fragment_target(base: Vec3, normal: Vec3, seed: f32, angle: f32, explode: f32, scatter: f32) -> Vec3 {
    let pushed = base + normal * explode;
    Vec3::new(
        pushed.x + seed.cos() * 1.35 + (base.y * 2.1).sin() * 0.3,
        pushed.y + seed.sin() * 1.35 + (angle * 3.4).cos() * 0.25,
        pushed.z + scatter + (seed * 1.6).sin() * 0.4,
    )
}

#[inline]
pub fn snap(v: f32, step: f32) -> f32 {
    (v / step).round() * step
}

pub fn lattice_target(base: Vec3) -> Vec3 {
    Vec3::new(
        snap(base.x * LATTICE_XZ_SCALE, LATTICE_CELL),
        snap(base.y, LATTICE_Y_STEP),
        snap(base.z * LATTICE_XZ_SCALE, LATTICE_CELL),
    )
}

fn portal_target(base: Vec3, seed: f32) -> Vec3 {
    let r = (base.x * base.x + base.z * base.z).sqrt() + 0.0001;
    let theta = base.z.atan2(base.x);
    let radial = (r * 0.82 + (theta * 6.0 + seed).sin() * 0.12).min(PORTAL_RADIUS_CAP);
    Vec3::new(
        theta.cos() * radial,
        (seed * 2.2 + base.y * 0.6).sin() * 0.25,
        PORTAL_DEPTH + (seed + base.y * 0.6).sin() * 0.22,
    )
}
