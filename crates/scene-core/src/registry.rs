//! Per-page camera anchors, palettes and tuning tables.
//!
//! Every lookup is an exhaustive `match`, so adding a page is a compile error
//! until each table has an entry.

use crate::scene::PageScene;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraAnchor {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// Visual palette. Colours are linear RGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub base: Vec3,
    pub emissive: Vec3,
    pub key: Vec3,
    pub rim: Vec3,
    pub background: Vec3,
    pub transmission: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub fog_density: f32,
}

pub fn lookup(scene: PageScene) -> (CameraAnchor, Palette) {
    (camera_anchor(scene), palette(scene))
}

pub fn camera_anchor(scene: PageScene) -> CameraAnchor {
    let (position, look_at) = match scene {
        PageScene::Home => (Vec3::new(0.0, 0.6, 14.0), Vec3::new(0.0, 0.2, 0.0)),
        PageScene::About => (Vec3::new(0.0, 0.25, 6.2), Vec3::new(0.0, 0.4, 0.0)),
        PageScene::Projects => (Vec3::new(1.15, 0.65, 10.6), Vec3::new(0.6, 0.0, 0.0)),
        PageScene::Contact => (Vec3::new(-0.3, -0.05, 8.8), Vec3::new(0.0, -0.3, 0.0)),
    };
    CameraAnchor { position, look_at }
}

pub fn palette(scene: PageScene) -> Palette {
    match scene {
        PageScene::Home => Palette {
            base: hex_color(0x5b74ff),
            emissive: hex_color(0x2336ff),
            key: hex_color(0x76f4ff),
            rim: hex_color(0xff70d7),
            background: hex_color(0x05060f),
            transmission: 0.52,
            metalness: 0.58,
            roughness: 0.18,
            fog_density: 0.045,
        },
        PageScene::About => Palette {
            base: hex_color(0xd95aa6),
            emissive: hex_color(0xa51f5d),
            key: hex_color(0xff9bd1),
            rim: hex_color(0x6b9bff),
            background: hex_color(0x170311),
            transmission: 0.42,
            metalness: 0.42,
            roughness: 0.28,
            fog_density: 0.032,
        },
        PageScene::Projects => Palette {
            base: hex_color(0x45d3be),
            emissive: hex_color(0x088bb0),
            key: hex_color(0x72ffe6),
            rim: hex_color(0x3b6fff),
            background: hex_color(0x00141b),
            transmission: 0.48,
            metalness: 0.64,
            roughness: 0.16,
            fog_density: 0.04,
        },
        PageScene::Contact => Palette {
            base: hex_color(0xc9d24d),
            emissive: hex_color(0xb97a2a),
            key: hex_color(0xffe07d),
            rim: hex_color(0xff7adf),
            background: hex_color(0x161000),
            transmission: 0.36,
            metalness: 0.44,
            roughness: 0.24,
            fog_density: 0.028,
        },
    }
}

/// How far the camera follows the pointer.
pub fn pointer_influence(scene: PageScene) -> f32 {
    match scene {
        PageScene::Home => 1.8,
        PageScene::About => 1.2,
        PageScene::Projects => 1.5,
        PageScene::Contact => 1.1,
    }
}

/// Per-frame fraction each vertex moves towards its target.
pub fn vertex_ease(scene: PageScene) -> f32 {
    match scene {
        PageScene::Home => 0.09,
        PageScene::About => 0.065,
        PageScene::Projects => 0.06,
        PageScene::Contact => 0.06,
    }
}

pub fn key_intensity(scene: PageScene) -> f32 {
    match scene {
        PageScene::Home => 0.7,
        PageScene::About => 0.68,
        PageScene::Projects => 0.78,
        PageScene::Contact => 0.62,
    }
}

pub fn rim_intensity(scene: PageScene) -> f32 {
    match scene {
        PageScene::Home => 1.6,
        PageScene::About => 1.4,
        PageScene::Projects => 1.8,
        PageScene::Contact => 1.55,
    }
}

/// Emissive pulse as (base, amplitude).
pub fn emissive_pulse(scene: PageScene) -> (f32, f32) {
    match scene {
        PageScene::Home => (0.32, 0.07),
        _ => (0.22, 0.05),
    }
}

/// Decode `0xRRGGBB` (sRGB) into linear RGB.
pub fn hex_color(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// HSL (all components in [0, 1]) to linear RGB.
pub fn hsl_color(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(srgb_to_linear(l));
    }
    let p = if l <= 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let q = 2.0 * l - p;
    let r = hue_to_rgb(q, p, h + 1.0 / 3.0);
    let g = hue_to_rgb(q, p, h);
    let b = hue_to_rgb(q, p, h - 1.0 / 3.0);
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_white_and_black_map_to_extremes() {
        assert!(hex_color(0xffffff).abs_diff_eq(Vec3::ONE, 1e-5));
        assert_eq!(hex_color(0x000000), Vec3::ZERO);
    }

    #[test]
    fn hsl_primary_red() {
        let c = hsl_color(0.0, 1.0, 0.5);
        assert!((c.x - 1.0).abs() < 1e-5);
        assert!(c.y.abs() < 1e-5 && c.z.abs() < 1e-5);
    }
}
