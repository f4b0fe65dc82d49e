//! Animation tuning constants.
//!
//! Rates are fractions of the remaining distance covered per frame; they
//! assume a roughly constant display refresh unless
//! [`SmoothingMode::TimeScaled`](crate::SmoothingMode) is selected.

// Core mesh
pub const CORE_RADIUS: f32 = 2.5;
pub const CORE_DETAIL: u32 = 3;
pub const ORGANIC_MAX_RADIUS: f32 = 3.6;
pub const NOISE_FREQUENCY: f32 = 0.42;

// Fragment layout (about)
pub const FRAGMENT_RADIUS_MIN: f32 = 4.5;
pub const FRAGMENT_RADIUS_SPAN: f32 = 3.2;
pub const FRAGMENT_DRIFT: f32 = 0.6;

// Lattice layout (projects)
pub const LATTICE_CELL: f32 = 0.9;
pub const LATTICE_XZ_SCALE: f32 = 1.25;
pub const LATTICE_Y_STEP: f32 = 0.85;

// Portal-plane layout (contact)
pub const PORTAL_RADIUS_CAP: f32 = 3.2;
pub const PORTAL_DEPTH: f32 = 2.2;

// Colour and light smoothing
pub const CORE_COLOR_RATE: f32 = 0.05;
pub const EMISSIVE_COLOR_RATE: f32 = 0.06;
pub const LIGHT_COLOR_RATE: f32 = 0.08;
pub const LIGHT_INTENSITY_RATE: f32 = 0.05;
pub const BACKGROUND_RATE: f32 = 0.04;
pub const FOG_COLOR_RATE: f32 = 0.08;
pub const FOG_DENSITY_RATE: f32 = 0.03;

// Scene-gated overlays
pub const GRID_OPACITY_MAX: f32 = 0.22;
pub const GRID_RATE: f32 = 0.08;
pub const PORTAL_ALPHA_MAX: f32 = 0.65;
pub const PORTAL_ALPHA_RATE: f32 = 0.06;
pub const PORTAL_SCALE_MIN: f32 = 0.01;
pub const PORTAL_SCALE_RATE: f32 = 0.08;

// Camera
pub const CAMERA_FOV_DEG: f32 = 42.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 160.0;
pub const CAMERA_MIN_ASPECT: f32 = 0.1;
pub const CAMERA_TARGET_RATE: f32 = 0.08;
pub const CAMERA_RATE: f32 = 0.1;
pub const LOOK_AT_RATE: f32 = 0.1;
pub const POINTER_Y_INFLUENCE: f32 = 0.6;
pub const POINTER_Z_PUSH: f32 = 0.8;
pub const LOOK_AT_POINTER: f32 = 0.2;
pub const JITTER_AMPLITUDE: f32 = 0.04;

// Metric-driven decor
pub const STAR_SIZE_BASE: f32 = 0.07;
pub const STAR_SIZE_SPAN: f32 = 0.045;
pub const STAR_OPACITY_BASE: f32 = 0.55;
pub const STAR_OPACITY_SPAN: f32 = 0.4;
pub const STAR_RATE: f32 = 0.08;
pub const STICK_INTENSITY_BASE: f32 = 0.28;
pub const STICK_INTENSITY_SPAN: f32 = 0.9;
pub const STICK_PRE_BONUS: f32 = 0.2;
pub const STICK_RATE: f32 = 0.12;
pub const PROJECT_COUNT_NORM: f32 = 8.0;

// Initial values before the first smoothing pass
pub const INITIAL_KEY_INTENSITY: f32 = 0.7;
pub const INITIAL_RIM_INTENSITY: f32 = 1.8;
pub const INITIAL_STAR_SIZE: f32 = 0.08;
pub const INITIAL_STAR_OPACITY: f32 = 0.82;
pub const INITIAL_STICK_INTENSITY: f32 = 0.52;

// Static lights
pub const AMBIENT_COLOR: u32 = 0x6f88ff;
pub const AMBIENT_INTENSITY: f32 = 0.48;
pub const KEY_LIGHT_POSITION: [f32; 3] = [5.6, 8.5, 6.0];
pub const RIM_LIGHT_POSITION: [f32; 3] = [-6.0, -4.0, -4.0];
pub const RIM_LIGHT_DISTANCE: f32 = 32.0;

// Background alpha written by the clear pass
pub const BACKGROUND_ALPHA: f32 = 0.9;
