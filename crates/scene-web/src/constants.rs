// DOM wiring and frame-loop tuning for the web front-end

// Overlay canvas sits behind page content and never takes pointer input
pub const CANVAS_STYLE: &str =
    "position:absolute;inset:0;width:100%;height:100%;display:block;pointer-events:none";

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Longest frame step fed to the engine after a stall (seconds)
pub const MAX_FRAME_DT_SEC: f32 = 0.25;

// Star sprite corners, two triangles spanning [-1, 1]^2
pub const STAR_QUAD: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

// Below this the grid and portal passes are skipped entirely
pub const OVERLAY_MIN_ALPHA: f32 = 0.001;
