// Runtime parameters
pub const CANVAS_WIDTH: usize = 800;
pub const CANVAS_HEIGHT: usize = 600;
pub const OUT_FILE: &'static str = "./out.ppm";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Projection
pub const FOCAL_LENGTH: f64 = 300.0;
pub const BASE_SCALE: f64 = 2.0;
pub const AUTO_SCALE_REFERENCE: f64 = 600.0;
pub const NEAR_PLANE_Z: f64 = 1.0;

// Lighting
pub const AMBIENT_STRENGTH: f64 = 0.3;
pub const DIFFUSE_STRENGTH: f64 = 0.6;
pub const SPECULAR_STRENGTH: f64 = 0.5;
pub const SHININESS: i32 = 32;
pub const LIGHT_DISTANCE: f64 = 300.0;

// Phong-approximated gradient
pub const PHONG_EDGE_FACTOR: f64 = 0.7;

// Light marker
pub const GLOW_RADIUS: f64 = 10.0;
pub const RING_RADIUS: f64 = 5.0;

// Default scene
pub const DEFAULT_HEIGHT: f64 = 100.0;
pub const DEFAULT_WIDTH: f64 = 60.0;
pub const DEFAULT_DEPTH: f64 = 30.0;
pub const D_OFFSET_X: f64 = -60.0;
pub const N_OFFSET_X: f64 = 60.0;
pub const CAMERA_DISTANCE: f64 = 400.0;
