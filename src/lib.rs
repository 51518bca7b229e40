pub mod consts;
pub mod error;

pub mod vector;
pub mod matrix;
pub mod color;

pub mod mesh;
pub mod clip;
pub mod light;
pub mod camera;

pub mod shading;
pub mod render;
pub mod canvas;

pub mod scene;
pub mod config;

use consts::FEQ_EPSILON;

/// Approximate floating point equality, used by every `PartialEq` impl on the
/// crate's float types.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
