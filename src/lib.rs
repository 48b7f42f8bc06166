pub mod consts;
pub mod config;
pub mod error;

pub mod vector;
pub mod ray;
pub mod color;

pub mod shape;
pub mod intersect;
pub mod light;
pub mod world;
pub mod camera;
pub mod parallel;

pub mod canvas;
pub mod scene;
pub mod loader;

use crate::consts::FEQ_EPSILON;

/// Compares two floats, allowing for `FEQ_EPSILON` of error.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
