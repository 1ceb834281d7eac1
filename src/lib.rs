pub mod consts;
pub mod error;
pub mod config;

pub mod tuple;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod shape;
pub mod group;
pub mod intersect;

pub mod color;
pub mod pattern;
pub mod light;

pub mod world;
pub mod camera;
pub mod parallel;
pub mod canvas;

pub mod scene;

pub use error::{ Result, TracerError };

use consts::EPSILON;

/// Compares two floats, tolerating an absolute error of `EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < EPSILON
}
