//! Error types for the ray tracer.

use thiserror::Error;

use crate::shape::ShapeId;

#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Matrix is not invertible (determinant is zero)")]
    NonInvertibleMatrix,

    #[error("Pixel ({x}, {y}) is outside of the {width}x{height} canvas")]
    PixelOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Shape {0} does not exist in this scene")]
    UnknownShape(ShapeId),

    #[error("Shape {0} is not a group")]
    NotAGroup(ShapeId),

    #[error("Shape {0} already belongs to a group")]
    AlreadyParented(ShapeId),

    #[error("Adding shape {child} to group {group} would create a cycle")]
    CyclicGroup { group: ShapeId, child: ShapeId },

    #[error("Render worker pool error: {0}")]
    WorkerPool(String),

    #[error("Scene description error: {0}")]
    Scene(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TracerError>;

#[test]
fn error_messages_name_the_offender() {
    let e = TracerError::PixelOutOfBounds { x: 10, y: 2, width: 8, height: 8 };
    assert_eq!(e.to_string(), "Pixel (10, 2) is outside of the 8x8 canvas");

    let e = TracerError::NotAGroup(ShapeId(3));
    assert_eq!(e.to_string(), "Shape #3 is not a group");
}
