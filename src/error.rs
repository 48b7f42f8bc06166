//! Error types for scene loading and image output.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for scene loading.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while loading a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("could not read scene {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON scene failed to deserialize.
    #[error("invalid JSON scene: {0}")]
    Json(#[from] serde_json::Error),

    /// A line of a text scene could not be split into properties.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unknown object type {name:?}")]
    UnknownObject { line: usize, name: String },

    #[error("line {line}: {object} has no property {property:?}")]
    UnknownProperty { line: usize, object: &'static str, property: String },

    #[error("line {line}: {object} property {property:?} given twice")]
    DuplicateProperty { line: usize, object: &'static str, property: String },

    #[error("line {line}: {object} is missing property {property:?}")]
    MissingProperty { line: usize, object: &'static str, property: &'static str },

    #[error("line {line}: invalid value for {property:?}: {reason}")]
    InvalidValue { line: usize, property: String, reason: String },

    /// An entry of a JSON scene failed validation.
    #[error("{item}: invalid value for {property:?}: {reason}")]
    InvalidItem { item: String, property: String, reason: String },

    /// The scene has no camera to render from.
    #[error("scene has no camera")]
    MissingCamera,

    #[error("scene has {0} cameras, expected exactly one")]
    MultipleCameras(usize),
}

/// Errors that can occur while writing a rendered image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not write image {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
