use thiserror::Error;

use crate::controls::ControlId;

/// A raw control value that could not be applied
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("{control} expects a number, got {value:?}")]
    NotANumber { control: ControlId, value: String },

    #[error("{value:?} is not a #rrggbb color")]
    InvalidColor { value: String },

    #[error("{control} does not take a {kind} value")]
    WrongKind {
        control: ControlId,
        kind: &'static str,
    },
}

/// Failure to turn asset bytes into a clock model
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode GLTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("asset contains no scene")]
    NoScene,

    #[error("asset has no node named {0:?}")]
    MissingNode(&'static str),

    #[error("asset unavailable: {0}")]
    Unavailable(String),
}
