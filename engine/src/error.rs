use std::{io, path::PathBuf};

use thiserror::Error;

/// Anything that stops a model from being loaded. Fatal to startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("asset has no skin")]
    NoSkin,

    #[error("bone {bone} references parent {parent}, skeleton only has {count} bones")]
    ParentOutOfRange {
        bone: usize,
        parent: usize,
        count: usize,
    },

    #[error("bone {bone} is part of a parent cycle")]
    CyclicHierarchy { bone: usize },

    #[error("skin has {matrices} inverse bind matrices for {joints} joints")]
    InverseBindCountMismatch { matrices: usize, joints: usize },

    #[error("clip '{clip}' animates bone {bone}, skeleton only has {count} bones")]
    TrackTargetOutOfRange {
        clip: String,
        bone: usize,
        count: usize,
    },

    #[error("clip '{clip}' has more than one track for bone {bone}")]
    DuplicateTrack { clip: String, bone: usize },

    #[error("channel has {values} values for {times} keyframes")]
    KeyframeCountMismatch { times: usize, values: usize },

    #[error("keyframe timestamps must be finite and strictly increasing (index {index})")]
    NonIncreasingTimestamps { index: usize },

    #[error("channel has no keyframes")]
    EmptyTrack,

    #[error("clip '{clip}' has invalid duration {duration}")]
    InvalidDuration { clip: String, duration: f32 },

    #[error("vertex {vertex} references bone {bone}, skeleton only has {count} bones")]
    JointIndexOutOfRange {
        vertex: usize,
        bone: u32,
        count: usize,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Rejected clip selection. The current selection is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("clip index {index} is out of range, model has {count} clips")]
    ClipOutOfRange { index: usize, count: usize },

    #[error("model has no animation clips")]
    NoClips,
}

/// Errors surfaced by [`crate::run`].
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("graphics error: {0}")]
    Gpu(String),
}
