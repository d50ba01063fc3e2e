use thiserror::Error;

/// Failures raised while producing a frame. The fault boundary is the only
/// place these are expected to be handled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("viewport has zero area ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },

    #[error("node `{0}` has a non-finite transform")]
    NonFiniteTransform(String),

    #[error("camera is degenerate: {0}")]
    DegenerateCamera(String),

    #[error("render panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,

    #[error("invalid hex color `{0}`")]
    InvalidHex(String),

    #[error("unknown color name `{0}`")]
    UnknownName(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("parameter `{0}` is already declared")]
    DuplicateKey(String),

    #[error("unknown parameter `{0}`")]
    UnknownKey(String),

    #[error("parameter `{key}` expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("parameter `{key}` has an invalid range [{min}, {max}]")]
    InvalidRange { key: String, min: f32, max: f32 },

    #[error(transparent)]
    Color(#[from] ColorError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
