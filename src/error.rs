use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    #[error("Invalid view mode: {0}")]
    InvalidViewMode(String),

    #[error("Invalid state path: {0:?}")]
    InvalidPath(String),

    #[error("Cannot set {path}: segment {segment} is not a mapping")]
    PathConflict { path: String, segment: String },

    #[error("Reentrant set rejected for key: {0}")]
    ReentrantSet(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
