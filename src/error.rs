use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write settings: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
