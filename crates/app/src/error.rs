use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Engine(#[from] engine::EngineError),
    #[error("storage error: {0}")]
    Storage(#[from] engine::StorageError),
    #[error("invalid argument: {0}")]
    Argument(String),
}
