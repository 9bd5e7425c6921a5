use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Save window already open")]
    SaveAlreadyActive,

    #[error("No save window is open")]
    SaveNotActive,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
