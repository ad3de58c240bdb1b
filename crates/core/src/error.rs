use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdlensError {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AdlensError>;
