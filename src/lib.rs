pub mod cli;
pub mod delay;
pub mod download;
pub mod entrez;
pub mod sink;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VirofetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transient fetch error: {0}")]
    Transient(String),

    #[error("Exhausted {attempts} retries; last error: {last}")]
    ExhaustedRetries { attempts: u32, last: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VirofetchError>;
