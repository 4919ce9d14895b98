use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),
    #[error("config file {} does not exist", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("invalid color {value:?} for {key}")]
    InvalidColor { key: &'static str, value: String },
    /// No terminal to draw on; the session cannot start.
    #[error("no usable terminal: {0}")]
    Terminal(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
