use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("Missing destination: sink was not opened from a path")]
    MissingDestination,

    #[error("Failed to create directory {}: {source}", dir.display())]
    DirectoryCreationFailed { dir: PathBuf, source: io::Error },

    #[error("Failed to create file {}: {source}", path.display())]
    FileCreationFailed { path: PathBuf, source: io::Error },

    #[error("Failed to open {} for writing: {source}", path.display())]
    OpenForWritingFailed { path: PathBuf, source: io::Error },

    #[error("Failed to delete {}: {source}", path.display())]
    DeletionFailed { path: PathBuf, source: io::Error },

    #[error("Sink is closed")]
    Closed,

    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    #[error("Config Error: {0}")]
    Config(String),
}
