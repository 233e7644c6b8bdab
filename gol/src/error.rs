// error.rs - Errors raised while setting up or driving a simulation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParams {
        field: &'static str,
        reason: &'static str,
    },

    #[error("input ended after {received} of {expected} cells")]
    InputExhausted { expected: usize, received: usize },

    #[error("cell value {0} is neither 0 (dead) nor 255 (alive)")]
    InvalidCell(u8),

    #[error("image {filename} is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    ImageSize {
        filename: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("malformed pgm image: {0}")]
    Pgm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image i/o task has shut down")]
    IoClosed,

    #[error("simulation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
