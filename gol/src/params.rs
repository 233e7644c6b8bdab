// params.rs - Run configuration

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_ALIVE_INTERVAL: Duration = Duration::from_secs(2);

/// Settings fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub image_width: usize,
    pub image_height: usize,
    /// Number of band workers per turn.
    pub threads: usize,
    /// Turn limit. Zero runs no turns and reports the initial board.
    pub turns: u64,
    /// How often the alive-cell monitor reports.
    pub alive_interval: Duration,
    /// Emit a cell-flipped event for every cell that changes each turn.
    pub cell_flips: bool,
}

impl Params {
    pub fn new(image_width: usize, image_height: usize, threads: usize, turns: u64) -> Self {
        Self {
            image_width,
            image_height,
            threads,
            turns,
            alive_interval: DEFAULT_ALIVE_INTERVAL,
            cell_flips: true,
        }
    }

    pub fn with_alive_interval(mut self, interval: Duration) -> Self {
        self.alive_interval = interval;
        self
    }

    pub fn with_cell_flips(mut self, enabled: bool) -> Self {
        self.cell_flips = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("image_width", self.image_width == 0, "must be at least 1"),
            ("image_height", self.image_height == 0, "must be at least 1"),
            ("threads", self.threads == 0, "must be at least 1"),
            ("alive_interval", self.alive_interval.is_zero(), "must be non-zero"),
        ];
        match checks.into_iter().find(|&(_, failed, _)| failed) {
            Some((field, _, reason)) => Err(Error::InvalidParams { field, reason }),
            None => Ok(()),
        }
    }

    /// Name of the image the initial board is read from.
    pub fn input_filename(&self) -> String {
        format!("{}x{}", self.image_width, self.image_height)
    }

    /// Name of the image written for the board after `turn` turns.
    pub fn output_filename(&self, turn: u64) -> String {
        format!("{}x{}x{}", self.image_width, self.image_height, turn)
    }
}
