// engine.rs - Double-buffered turn driver with banded row workers

use std::ops::Range;
use std::sync::Arc;

use crate::board::{Board, Row};
use crate::control::QuitSignal;
use crate::error::Result;
use crate::event::{Event, EventSender};
use crate::world::SharedWorld;

/// Splits `height` rows into `workers` contiguous bands. The last band takes
/// the remainder; bands may be empty when there are more workers than rows.
pub fn bands(height: usize, workers: usize) -> Vec<Range<usize>> {
    (0..workers)
        .map(|i| {
            let start = i * height / workers;
            let end = if i == workers - 1 { height } else { (i + 1) * height / workers };
            start..end
        })
        .collect()
}

/// Band worker: fills `rows` (the band starting at row `start`) with the next
/// generation, reading only from `current`.
async fn process_band(current: Arc<Board>, start: usize, mut rows: Vec<Row>) -> Vec<Row> {
    for (offset, row) in rows.iter_mut().enumerate() {
        let y = start + offset;
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = current.next_state(x, y);
        }
        tokio::task::yield_now().await; // Let the monitor and control tasks in between rows
    }
    rows
}

pub struct Engine {
    world: SharedWorld,
    advanced: Board,
    bands: Vec<Range<usize>>,
    events: EventSender,
    cell_flips: bool,
}

impl Engine {
    /// `threads` of zero is treated as a single worker.
    pub fn new(world: SharedWorld, threads: usize, events: EventSender, cell_flips: bool) -> Self {
        let (_, current) = world.snapshot();
        let (width, height) = (current.width(), current.height());
        Self {
            world,
            advanced: Board::new(width, height),
            bands: bands(height, threads.max(1)),
            events,
            cell_flips,
        }
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// Computes one generation, publishes it and emits its events. Returns the
    /// new turn number.
    pub async fn advance(&mut self) -> Result<u64> {
        let (_, current) = self.world.snapshot();
        let (width, height) = (current.width(), current.height());

        // Hand each band its own rows of the advanced buffer.
        let mut rows = self.advanced.take_rows();
        let mut chunks = Vec::with_capacity(self.bands.len());
        for band in self.bands.iter().rev() {
            chunks.push(rows.split_off(band.start));
        }
        chunks.reverse();

        let mut handles = Vec::with_capacity(chunks.len());
        for (band, chunk) in self.bands.iter().zip(chunks) {
            if chunk.is_empty() {
                continue;
            }
            handles.push(tokio::spawn(process_band(Arc::clone(&current), band.start, chunk)));
        }
        for handle in handles {
            match handle.await {
                Ok(band) => rows.extend(band),
                Err(err) => {
                    // The rows handed to the failed band are gone; rebuild the buffer.
                    self.advanced = Board::new(self.advanced.width(), self.advanced.height());
                    return Err(err.into());
                }
            }
        }

        let next = Board::from_rows(width, height, rows);
        let flipped = if self.cell_flips { current.diff(&next) } else { Vec::new() };

        let (turn, previous) = self.world.publish(Arc::new(next));
        drop(current);
        // A snapshot still being written out keeps the old board alive; start fresh then.
        self.advanced = Arc::try_unwrap(previous).unwrap_or_else(|_| Board::new(width, height));

        for cell in flipped {
            self.events.send(Event::CellFlipped { completed_turns: turn, cell });
        }
        self.events.send(Event::TurnComplete { completed_turns: turn });
        tracing::debug!(turn, "turn complete");
        Ok(turn)
    }

    /// Advances until `turns` turns have completed or quit is requested. Quit
    /// is only checked between turns.
    pub async fn run(&mut self, turns: u64, quit: &mut QuitSignal) -> Result<u64> {
        let mut completed = self.world.completed_turns();
        while completed < turns {
            if quit.requested() {
                tracing::info!(completed, "quit requested, stopping early");
                break;
            }
            completed = self.advance().await?;
        }
        Ok(completed)
    }
}
