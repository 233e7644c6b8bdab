// world.rs - The published generation, shared between the turn driver and background tasks

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::board::Board;

#[derive(Debug)]
struct World {
    current: Arc<Board>,
    completed_turns: u64,
}

/// Guarded handle to the current board and the turn counter.
///
/// Only the turn driver publishes; the monitor and control tasks read. The
/// lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    pub fn new(board: Board) -> Self {
        Self {
            inner: Arc::new(Mutex::new(World {
                current: Arc::new(board),
                completed_turns: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn completed_turns(&self) -> u64 {
        self.lock().completed_turns
    }

    /// Turn number and a read-only handle to the board as of that turn.
    pub fn snapshot(&self) -> (u64, Arc<Board>) {
        let world = self.lock();
        (world.completed_turns, Arc::clone(&world.current))
    }

    /// Counts live cells of the current board under the guard.
    pub fn alive_count(&self) -> (u64, usize) {
        let world = self.lock();
        (world.completed_turns, world.current.alive_count())
    }

    /// Makes `next` the current board and counts the turn. Returns the new
    /// turn number and the board it replaced.
    pub(crate) fn publish(&self, next: Arc<Board>) -> (u64, Arc<Board>) {
        let mut world = self.lock();
        let previous = std::mem::replace(&mut world.current, next);
        world.completed_turns += 1;
        (world.completed_turns, previous)
    }
}
