// lib.rs - Conway's Game of Life on a toroidal board, advanced by banded async workers
//
// A session loads the board through the i/o task, then the turn driver
// advances it while the monitor reports live counts and the control task
// reacts to keys. Everything observable goes out on the event stream.

pub mod board;
pub mod control;
pub mod engine;
pub mod error;
pub mod event;
pub mod io;
pub mod monitor;
pub mod params;
pub mod patterns;
pub mod pgm;
pub mod session;
pub mod world;

pub use board::{Board, Cell, Point};
pub use error::{Error, Result};
pub use event::{Event, EventSender, State};
pub use io::{ImageStore, IoHandle, MemoryStore};
pub use params::Params;
pub use session::{Channels, run};
