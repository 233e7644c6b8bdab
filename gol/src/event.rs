// event.rs - Observable state transitions sent to the front end

use std::fmt;

use tokio::sync::mpsc;

use crate::board::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Executing,
    Quitting,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Executing => f.write_str("Executing"),
            State::Quitting => f.write_str("Quitting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CellFlipped { completed_turns: u64, cell: Point },
    TurnComplete { completed_turns: u64 },
    AliveCellsCount { completed_turns: u64, cells_count: usize },
    ImageOutputComplete { completed_turns: u64, filename: String },
    FinalTurnComplete { completed_turns: u64, alive: Vec<Point> },
    StateChange { completed_turns: u64, new_state: State },
}

impl Event {
    pub fn completed_turns(&self) -> u64 {
        match *self {
            Event::CellFlipped { completed_turns, .. }
            | Event::TurnComplete { completed_turns }
            | Event::AliveCellsCount { completed_turns, .. }
            | Event::ImageOutputComplete { completed_turns, .. }
            | Event::FinalTurnComplete { completed_turns, .. }
            | Event::StateChange { completed_turns, .. } => completed_turns,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CellFlipped { completed_turns, cell } => {
                write!(f, "turn {completed_turns}: cell ({}, {}) flipped", cell.x, cell.y)
            }
            Event::TurnComplete { completed_turns } => {
                write!(f, "turn {completed_turns} complete")
            }
            Event::AliveCellsCount { completed_turns, cells_count } => {
                write!(f, "turn {completed_turns}: {cells_count} cells alive")
            }
            Event::ImageOutputComplete { completed_turns, filename } => {
                write!(f, "turn {completed_turns}: wrote image {filename}")
            }
            Event::FinalTurnComplete { completed_turns, alive } => {
                write!(f, "final turn {completed_turns}: {} cells alive", alive.len())
            }
            Event::StateChange { completed_turns, new_state } => {
                write!(f, "turn {completed_turns}: {new_state}")
            }
        }
    }
}

/// Sending half of the event stream.
///
/// The stream closes once every clone has been dropped. A receiver that went
/// away early does not stop the simulation; events are then discarded.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event receiver dropped, discarding event");
        }
    }
}

pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}
