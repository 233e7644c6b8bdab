// control.rs - Key handling, snapshot dumps and the quit signal

use tokio::sync::{mpsc, oneshot, watch};

use crate::error::Result;
use crate::event::{Event, EventSender};
use crate::io::IoHandle;
use crate::params::Params;
use crate::world::SharedWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Save,
    Quit,
}

impl Key {
    /// `s` saves a snapshot, `q` quits; anything else is not a command.
    pub fn from_symbol(symbol: char) -> Option<Key> {
        match symbol {
            's' => Some(Key::Save),
            'q' => Some(Key::Quit),
            _ => None,
        }
    }
}

/// Fires the quit signal. Dropping it without firing leaves the run going.
#[derive(Debug)]
pub struct QuitTrigger {
    tx: oneshot::Sender<()>,
}

impl QuitTrigger {
    pub fn quit(self) {
        let _ = self.tx.send(());
    }
}

/// Polled by the turn driver between turns; never blocks.
#[derive(Debug)]
pub struct QuitSignal {
    rx: oneshot::Receiver<()>,
    fired: bool,
}

impl QuitSignal {
    pub fn new() -> (QuitTrigger, QuitSignal) {
        let (tx, rx) = oneshot::channel();
        (QuitTrigger { tx }, QuitSignal { rx, fired: false })
    }

    pub fn requested(&mut self) -> bool {
        if !self.fired {
            self.fired = self.rx.try_recv().is_ok();
        }
        self.fired
    }
}

/// Writes the current board as an image named after its turn.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    pub world: SharedWorld,
    pub io: IoHandle,
    pub events: EventSender,
    pub params: Params,
}

impl ImageWriter {
    pub async fn write(&self) -> Result<()> {
        let (turn, board) = self.world.snapshot();
        let filename = self.params.output_filename(turn);
        self.io.write_image(&filename, &board).await?;
        tracing::debug!(turn, %filename, "image written");
        self.events.send(Event::ImageOutputComplete {
            completed_turns: turn,
            filename,
        });
        Ok(())
    }
}

/// Control task: reacts to keys until quit is pressed or shutdown is signalled.
/// A snapshot that has started is always finished before the task exits.
pub async fn run(
    writer: ImageWriter,
    mut keys: mpsc::Receiver<char>,
    quit: QuitTrigger,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let symbol = tokio::select! {
            biased;
            _ = shutdown.changed() => return Ok(()),
            symbol = keys.recv() => symbol,
        };
        let Some(symbol) = symbol else {
            // Key source is gone; nothing left to react to.
            let _ = shutdown.changed().await;
            return Ok(());
        };
        match Key::from_symbol(symbol) {
            Some(Key::Save) => writer.write().await?,
            Some(Key::Quit) => {
                quit.quit();
                return Ok(());
            }
            None => tracing::trace!(?symbol, "ignoring key"),
        }
    }
}
