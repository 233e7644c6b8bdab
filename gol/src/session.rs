// session.rs - Runs one simulation from loading the board to closing the event stream

use tokio::sync::{mpsc, watch};

use crate::control::{self, ImageWriter, QuitSignal};
use crate::engine::Engine;
use crate::error::Result;
use crate::event::{Event, EventSender, State};
use crate::io::IoHandle;
use crate::monitor;
use crate::params::Params;
use crate::world::SharedWorld;

/// Collaborators the session talks to.
pub struct Channels {
    pub events: EventSender,
    pub io: IoHandle,
    pub keys: mpsc::Receiver<char>,
}

/// Loads the initial board, runs up to `params.turns` turns and shuts down.
///
/// Shutdown order, whatever ended the run: stop the monitor and control
/// tasks, write the final image, report the final turn with its live cells,
/// wait for the i/o task to go idle, report `Quitting`, close the event
/// stream. Returns the number of completed turns.
pub async fn run(params: Params, channels: Channels) -> Result<u64> {
    params.validate()?;
    let Channels { events, io, keys } = channels;

    let board = io
        .read_image(&params.input_filename(), params.image_width, params.image_height)
        .await?;
    for cell in board.alive_cells() {
        events.send(Event::CellFlipped { completed_turns: 0, cell });
    }
    let world = SharedWorld::new(board);
    events.send(Event::StateChange {
        completed_turns: 0,
        new_state: State::Executing,
    });
    tracing::info!(
        width = params.image_width,
        height = params.image_height,
        threads = params.threads,
        turns = params.turns,
        "simulation started"
    );

    let writer = ImageWriter {
        world: world.clone(),
        io: io.clone(),
        events: events.clone(),
        params: params.clone(),
    };
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (quit_trigger, mut quit) = QuitSignal::new();
    let monitor = tokio::spawn(monitor::run(
        world.clone(),
        events.clone(),
        params.alive_interval,
        shutdown_rx.clone(),
    ));
    let control = tokio::spawn(control::run(writer.clone(), keys, quit_trigger, shutdown_rx));

    let mut engine = Engine::new(world.clone(), params.threads, events.clone(), params.cell_flips);
    let outcome = engine.run(params.turns, &mut quit).await;
    drop(engine);

    shutdown_tx.send_replace(true);
    monitor.await?;
    control.await??;
    outcome?;

    writer.write().await?;
    drop(writer);

    let (completed_turns, board) = world.snapshot();
    events.send(Event::FinalTurnComplete {
        completed_turns,
        alive: board.alive_cells(),
    });

    io.wait_idle().await?;

    events.send(Event::StateChange {
        completed_turns,
        new_state: State::Quitting,
    });
    tracing::info!(completed_turns, "simulation finished");
    drop(events);
    Ok(completed_turns)
}
