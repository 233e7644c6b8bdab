// monitor.rs - Periodic alive-cell count reporting

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::event::{Event, EventSender};
use crate::world::SharedWorld;

/// Reports the live cell count every `period` until shutdown is signalled.
/// The count is taken under the world guard; the event is sent after it is released.
pub async fn run(
    world: SharedWorld,
    events: EventSender,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let (completed_turns, cells_count) = world.alive_count();
                events.send(Event::AliveCellsCount { completed_turns, cells_count });
            }
        }
    }
    tracing::debug!("alive-cell monitor stopped");
}
