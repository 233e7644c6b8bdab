// main.rs - Command-line front end for the Game of Life simulation
//
// Reads the initial board from a PGM file (or seeds it from a pattern),
// forwards stdin keys (`s` save, `q` quit) and logs every event.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gol::io::{Image, ImageStore};
use gol::patterns;
use gol::pgm::PgmDir;
use gol::{Board, Channels, Event, Params};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gol_cli", about = "Conway's Game of Life on a toroidal board")]
struct Args {
    /// Board width in cells.
    #[arg(long, default_value_t = 512)]
    width: usize,

    /// Board height in cells.
    #[arg(long, default_value_t = 512)]
    height: usize,

    /// Number of band workers per turn.
    #[arg(short = 't', long, default_value_t = 8)]
    threads: usize,

    /// Number of turns to run.
    #[arg(long, default_value_t = 10_000_000_000)]
    turns: u64,

    /// Directory holding `<width>x<height>.pgm`.
    #[arg(long, default_value = "images")]
    images: PathBuf,

    /// Directory final and snapshot images are written to.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Seed the board from a named pattern instead of an image file.
    #[arg(long, conflicts_with = "seed")]
    pattern: Option<String>,

    /// Seed the board pseudo-randomly instead of from an image file.
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between alive-cell reports.
    #[arg(long, default_value_t = 2000)]
    alive_interval_ms: u64,

    /// Do not report individual cell flips.
    #[arg(long)]
    no_cell_flips: bool,
}

/// Serves one in-memory starting board and writes everything else to disk.
struct Seeded {
    name: String,
    image: Image,
    out: PgmDir,
}

impl ImageStore for Seeded {
    fn load(&mut self, filename: &str) -> gol::Result<Image> {
        if filename == self.name {
            Ok(self.image.clone())
        } else {
            self.out.load(filename)
        }
    }

    fn save(&mut self, filename: &str, width: usize, height: usize, pixels: &[u8]) -> gol::Result<()> {
        self.out.save(filename, width, height, pixels)
    }
}

fn seeded_board(args: &Args) -> Result<Option<Board>> {
    let mut board = Board::new(args.width, args.height);
    if let Some(name) = &args.pattern {
        let Some(pattern) = patterns::find(name) else {
            let known: Vec<&str> = patterns::PATTERNS.iter().map(|p| p.name).collect();
            bail!("unknown pattern `{name}` (known: {})", known.join(", "));
        };
        patterns::apply_pattern(&mut board, pattern, args.width / 2, args.height / 2);
        return Ok(Some(board));
    }
    if let Some(seed) = args.seed {
        patterns::apply_random_pattern(&mut board, seed);
        return Ok(Some(board));
    }
    Ok(None)
}

/// Forwards stdin characters as key symbols. A plain thread, so a pending
/// read never holds up process exit.
fn spawn_key_reader(keys: mpsc::Sender<char>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for symbol in line.chars() {
                if keys.blocking_send(symbol).is_err() {
                    return;
                }
            }
        }
    });
}

fn log_event(event: &Event) {
    match event {
        Event::CellFlipped { .. } => tracing::trace!("{event}"),
        Event::TurnComplete { .. } => tracing::debug!("{event}"),
        _ => tracing::info!("{event}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let params = Params::new(args.width, args.height, args.threads, args.turns)
        .with_alive_interval(Duration::from_millis(args.alive_interval_ms))
        .with_cell_flips(!args.no_cell_flips);
    params.validate().context("invalid parameters")?;

    let out = PgmDir::new(&args.images, &args.out);
    let (io, io_task) = match seeded_board(&args)? {
        Some(board) => gol::io::spawn(Seeded {
            name: params.input_filename(),
            image: Image::from_board(&board),
            out,
        }),
        None => gol::io::spawn(out),
    };

    let (events, mut events_rx) = gol::event::channel();
    let (keys, keys_rx) = mpsc::channel(16);
    spawn_key_reader(keys);

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            log_event(&event);
        }
    });

    let turns = gol::run(
        params,
        Channels {
            events,
            io,
            keys: keys_rx,
        },
    )
    .await
    .context("simulation failed")?;

    printer.await.context("event printer failed")?;
    io_task.await.context("image i/o task failed")?;
    println!("completed {turns} turns");
    Ok(())
}
