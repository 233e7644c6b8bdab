// io.rs - Command protocol between the simulation and the image i/o task
//
// The i/o task owns an `ImageStore` and runs commands strictly in order, so a
// `CheckIdle` reply means every earlier write has reached the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};

use crate::board::{Board, Cell};
use crate::error::{Error, Result};

pub enum IoCommand {
    /// Load the named image, report the outcome on `loaded`, then stream its
    /// pixel values, row-major, into `cells`. The image must be `width x height`.
    Input {
        filename: String,
        width: usize,
        height: usize,
        loaded: oneshot::Sender<Result<()>>,
        cells: mpsc::Sender<u8>,
    },
    /// Persist `width * height` cells arriving on `cells` under `filename`.
    Output {
        filename: String,
        width: usize,
        height: usize,
        cells: mpsc::Receiver<Cell>,
    },
    /// Answered once all earlier commands have completed.
    CheckIdle { idle: oneshot::Sender<bool> },
}

/// Where images are loaded from and saved to.
pub trait ImageStore: Send + 'static {
    fn load(&mut self, filename: &str) -> Result<Image>;
    fn save(&mut self, filename: &str, width: usize, height: usize, pixels: &[u8]) -> Result<()>;
}

/// Client side of the i/o task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct IoHandle {
    commands: mpsc::UnboundedSender<IoCommand>,
}

impl IoHandle {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IoCommand>) {
        let (commands, rx) = mpsc::unbounded_channel();
        (Self { commands }, rx)
    }

    fn command(&self, command: IoCommand) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::IoClosed)
    }

    /// Reads `width * height` cells for the named image.
    pub async fn read_image(&self, filename: &str, width: usize, height: usize) -> Result<Board> {
        let (tx, mut rx) = mpsc::channel(width.max(1));
        let (loaded_tx, loaded_rx) = oneshot::channel();
        self.command(IoCommand::Input {
            filename: filename.to_owned(),
            width,
            height,
            loaded: loaded_tx,
            cells: tx,
        })?;
        loaded_rx.await.map_err(|_| Error::IoClosed)??;

        let expected = width * height;
        let mut values = Vec::with_capacity(expected);
        while values.len() < expected {
            match rx.recv().await {
                Some(value) => values.push(value),
                None => break,
            }
        }
        Board::from_values(width, height, values)
    }

    /// Streams every cell of `board` to the named image.
    pub async fn write_image(&self, filename: &str, board: &Board) -> Result<()> {
        let (tx, rx) = mpsc::channel(board.width().max(1));
        self.command(IoCommand::Output {
            filename: filename.to_owned(),
            width: board.width(),
            height: board.height(),
            cells: rx,
        })?;
        for cell in board.cells() {
            tx.send(cell).await.map_err(|_| Error::IoClosed)?;
        }
        Ok(())
    }

    pub async fn check_idle(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.command(IoCommand::CheckIdle { idle: tx })?;
        rx.await.map_err(|_| Error::IoClosed)
    }

    /// Blocks until the i/o task confirms it has nothing in flight.
    pub async fn wait_idle(&self) -> Result<()> {
        while !self.check_idle().await? {
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

/// Runs the i/o task until every `IoHandle` has been dropped.
///
/// Load failures go back to the reader; save failures are logged.
pub async fn run<S: ImageStore>(mut store: S, mut commands: mpsc::UnboundedReceiver<IoCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            IoCommand::Input { filename, width, height, loaded, cells } => {
                let image = store.load(&filename).and_then(|image| {
                    if (image.width, image.height) == (width, height) {
                        Ok(image)
                    } else {
                        Err(Error::ImageSize {
                            filename: filename.clone(),
                            expected: (width, height),
                            found: (image.width, image.height),
                        })
                    }
                });
                let image = match image {
                    Ok(image) => image,
                    Err(err) => {
                        tracing::error!(%err, %filename, "failed to load image");
                        let _ = loaded.send(Err(err));
                        continue;
                    }
                };
                if loaded.send(Ok(())).is_err() {
                    continue;
                }
                for value in image.pixels {
                    if cells.send(value).await.is_err() {
                        break;
                    }
                }
            }
            IoCommand::Output { filename, width, height, mut cells } => {
                let mut pixels = Vec::with_capacity(width * height);
                while let Some(cell) = cells.recv().await {
                    pixels.push(cell.value());
                }
                if pixels.len() != width * height {
                    tracing::warn!(
                        %filename,
                        expected = width * height,
                        received = pixels.len(),
                        "image stream ended early, not saving"
                    );
                    continue;
                }
                match store.save(&filename, width, height, &pixels) {
                    Ok(()) => tracing::debug!(%filename, "image saved"),
                    Err(err) => tracing::error!(%err, %filename, "failed to save image"),
                }
            }
            IoCommand::CheckIdle { idle } => {
                let _ = idle.send(true);
            }
        }
    }
}

/// Spawns the i/o task on the current runtime.
pub fn spawn<S: ImageStore>(store: S) -> (IoHandle, tokio::task::JoinHandle<()>) {
    let (handle, commands) = IoHandle::new();
    (handle, tokio::spawn(run(store, commands)))
}

/// An image kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn from_board(board: &Board) -> Self {
        Self {
            width: board.width(),
            height: board.height(),
            pixels: board.cells().map(Cell::value).collect(),
        }
    }

    pub fn to_board(&self) -> Result<Board> {
        Board::from_values(self.width, self.height, self.pixels.iter().copied())
    }
}

/// Store backed by a shared map, so a test or caller can inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: Arc<Mutex<HashMap<String, Image>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, filename: impl Into<String>, image: Image) {
        self.lock().insert(filename.into(), image);
    }

    pub fn get(&self, filename: &str) -> Option<Image> {
        self.lock().get(filename).cloned()
    }

    pub fn filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Image>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageStore for MemoryStore {
    fn load(&mut self, filename: &str) -> Result<Image> {
        self.get(filename).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no image named {filename}"),
            ))
        })
    }

    fn save(&mut self, filename: &str, width: usize, height: usize, pixels: &[u8]) -> Result<()> {
        self.insert(
            filename,
            Image {
                width,
                height,
                pixels: pixels.to_vec(),
            },
        );
        Ok(())
    }
}
