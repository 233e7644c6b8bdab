use std::time::Duration;

use gol::io::{self, Image};
use gol::patterns::{self, apply_pattern};
use gol::pgm::{self, PgmDir};
use gol::{Board, Channels, Error, Event, MemoryStore, Params, Point, State, event};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Harness {
    store: MemoryStore,
    keys: mpsc::Sender<char>,
    events: mpsc::UnboundedReceiver<Event>,
    session: JoinHandle<gol::Result<u64>>,
}

fn start(board: &Board, params: Params) -> Harness {
    let store = MemoryStore::new();
    store.insert(params.input_filename(), Image::from_board(board));
    start_with_store(store, params)
}

fn start_with_store(store: MemoryStore, params: Params) -> Harness {
    let (io, _io_task) = io::spawn(store.clone());
    let (events, events_rx) = event::channel();
    let (keys, keys_rx) = mpsc::channel(8);
    let session = tokio::spawn(gol::run(
        params,
        Channels {
            events,
            io,
            keys: keys_rx,
        },
    ));
    Harness {
        store,
        keys,
        events: events_rx,
        session,
    }
}

async fn drain(events: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut all = Vec::new();
    while let Some(event) = events.recv().await {
        all.push(event);
    }
    all
}

fn turn_completes(events: &[Event]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::TurnComplete { completed_turns } => Some(*completed_turns),
            _ => None,
        })
        .collect()
}

fn assert_shutdown_order(events: &[Event], final_turn: u64) {
    let n = events.len();
    assert!(n >= 2);
    match &events[n - 2] {
        Event::FinalTurnComplete { completed_turns, .. } => assert_eq!(*completed_turns, final_turn),
        other => panic!("expected final turn event, got {other:?}"),
    }
    assert_eq!(
        events[n - 1],
        Event::StateChange {
            completed_turns: final_turn,
            new_state: State::Quitting
        }
    );
}

fn glider_board() -> Board {
    let mut board = Board::new(16, 16);
    apply_pattern(&mut board, patterns::find("glider").unwrap(), 1, 1);
    board
}

#[tokio::test]
async fn runs_to_turn_limit() {
    let board = glider_board();
    let mut h = start(&board, Params::new(16, 16, 4, 20));

    assert_eq!(h.session.await.unwrap().unwrap(), 20);
    let events = drain(&mut h.events).await;

    let initial: Vec<_> = events
        .iter()
        .take_while(|e| matches!(e, Event::CellFlipped { completed_turns: 0, .. }))
        .collect();
    assert_eq!(initial.len(), 5);
    assert_eq!(
        events[5],
        Event::StateChange {
            completed_turns: 0,
            new_state: State::Executing
        }
    );

    assert_eq!(turn_completes(&events), (1..=20).collect::<Vec<_>>());
    assert_shutdown_order(&events, 20);

    // A glider moves one cell diagonally every four turns.
    let image = h.store.get("16x16x20").expect("final image written");
    let expected: Vec<Point> = board
        .alive_cells()
        .into_iter()
        .map(|p| Point::new(p.x + 5, p.y + 5))
        .collect();
    assert_eq!(image.to_board().unwrap().alive_cells(), expected);
    match &events[events.len() - 2] {
        Event::FinalTurnComplete { alive, .. } => assert_eq!(alive, &expected),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn cell_flips_follow_each_swap() {
    let mut board = Board::new(5, 5);
    apply_pattern(&mut board, patterns::find("blinker").unwrap(), 1, 2);
    let mut h = start(&board, Params::new(5, 5, 2, 2));

    assert_eq!(h.session.await.unwrap().unwrap(), 2);
    let events = drain(&mut h.events).await;

    let flips: Vec<(u64, Point)> = events
        .iter()
        .filter_map(|e| match e {
            Event::CellFlipped { completed_turns, cell } if *completed_turns > 0 => {
                Some((*completed_turns, *cell))
            }
            _ => None,
        })
        .collect();
    // Each turn the two end cells die and two new ones are born.
    assert_eq!(flips.iter().filter(|(t, _)| *t == 1).count(), 4);
    assert_eq!(flips.iter().filter(|(t, _)| *t == 2).count(), 4);

    let first_turn = events
        .iter()
        .position(|e| *e == Event::TurnComplete { completed_turns: 1 })
        .unwrap();
    assert!(events[..first_turn]
        .iter()
        .all(|e| !matches!(e, Event::CellFlipped { completed_turns: 2, .. })));
    assert_eq!(h.store.get("5x5x2").unwrap(), Image::from_board(&board));
}

#[tokio::test]
async fn zero_turns_reports_initial_board() {
    let board = glider_board();
    let mut h = start(&board, Params::new(16, 16, 1, 0).with_cell_flips(false));

    assert_eq!(h.session.await.unwrap().unwrap(), 0);
    let events = drain(&mut h.events).await;
    assert!(turn_completes(&events).is_empty());
    assert_shutdown_order(&events, 0);
    assert_eq!(h.store.get("16x16x0"), Some(Image::from_board(&board)));
}

#[tokio::test]
async fn quit_key_ends_run_early() {
    let board = glider_board();
    let mut h = start(&board, Params::new(16, 16, 2, u64::MAX));
    h.keys.send('x').await.unwrap();
    h.keys.send('q').await.unwrap();

    let turns = h.session.await.unwrap().unwrap();
    assert!(turns < u64::MAX);

    let events = drain(&mut h.events).await;
    assert_eq!(turn_completes(&events), (1..=turns).collect::<Vec<_>>());
    assert_shutdown_order(&events, turns);
    assert!(h.store.get(&format!("16x16x{turns}")).is_some());
}

#[tokio::test]
async fn save_key_writes_snapshot_without_stopping() {
    let board = glider_board();
    let mut h = start(&board, Params::new(16, 16, 3, u64::MAX));
    h.keys.send('s').await.unwrap();
    h.keys.send('q').await.unwrap();

    let turns = h.session.await.unwrap().unwrap();
    let events = drain(&mut h.events).await;

    let images: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::ImageOutputComplete { .. }))
        .collect();
    assert_eq!(images.len(), 2);
    match images[0] {
        Event::ImageOutputComplete { completed_turns, filename } => {
            assert!(*completed_turns <= turns);
            assert_eq!(filename, &format!("16x16x{completed_turns}"));
            assert!(h.store.get(filename).is_some());
        }
        _ => unreachable!(),
    }
    assert_shutdown_order(&events, turns);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn monitor_reports_while_running() {
    let mut board = Board::new(8, 8);
    apply_pattern(&mut board, patterns::find("block").unwrap(), 3, 3);
    let params = Params::new(8, 8, 2, u64::MAX)
        .with_alive_interval(Duration::from_millis(10))
        .with_cell_flips(false);
    let mut h = start(&board, params);

    loop {
        match h.events.recv().await {
            Some(Event::AliveCellsCount { cells_count, .. }) => {
                assert_eq!(cells_count, 4);
                break;
            }
            Some(_) => continue,
            None => panic!("event stream closed before any count"),
        }
    }
    h.keys.send('q').await.unwrap();

    let turns = h.session.await.unwrap().unwrap();
    let rest = drain(&mut h.events).await;
    assert_shutdown_order(&rest, turns);
}

#[tokio::test]
async fn invalid_params_fail_before_running() {
    let board = glider_board();
    let mut h = start(&board, Params::new(16, 16, 0, 10));

    let err = h.session.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::InvalidParams { field: "threads", .. }));
    assert!(drain(&mut h.events).await.is_empty());
    assert!(h.store.filenames().iter().all(|name| name == "16x16"));
}

#[tokio::test]
async fn short_input_fails_before_running() {
    let store = MemoryStore::new();
    store.insert(
        "4x4",
        Image {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        },
    );
    let mut h = start_with_store(store, Params::new(4, 4, 2, 10));

    let err = h.session.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::InputExhausted { expected: 16, received: 10 }));
    assert!(drain(&mut h.events).await.is_empty());
}

#[tokio::test]
async fn bad_pixel_fails_before_running() {
    let store = MemoryStore::new();
    store.insert(
        "2x2",
        Image {
            width: 2,
            height: 2,
            pixels: vec![0, 255, 128, 0],
        },
    );
    let mut h = start_with_store(store, Params::new(2, 2, 1, 1));

    let err = h.session.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::InvalidCell(128)));
    assert!(drain(&mut h.events).await.is_empty());
}

async fn run_from_dir(dir: &std::path::Path, params: Params) -> gol::Result<u64> {
    let (io, _io_task) = io::spawn(PgmDir::new(dir, dir.join("out")));
    let (events, _events_rx) = event::channel();
    let (_keys, keys_rx) = mpsc::channel(1);
    gol::run(
        params,
        Channels {
            events,
            io,
            keys: keys_rx,
        },
    )
    .await
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("gol-session-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn missing_image_file_is_an_io_error() {
    let dir = scratch_dir("missing");
    let err = run_from_dir(&dir, Params::new(4, 4, 1, 1)).await.unwrap_err();
    match err {
        Error::Io(err) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected an i/o error, got {other:?}"),
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn image_with_other_dimensions_is_rejected() {
    let dir = scratch_dir("reshaped");
    // Same pixel count as 8x2, but a 4x4 image.
    std::fs::write(dir.join("8x2.pgm"), pgm::encode(4, 4, &[255; 16])).unwrap();

    let err = run_from_dir(&dir, Params::new(8, 2, 1, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::ImageSize { expected: (8, 2), found: (4, 4), .. }
    ));
    assert!(!dir.join("out").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn malformed_image_file_is_a_pgm_error() {
    let dir = scratch_dir("malformed");
    std::fs::write(dir.join("4x4.pgm"), b"P5\n4294967296 4294967296\n255\n\0").unwrap();

    let err = run_from_dir(&dir, Params::new(4, 4, 1, 1)).await.unwrap_err();
    assert!(matches!(err, Error::Pgm(_)));
    std::fs::remove_dir_all(&dir).unwrap();
}
