// patterns.rs - Named starting patterns and a pseudo-random filler

use crate::board::{Board, Cell};

pub struct Pattern {
    pub name: &'static str,
    /// Live cells as `(x, y)` offsets from the pattern origin.
    pub cells: &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Stamps `pattern` onto `board` with its origin at `(x, y)`, wrapping at the edges.
pub fn apply_pattern(board: &mut Board, pattern: &Pattern, x: usize, y: usize) {
    let (width, height) = (board.width(), board.height());
    for &(dx, dy) in pattern.cells {
        board.set((x + dx) % width, (y + dy) % height, Cell::Alive);
    }
}

/// Fills every cell from a simple LCG; roughly a third of the cells come out alive.
pub fn apply_random_pattern(board: &mut Board, seed_value: u64) {
    let mut seed = seed_value;
    for y in 0..board.height() {
        for x in 0..board.width() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let cell = if (seed >> 33) % 3 == 0 { Cell::Alive } else { Cell::Dead };
            board.set(x, y, cell);
        }
    }
}
