// board.rs - Toroidal cell grid for Conway's Game of Life

use crate::error::{Error, Result};

/// A single cell. The discriminants are the pixel values used by the image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 255,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Cell::Dead),
            255 => Ok(Cell::Alive),
            other => Err(Error::InvalidCell(other)),
        }
    }
}

/// Coordinate of a cell, `x` across and `y` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

pub type Row = Vec<Cell>;

/// Offsets of the eight surrounding cells.
#[rustfmt::skip]
const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Conway's rule: survival on 2 or 3 neighbours, birth on exactly 3.
pub fn rule(cell: Cell, neighbours: usize) -> Cell {
    match (cell, neighbours) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive, // Survival
        (Cell::Dead, 3)                     => Cell::Alive, // Birth
        _                                   => Cell::Dead,  // Death or stays dead
    }
}

/// A `height x width` grid stored row by row, so `rows[y][x]` is the cell at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Row>,
}

impl Board {
    /// An all-dead board.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![Cell::Dead; width]; height],
        }
    }

    /// Builds a board from `width * height` raw pixel values in row-major order.
    ///
    /// Fails with [`Error::InputExhausted`] if the source runs dry early and with
    /// [`Error::InvalidCell`] on a value other than 0 or 255. Extra values are left unread.
    pub fn from_values<I>(width: usize, height: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let expected = width * height;
        let mut values = values.into_iter();
        let mut board = Board::new(width, height);
        let mut received = 0;
        for y in 0..height {
            for x in 0..width {
                let value = values
                    .next()
                    .ok_or(Error::InputExhausted { expected, received })?;
                board.set(x, y, Cell::try_from(value)?);
                received += 1;
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Unchecked read; panics when `(x, y)` is off the board.
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    /// Unchecked write; panics when `(x, y)` is off the board.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    /// Whether the cell at `(x, y)` is alive. With `wrap`, the coordinates are
    /// reduced onto the torus first, so `-1` is the last column or row.
    pub fn is_alive(&self, x: isize, y: isize, wrap: bool) -> bool {
        let (x, y) = if wrap { self.wrap(x, y) } else { (x as usize, y as usize) };
        self.get(x, y).is_alive()
    }

    /// Number of live cells among the eight toroidal neighbours of `(x, y)`.
    ///
    /// On boards narrower than three cells a neighbour offset can wrap back onto
    /// `(x, y)` itself; those positions are skipped.
    pub fn count_alive_neighbours(&self, x: usize, y: usize) -> usize {
        let (cx, cy) = (x as isize, y as isize);
        NEIGHBOURS
            .iter()
            .map(|&(dx, dy)| self.wrap(cx + dx, cy + dy))
            .filter(|&(nx, ny)| (nx, ny) != (x, y) && self.get(nx, ny).is_alive())
            .count()
    }

    /// The value `(x, y)` takes in the next generation.
    pub fn next_state(&self, x: usize, y: usize) -> Cell {
        rule(self.get(x, y), self.count_alive_neighbours(x, y))
    }

    /// Every live coordinate, in row-major scan order.
    pub fn alive_cells(&self) -> Vec<Point> {
        let mut alive = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.is_alive() {
                    alive.push(Point::new(x, y));
                }
            }
        }
        alive
    }

    pub fn alive_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_alive()).count())
            .sum()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }

    /// Coordinates whose value differs between `self` and `other`.
    pub fn diff(&self, other: &Board) -> Vec<Point> {
        let mut changed = Vec::new();
        for (y, (mine, theirs)) in self.rows.iter().zip(&other.rows).enumerate() {
            for (x, (a, b)) in mine.iter().zip(theirs).enumerate() {
                if a != b {
                    changed.push(Point::new(x, y));
                }
            }
        }
        changed
    }

    /// Moves the row storage out, leaving the board with no rows.
    pub(crate) fn take_rows(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }

    pub(crate) fn from_rows(width: usize, height: usize, rows: Vec<Row>) -> Self {
        debug_assert_eq!(rows.len(), height);
        Self { width, height, rows }
    }

    fn wrap(&self, x: isize, y: isize) -> (usize, usize) {
        (
            x.rem_euclid(self.width as isize) as usize,
            y.rem_euclid(self.height as isize) as usize,
        )
    }
}
