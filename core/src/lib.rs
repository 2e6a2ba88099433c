//! Maze generation rendered straight into a monochrome bitmap
//!
//! This crate carves a perfect maze over a rectangular grid with a
//! randomized depth-first search and, in the same step, flips the bits
//! of a packed 1-bit-per-pixel image buffer. There is no separate render
//! pass: every visited cell and every opened passage lands in the pixel
//! buffer the moment the generator decides on it.
//!
//! The crate is no_std (it only needs `alloc`), with an optional `std`
//! feature that adds `std::error::Error` impls for host convenience.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bitmap;
pub mod bmp;
pub mod maze_gen;
pub mod rng;

use core::fmt;

// Re-export commonly used types for convenience
pub use bitmap::{BitAddress, BitmapGeometry, PixelBuffer};
pub use bmp::{BmpError, DecodedBitmap};
pub use maze_gen::Maze;
pub use rng::{RandomSource, SimpleLCG};

/// Default maze dimensions (cells, not including walls)
pub const MAZE_COLS: usize = 256;
pub const MAZE_ROWS: usize = 256;

/// Largest cell count per axis whose image size (`2N+1`) still fits the
/// 16-bit width/height fields of the core info header.
pub const MAX_DIMENSION: usize = (u16::MAX as usize - 1) / 2;

/// Passage flags stored in a cell's mask
pub const PASSAGE_N: u8 = 1 << 0;
pub const PASSAGE_E: u8 = 1 << 1;
pub const PASSAGE_S: u8 = 1 << 2;
pub const PASSAGE_W: u8 = 1 << 3;

/// One of the four grid directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// Unshuffled visiting order: N, E, S, W
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Flag bit for this direction in a passage mask
    pub const fn flag(self) -> u8 {
        1 << (self as u8)
    }
}

/// Rectangular 4-connected grid of `cols × rows` cells.
///
/// Cells are addressed by a linear index `i` with `row = i / cols` and
/// `col = i % cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
}

impl Grid {
    /// Validate dimensions and build the grid.
    pub fn new(cols: usize, rows: usize) -> Result<Self, MazeError> {
        if cols == 0 || rows == 0 {
            return Err(MazeError::EmptyGrid { cols, rows });
        }
        if cols > MAX_DIMENSION || rows > MAX_DIMENSION {
            return Err(MazeError::GridTooLarge { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// `(row, col)` of a linear cell index
    pub const fn coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.cols, cell % self.cols)
    }

    pub const fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Neighbor of `cell` in direction `dir`, if it lies inside the grid.
    pub fn neighbor(&self, cell: usize, dir: Direction) -> Option<usize> {
        let (row, col) = self.coords(cell);
        match dir {
            Direction::North if row > 0 => Some(cell - self.cols),
            Direction::South if row + 1 < self.rows => Some(cell + self.cols),
            Direction::East if col + 1 < self.cols => Some(cell + 1),
            Direction::West if col > 0 => Some(cell - 1),
            _ => None,
        }
    }
}

/// Errors raised while setting up a maze or reading a maze bitmap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MazeError {
    /// One of the grid dimensions is zero
    EmptyGrid { cols: usize, rows: usize },
    /// The image would not fit the 16-bit header fields
    GridTooLarge { cols: usize, rows: usize },
    /// An explicit start cell lies outside the grid
    InvalidStartCell { cell: usize, cells: usize },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::EmptyGrid { cols, rows } => {
                write!(f, "maze grid {}x{} has no cells", cols, rows)
            }
            MazeError::GridTooLarge { cols, rows } => write!(
                f,
                "maze grid {}x{} exceeds the maximum of {} cells per side",
                cols, rows, MAX_DIMENSION
            ),
            MazeError::InvalidStartCell { cell, cells } => write!(
                f,
                "start cell {} is outside a grid of {} cells",
                cell, cells
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MazeError {}
