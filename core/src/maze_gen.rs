//! Maze generation using a randomized depth-first search
//!
//! Algorithm: Recursive Backtracker, run on an explicit stack
//! 1. Pick a uniformly random start cell and visit it
//! 2. Visiting a cell marks it, sets its pixel and shuffles N/E/S/W
//! 3. While the stack is not empty, look at the top frame:
//!    - Take its next direction; if the neighbor there exists and is
//!      unvisited, open the passage (both masks plus the passage pixel)
//!      and visit the neighbor, pushing a new frame
//!    - If its directions are exhausted, pop it (backtrack)
//!
//! The stack frames carry the shuffled direction list and a cursor, so the
//! order of random draws and bit flips is exactly that of the plain
//! recursive formulation, with heap usage instead of call-stack depth.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::bitmap::{BitmapGeometry, PixelBuffer};
use crate::bmp;
use crate::rng::{shuffle, RandomSource, SimpleLCG};
use crate::{Direction, Grid, MazeError};

/// Per-cell state: passage mask plus an explicit visited flag.
///
/// The visited flag is tracked on its own instead of reading "no passages"
/// as "not entered yet".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cell {
    passages: u8,
    visited: bool,
}

/// One suspended visit: the cell and where it is in its shuffled list
#[derive(Clone, Copy, Debug)]
struct Frame {
    cell: usize,
    dirs: [Direction; 4],
    next: usize,
}

impl Frame {
    fn next_direction(&mut self) -> Option<Direction> {
        let dir = self.dirs.get(self.next).copied();
        self.next += 1;
        dir
    }
}

/// A generated maze together with its rendered pixel buffer
#[derive(Clone, PartialEq, Eq)]
pub struct Maze {
    grid: Grid,
    cells: Vec<Cell>,
    pixels: PixelBuffer,
    start: usize,
}

impl Maze {
    /// Generate a maze whose randomness comes entirely from `seed`.
    pub fn from_seed(cols: usize, rows: usize, seed: u32) -> Result<Self, MazeError> {
        let mut rng = SimpleLCG::new(seed);
        Self::generate(cols, rows, &mut rng)
    }

    /// Generate a maze, drawing the start cell from `rng` first.
    pub fn generate<R: RandomSource>(
        cols: usize,
        rows: usize,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let grid = Grid::new(cols, rows)?;
        let start = rng.below(grid.cell_count());
        Ok(Self::carve(grid, start, rng))
    }

    /// Generate a maze rooted at a caller-chosen start cell.
    pub fn generate_from<R: RandomSource>(
        cols: usize,
        rows: usize,
        start: usize,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let grid = Grid::new(cols, rows)?;
        if start >= grid.cell_count() {
            return Err(MazeError::InvalidStartCell {
                cell: start,
                cells: grid.cell_count(),
            });
        }
        Ok(Self::carve(grid, start, rng))
    }

    fn carve<R: RandomSource>(grid: Grid, start: usize, rng: &mut R) -> Self {
        let mut maze = Self {
            grid,
            cells: vec![Cell::default(); grid.cell_count()],
            pixels: PixelBuffer::new(BitmapGeometry::new(grid)),
            start,
        };

        let mut stack = Vec::with_capacity(grid.cell_count().min(1 << 16));
        stack.push(maze.visit(start, rng));

        while let Some(frame) = stack.last_mut() {
            let Some(dir) = frame.next_direction() else {
                // Directions exhausted, backtrack
                stack.pop();
                continue;
            };
            let current = frame.cell;

            let Some(next) = maze.grid.neighbor(current, dir) else {
                continue;
            };
            if maze.cells[next].visited {
                continue;
            }

            maze.open_passage(current, next, dir);
            let frame = maze.visit(next, rng);
            stack.push(frame);
        }

        maze
    }

    /// Mark a cell visited, light its pixel and shuffle its directions.
    fn visit<R: RandomSource>(&mut self, cell: usize, rng: &mut R) -> Frame {
        self.cells[cell].visited = true;
        let addr = self.pixels.geometry().cell_address(cell);
        self.pixels.set(addr);

        let mut dirs = Direction::ALL;
        shuffle(rng, &mut dirs);
        Frame { cell, dirs, next: 0 }
    }

    /// Record the passage on both cells and light the pixel between them.
    fn open_passage(&mut self, from: usize, to: usize, dir: Direction) {
        self.cells[from].passages |= dir.flag();
        self.cells[to].passages |= dir.opposite().flag();
        let addr = self.pixels.geometry().passage_address(from, dir);
        self.pixels.set(addr);
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Root cell of the depth-first search
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn geometry(&self) -> &BitmapGeometry {
        self.pixels.geometry()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Passage mask of a cell (`PASSAGE_*` flags)
    pub fn passages(&self, cell: usize) -> u8 {
        self.cells[cell].passages
    }

    /// Passage masks of every cell, in cell order
    pub fn passage_masks(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| cell.passages).collect()
    }

    pub fn has_passage(&self, cell: usize, dir: Direction) -> bool {
        self.cells[cell].passages & dir.flag() != 0
    }

    pub fn is_visited(&self, cell: usize) -> bool {
        self.cells[cell].visited
    }

    /// Number of opened passages, each counted once
    pub fn passage_count(&self) -> usize {
        let flags: u32 = self.cells.iter().map(|cell| cell.passages.count_ones()).sum();
        flags as usize / 2
    }

    /// Encode the full BMP file: headers, color table and pixel data.
    pub fn to_bmp(&self) -> Vec<u8> {
        bmp::encode(&self.pixels)
    }

    /// Text view of the pixel buffer, maze row 0 first: `#` wall, space open.
    pub fn to_ascii(&self) -> String {
        let geometry = self.geometry();
        let mut out = String::with_capacity((geometry.width() + 1) * geometry.height());
        for y in 0..geometry.height() {
            for x in 0..geometry.width() {
                out.push(if self.pixels.pixel(x, y) { ' ' } else { '#' });
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maze")
            .field("cols", &self.cols())
            .field("rows", &self.rows())
            .field("start", &self.start)
            .field("passages", &self.passage_count())
            .finish()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::reconstruct_passages;
    use alloc::collections::VecDeque;

    /// Replays draws in order, then keeps answering 0
    struct Scripted {
        draws: Vec<usize>,
        pos: usize,
    }

    impl Scripted {
        fn new(draws: &[usize]) -> Self {
            Self {
                draws: draws.to_vec(),
                pos: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn below(&mut self, bound: usize) -> usize {
            let value = self.draws.get(self.pos).copied().unwrap_or(0);
            self.pos += 1;
            assert!(value < bound);
            value
        }
    }

    fn reachable_from_start(maze: &Maze) -> usize {
        let grid = maze.grid();
        let mut seen = vec![false; grid.cell_count()];
        let mut queue = VecDeque::new();
        seen[maze.start()] = true;
        queue.push_back(maze.start());
        let mut count = 0;

        while let Some(cell) = queue.pop_front() {
            count += 1;
            for dir in Direction::ALL {
                if !maze.has_passage(cell, dir) {
                    continue;
                }
                let next = grid.neighbor(cell, dir).expect("passage leads off the grid");
                assert!(maze.has_passage(next, dir.opposite()), "one-sided passage");
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    #[test]
    fn test_maze_generation() {
        let maze = Maze::from_seed(5, 5, 12345).unwrap();

        assert_eq!(maze.geometry().width(), 11);
        assert_eq!(maze.geometry().height(), 11);

        // Every cell pixel is open, every corner is wall
        for cell in 0..25 {
            assert!(maze.is_visited(cell));
            assert!(maze.pixels().is_set(maze.geometry().cell_address(cell)));
        }
        assert!(!maze.pixels().pixel(0, 0));
        assert!(!maze.pixels().pixel(10, 10));
    }

    #[test]
    fn test_spanning_tree() {
        for seed in [1, 42, 12345, 2918957128] {
            let maze = Maze::from_seed(17, 9, seed).unwrap();
            let cells = maze.grid().cell_count();

            assert_eq!(maze.passage_count(), cells - 1);
            assert_eq!(reachable_from_start(&maze), cells);
        }
    }

    #[test]
    fn test_pixels_match_passages() {
        let maze = Maze::from_seed(23, 11, 99999).unwrap();
        let expected = PixelBuffer::from_passages(*maze.geometry(), &maze.passage_masks());

        assert_eq!(maze.pixels(), &expected);
        assert_eq!(
            reconstruct_passages(maze.geometry(), maze.pixels().as_bytes()),
            maze.passage_masks()
        );
    }

    #[test]
    fn test_set_bit_count() {
        // Image content is exactly the cells plus the opened passages
        let maze = Maze::from_seed(20, 20, 2918957128).unwrap();
        let ones: u32 = maze.pixels().as_bytes().iter().map(|b| b.count_ones()).sum();
        assert_eq!(ones as usize, 400 + 399);
    }

    #[test]
    fn test_determinism() {
        let maze1 = Maze::from_seed(10, 10, 99999).unwrap();
        let maze2 = Maze::from_seed(10, 10, 99999).unwrap();

        assert_eq!(maze1, maze2);
        assert_eq!(maze1.to_bmp(), maze2.to_bmp());
    }

    #[test]
    fn test_different_seeds() {
        let maze1 = Maze::from_seed(10, 10, 11111).unwrap();
        let maze2 = Maze::from_seed(10, 10, 22222).unwrap();

        // Different seeds should (almost certainly) produce different mazes
        assert_ne!(maze1.pixels(), maze2.pixels());
    }

    #[test]
    fn test_scripted_walk_2x2() {
        // Start at 0; every shuffle draws 0, 0, 0 which turns N,E,S,W into E,S,W,N
        let mut rng = Scripted::new(&[0]);
        let maze = Maze::generate(2, 2, &mut rng).unwrap();

        // 0 -E-> 1 -S-> 3 -W-> 2
        assert_eq!(maze.start(), 0);
        assert_eq!(maze.passages(0), Direction::East.flag());
        assert_eq!(maze.passages(1), Direction::West.flag() | Direction::South.flag());
        assert_eq!(maze.passages(3), Direction::North.flag() | Direction::West.flag());
        assert_eq!(maze.passages(2), Direction::East.flag());

        // 1 start draw + 3 draws per visited cell
        assert_eq!(rng.pos, 1 + 4 * 3);

        assert_eq!(maze.to_ascii(), "#####\n#   #\n### #\n#   #\n#####\n");
    }

    #[test]
    fn test_explicit_start_cell() {
        let mut rng = SimpleLCG::new(5);
        let maze = Maze::generate_from(6, 4, 23, &mut rng).unwrap();
        assert_eq!(maze.start(), 23);
        assert_eq!(maze.passage_count(), 23);

        let mut rng = SimpleLCG::new(5);
        assert_eq!(
            Maze::generate_from(6, 4, 24, &mut rng),
            Err(MazeError::InvalidStartCell { cell: 24, cells: 24 })
        );
    }

    #[test]
    fn test_single_cell() {
        let maze = Maze::from_seed(1, 1, 7).unwrap();
        assert_eq!(maze.passage_count(), 0);
        assert!(maze.is_visited(0));
        assert_eq!(maze.to_ascii(), "###\n# #\n###\n");
    }

    #[test]
    fn test_corridors() {
        // 1xN and Nx1 grids have only one possible maze
        let row = Maze::from_seed(9, 1, 3).unwrap();
        for cell in 0..8 {
            assert!(row.has_passage(cell, Direction::East));
        }
        assert_eq!(row.passage_count(), 8);

        let column = Maze::from_seed(1, 9, 3).unwrap();
        for cell in 0..8 {
            assert!(column.has_passage(cell, Direction::South));
        }
        assert_eq!(column.passage_count(), 8);
    }

    #[test]
    fn test_large_grid_does_not_recurse() {
        // Deep enough to overflow a native call stack with naive recursion
        let maze = Maze::from_seed(1, 20000, 1).unwrap();
        assert_eq!(maze.passage_count(), 19999);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert_eq!(
            Maze::from_seed(0, 10, 1),
            Err(MazeError::EmptyGrid { cols: 0, rows: 10 })
        );
    }
}
