//! Bit addressing inside a packed, row-padded 1-bit image
//!
//! The image for a `cols × rows` maze is `2*cols+1` pixels wide and
//! `2*rows+1` pixels tall. Odd coordinates hold cells, even ones hold
//! walls, and the pixel between two cell pixels is their passage:
//!
//! ```text
//!   x: 0 1 2 3 4
//! y:0  # # # # #
//!   1  # c p c #     c = cell (row 0), p = passage between cells
//!   2  # p # # #
//!   3  # c p c #     c = cell (row 1)
//!   4  # # # # #
//! ```
//!
//! Pixel row `y` is stored row `y` of the buffer, each row padded to a
//! 32-bit boundary with pixels packed most-significant-bit first, so a
//! cell at `(row, col)` is bit `(2*row+1) * stride * 8 + 2*col+1`. BMP
//! stores rows bottom-to-top, which puts maze row 0 at the bottom of the
//! picture; moving north means one row stride *back* in the buffer.

use alloc::vec;
use alloc::vec::Vec;

use crate::{Direction, Grid, MazeError};

/// Rows are padded to this many bits
pub const ROW_ALIGN_BITS: usize = 32;

/// Bytes needed for one padded row of `width` 1-bit pixels
pub const fn row_stride(width: usize) -> usize {
    (width + ROW_ALIGN_BITS - 1) / ROW_ALIGN_BITS * (ROW_ALIGN_BITS / 8)
}

/// Location of a single pixel bit: a byte offset plus a bit within it
/// counted from the most significant end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitAddress {
    pub byte: usize,
    pub bit: u8,
}

impl BitAddress {
    pub const fn from_bit_index(index: usize) -> Self {
        Self {
            byte: index / 8,
            bit: (index % 8) as u8,
        }
    }

    pub const fn bit_index(self) -> usize {
        self.byte * 8 + self.bit as usize
    }

    /// Mask selecting this bit inside its byte (MSB first)
    pub const fn mask(self) -> u8 {
        0x80 >> self.bit
    }

    /// Address of the pixel adjacent to this one in `dir`.
    ///
    /// North/south keep the bit and move a whole stride. East/west move one
    /// bit and carry into the neighboring byte at the byte edges. The caller
    /// guarantees the result stays inside the buffer.
    pub const fn step(self, dir: Direction, row_stride: usize) -> Self {
        match dir {
            Direction::North => Self {
                byte: self.byte - row_stride,
                bit: self.bit,
            },
            Direction::South => Self {
                byte: self.byte + row_stride,
                bit: self.bit,
            },
            Direction::East => {
                if self.bit == 7 {
                    Self {
                        byte: self.byte + 1,
                        bit: 0,
                    }
                } else {
                    Self {
                        byte: self.byte,
                        bit: self.bit + 1,
                    }
                }
            }
            Direction::West => {
                if self.bit == 0 {
                    Self {
                        byte: self.byte - 1,
                        bit: 7,
                    }
                } else {
                    Self {
                        byte: self.byte,
                        bit: self.bit - 1,
                    }
                }
            }
        }
    }
}

/// Address of pixel `(x, y)` in a buffer of `row_stride`-byte rows, where
/// `y` is the stored row (the first stored row is the bottom of the image).
pub const fn image_bit_address(x: usize, y: usize, row_stride: usize) -> BitAddress {
    BitAddress::from_bit_index(y * row_stride * 8 + x)
}

/// Image geometry derived from a maze grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapGeometry {
    grid: Grid,
    width: usize,
    height: usize,
    row_stride: usize,
}

impl BitmapGeometry {
    pub fn for_grid(cols: usize, rows: usize) -> Result<Self, MazeError> {
        Grid::new(cols, rows).map(Self::new)
    }

    pub fn new(grid: Grid) -> Self {
        let width = grid.cols() * 2 + 1;
        let height = grid.rows() * 2 + 1;
        Self {
            grid,
            width,
            height,
            row_stride: row_stride(width),
        }
    }

    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Image width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Bytes per stored row, padding included
    pub const fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Size of the whole packed pixel buffer in bytes
    pub const fn pixel_bytes(&self) -> usize {
        self.row_stride * self.height
    }

    pub const fn pixel_address(&self, x: usize, y: usize) -> BitAddress {
        image_bit_address(x, y, self.row_stride)
    }

    /// Bit of the cell's own pixel at image `(2*col+1, 2*row+1)`
    pub const fn cell_address(&self, cell: usize) -> BitAddress {
        let (row, col) = self.grid.coords(cell);
        self.pixel_address(col * 2 + 1, row * 2 + 1)
    }

    /// Bit of the passage pixel leaving `cell` towards `dir`
    pub const fn passage_address(&self, cell: usize, dir: Direction) -> BitAddress {
        self.cell_address(cell).step(dir, self.row_stride)
    }
}

/// Zero-initialized packed pixel buffer for one maze image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    geometry: BitmapGeometry,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(geometry: BitmapGeometry) -> Self {
        Self {
            geometry,
            bytes: vec![0; geometry.pixel_bytes()],
        }
    }

    /// Render passage masks (one per cell) straight into a fresh buffer.
    ///
    /// Every cell pixel is set, plus the passage pixel for each flag found.
    /// A passage recorded on only one side still sets its pixel.
    pub fn from_passages(geometry: BitmapGeometry, passages: &[u8]) -> Self {
        debug_assert_eq!(passages.len(), geometry.grid().cell_count());
        let mut buffer = Self::new(geometry);
        for (cell, &mask) in passages.iter().enumerate() {
            buffer.set(geometry.cell_address(cell));
            for dir in Direction::ALL {
                if mask & dir.flag() != 0 && geometry.grid().neighbor(cell, dir).is_some() {
                    buffer.set(geometry.passage_address(cell, dir));
                }
            }
        }
        buffer
    }

    pub const fn geometry(&self) -> &BitmapGeometry {
        &self.geometry
    }

    /// Set a bit. Setting an already-set bit leaves the buffer unchanged.
    pub fn set(&mut self, addr: BitAddress) {
        self.bytes[addr.byte] |= addr.mask();
    }

    pub fn is_set(&self, addr: BitAddress) -> bool {
        self.bytes[addr.byte] & addr.mask() != 0
    }

    /// Pixel `(x, y)`, `y` counted in stored-row order
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.is_set(self.geometry.pixel_address(x, y))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Rebuild per-cell passage masks from the pixel bits alone.
    pub fn passages(&self) -> Vec<u8> {
        reconstruct_passages(&self.geometry, &self.bytes)
    }
}

/// Read back the passage mask of every cell from a packed buffer laid out
/// according to `geometry`.
pub fn reconstruct_passages(geometry: &BitmapGeometry, bytes: &[u8]) -> Vec<u8> {
    let grid = geometry.grid();
    (0..grid.cell_count())
        .map(|cell| {
            Direction::ALL
                .iter()
                .filter(|&&dir| grid.neighbor(cell, dir).is_some())
                .filter(|&&dir| {
                    let addr = geometry.passage_address(cell, dir);
                    bytes[addr.byte] & addr.mask() != 0
                })
                .fold(0u8, |mask, dir| mask | dir.flag())
        })
        .collect()
}
