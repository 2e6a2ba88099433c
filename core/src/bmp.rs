//! Monochrome BMP container
//!
//! Layout (all multi-byte fields little-endian):
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 2    | magic `"BM"`                           |
//! | 2      | 4    | total file size                        |
//! | 6      | 4    | reserved (zero)                        |
//! | 10     | 4    | offset of the pixel data               |
//! | 14     | 4    | core header size (12)                  |
//! | 18     | 2    | width in pixels                        |
//! | 20     | 2    | height in pixels                       |
//! | 22     | 2    | color planes (1)                       |
//! | 24     | 2    | bits per pixel (1)                     |
//! | 26     | 6    | color table: black, white (B, G, R)    |
//! | 32     | ...  | pixel rows, bottom-up, 4-byte aligned  |

use alloc::vec::Vec;
use core::fmt;

use crate::bitmap::{self, reconstruct_passages, BitmapGeometry, PixelBuffer};

pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 12;
pub const BITS_PER_PIXEL: u16 = 1;
pub const COLOR_TABLE_SIZE: usize = (1 << BITS_PER_PIXEL) * 3;
pub const PIXEL_DATA_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE + COLOR_TABLE_SIZE;

/// Color table, B-G-R per entry: 0 = black background, 1 = white foreground
pub const PALETTE: [[u8; 3]; 2] = [[0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF]];

const MAGIC: [u8; 2] = *b"BM";

/// Total file size for an image with the given geometry
pub const fn file_size(geometry: &BitmapGeometry) -> usize {
    PIXEL_DATA_OFFSET + geometry.pixel_bytes()
}

/// Assemble the complete file: headers, color table, then the pixel rows.
///
/// Width and height fit in `u16` because grid dimensions are capped at
/// `MAX_DIMENSION`; the file size therefore fits in `u32` as well.
pub fn encode(pixels: &PixelBuffer) -> Vec<u8> {
    let geometry = pixels.geometry();
    let size = file_size(geometry);
    let mut out = Vec::with_capacity(size);

    // File header
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(PIXEL_DATA_OFFSET as u32).to_le_bytes());

    // Core info header
    out.extend_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
    out.extend_from_slice(&(geometry.width() as u16).to_le_bytes());
    out.extend_from_slice(&(geometry.height() as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());

    for entry in PALETTE {
        out.extend_from_slice(&entry);
    }

    out.extend_from_slice(pixels.as_bytes());
    debug_assert_eq!(out.len(), size);
    out
}

/// Reasons a byte buffer is not a readable maze bitmap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmpError {
    /// Fewer bytes than the headers or the declared pixel data need
    TooShort { needed: usize, actual: usize },
    /// First two bytes are not `"BM"`
    BadMagic([u8; 2]),
    /// The size field disagrees with the buffer length
    SizeMismatch { declared: usize, actual: usize },
    /// Only the 12-byte core info header is supported
    UnsupportedHeader(u32),
    /// Only single-plane, 1-bit images are supported
    UnsupportedFormat { planes: u16, bits_per_pixel: u16 },
    /// Pixel data would start inside the headers or color table
    BadPixelOffset(usize),
    /// Dimensions that no maze grid produces (must be odd and at least 3)
    NotAMaze { width: usize, height: usize },
}

impl fmt::Display for BmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmpError::TooShort { needed, actual } => {
                write!(f, "bitmap too short: need {} bytes, got {}", needed, actual)
            }
            BmpError::BadMagic(magic) => {
                write!(f, "bad bitmap magic {:02x}{:02x}", magic[0], magic[1])
            }
            BmpError::SizeMismatch { declared, actual } => write!(
                f,
                "bitmap declares {} bytes but buffer holds {}",
                declared, actual
            ),
            BmpError::UnsupportedHeader(size) => {
                write!(f, "unsupported info header size {}", size)
            }
            BmpError::UnsupportedFormat {
                planes,
                bits_per_pixel,
            } => write!(
                f,
                "unsupported format: {} planes, {} bits per pixel",
                planes, bits_per_pixel
            ),
            BmpError::BadPixelOffset(offset) => write!(
                f,
                "pixel data offset {} overlaps the {}-byte headers",
                offset, PIXEL_DATA_OFFSET
            ),
            BmpError::NotAMaze { width, height } => {
                write!(f, "{}x{} image is not a maze bitmap", width, height)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BmpError {}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// A parsed 1-bit core-header bitmap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBitmap {
    width: usize,
    height: usize,
    row_stride: usize,
    palette: [[u8; 3]; 2],
    pixels: Vec<u8>,
}

/// Parse a bitmap produced by [`encode`] (or any file with the same layout).
pub fn decode(bytes: &[u8]) -> Result<DecodedBitmap, BmpError> {
    if bytes.len() < PIXEL_DATA_OFFSET {
        return Err(BmpError::TooShort {
            needed: PIXEL_DATA_OFFSET,
            actual: bytes.len(),
        });
    }

    let magic = [bytes[0], bytes[1]];
    if magic != MAGIC {
        return Err(BmpError::BadMagic(magic));
    }

    let declared = read_u32(bytes, 2) as usize;
    if declared != bytes.len() {
        return Err(BmpError::SizeMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let header_size = read_u32(bytes, FILE_HEADER_SIZE);
    if header_size as usize != INFO_HEADER_SIZE {
        return Err(BmpError::UnsupportedHeader(header_size));
    }

    let width = read_u16(bytes, 18) as usize;
    let height = read_u16(bytes, 20) as usize;
    let planes = read_u16(bytes, 22);
    let bits_per_pixel = read_u16(bytes, 24);
    if planes != 1 || bits_per_pixel != BITS_PER_PIXEL {
        return Err(BmpError::UnsupportedFormat {
            planes,
            bits_per_pixel,
        });
    }

    let table = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
    let palette = [
        [bytes[table], bytes[table + 1], bytes[table + 2]],
        [bytes[table + 3], bytes[table + 4], bytes[table + 5]],
    ];

    let start = read_u32(bytes, 10) as usize;
    if start < PIXEL_DATA_OFFSET {
        return Err(BmpError::BadPixelOffset(start));
    }

    let row_stride = bitmap::row_stride(width);
    let needed = start + row_stride * height;
    if bytes.len() < needed {
        return Err(BmpError::TooShort {
            needed,
            actual: bytes.len(),
        });
    }

    Ok(DecodedBitmap {
        width,
        height,
        row_stride,
        palette,
        pixels: bytes[start..start + row_stride * height].to_vec(),
    })
}

impl DecodedBitmap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn palette(&self) -> &[[u8; 3]; 2] {
        &self.palette
    }

    /// Raw pixel rows, bottom-up, padding included
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel `(x, y)`, `y` counted from the first stored row; `true` is palette entry 1.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let addr = bitmap::image_bit_address(x, y, self.row_stride);
        self.pixels[addr.byte] & addr.mask() != 0
    }

    /// Whether every bit past the last pixel of each row is zero
    pub fn padding_is_clear(&self) -> bool {
        if self.row_stride == 0 {
            return true;
        }
        self.pixels.chunks(self.row_stride).all(|row| {
            (self.width..self.row_stride * 8).all(|bit| {
                let addr = bitmap::BitAddress::from_bit_index(bit);
                row[addr.byte] & addr.mask() == 0
            })
        })
    }

    /// Maze grid geometry implied by the image size
    pub fn maze_geometry(&self) -> Result<BitmapGeometry, BmpError> {
        let not_a_maze = BmpError::NotAMaze {
            width: self.width,
            height: self.height,
        };
        if self.width < 3 || self.height < 3 || self.width % 2 == 0 || self.height % 2 == 0 {
            return Err(not_a_maze);
        }
        BitmapGeometry::for_grid((self.width - 1) / 2, (self.height - 1) / 2)
            .map_err(|_| not_a_maze)
    }

    /// Rebuild the maze's passage masks from the pixel bits alone.
    pub fn passages(&self) -> Result<Vec<u8>, BmpError> {
        let geometry = self.maze_geometry()?;
        Ok(reconstruct_passages(&geometry, &self.pixels))
    }
}
