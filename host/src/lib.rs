use bitmaze_core::{bmp, Maze, MAZE_COLS, MAZE_ROWS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the bitmap lands when no output path is given
pub const DEFAULT_OUTPUT: &str = "./maze.bmp";

/// Largest side, in cells, for which the text view is logged at TRACE
pub const ASCII_PREVIEW_LIMIT: usize = 64;

/// Settings for one generation run
///
/// The default reproduces the reference run: a 256x256 maze seeded from the
/// clock, written to `./maze.bmp`, with no JSON report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Maze columns (cells, not including walls)
    pub cols: usize,
    /// Maze rows (cells, not including walls)
    pub rows: usize,
    /// Fixed seed; `None` derives one from the wall clock
    pub seed: Option<u32>,
    /// Bitmap output path
    pub output: PathBuf,
    /// Optional JSON report path
    pub report: Option<PathBuf>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            cols: MAZE_COLS,
            rows: MAZE_ROWS,
            seed: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            report: None,
        }
    }
}

impl GenerateConfig {
    /// Parse a full argv, skipping the program name if there is one.
    pub fn from_argv<I, S>(argv: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_args(argv.into_iter().skip(1))
    }

    /// Parse command-line arguments (without the program name).
    ///
    /// Accepts `--seed <u32>`, `--size <COLS>x<ROWS>`, `--report <file>` and
    /// one optional positional output path. No arguments means defaults.
    pub fn from_args<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut output_seen = false;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "--seed" => {
                    let value = flag_value(&mut args, "--seed")?;
                    let seed = value.parse().map_err(|_| {
                        format!("Invalid seed '{}'. Must be an integer in 0..=4294967295.", value)
                    })?;
                    config.seed = Some(seed);
                }
                "--size" => {
                    let value = flag_value(&mut args, "--size")?;
                    let (cols, rows) = parse_size(&value)?;
                    config.cols = cols;
                    config.rows = rows;
                }
                "--report" => {
                    let value = flag_value(&mut args, "--report")?;
                    config.report = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown option: {}", flag));
                }
                path => {
                    if output_seen {
                        return Err(format!("Unexpected extra argument: {}", path));
                    }
                    config.output = PathBuf::from(path);
                    output_seen = true;
                }
            }
        }

        Ok(config)
    }
}

fn flag_value<I, S>(args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    args.next()
        .map(|value| value.as_ref().to_string())
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Parse `<COLS>x<ROWS>`, e.g. `64x32`.
fn parse_size(value: &str) -> Result<(usize, usize), String> {
    let invalid = || format!("Invalid size '{}'. Expected <COLS>x<ROWS>, e.g. 64x32.", value);
    let (cols, rows) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let cols = cols.trim().parse().map_err(|_| invalid())?;
    let rows = rows.trim().parse().map_err(|_| invalid())?;
    Ok((cols, rows))
}

/// A generated maze plus its fully assembled BMP file
#[derive(Debug, Clone)]
pub struct MazeBitmap {
    /// The seed the maze was generated from
    pub seed: u32,
    pub maze: Maze,
    /// Complete file contents: headers, color table, pixel rows
    pub bytes: Vec<u8>,
}

impl MazeBitmap {
    pub fn report(&self, output: &Path) -> MazeReport {
        let geometry = self.maze.geometry();
        MazeReport {
            seed: self.seed,
            cols: self.maze.cols(),
            rows: self.maze.rows(),
            image_width: geometry.width(),
            image_height: geometry.height(),
            row_stride: geometry.row_stride(),
            file_size: self.bytes.len(),
            passages: self.maze.passage_count(),
            start_cell: self.maze.start(),
            output: output.display().to_string(),
        }
    }
}

/// Summary of one run, saved as JSON next to the bitmap on request.
///
/// Re-running with the same `seed`, `cols` and `rows` reproduces the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeReport {
    pub seed: u32,
    pub cols: usize,
    pub rows: usize,
    pub image_width: usize,
    pub image_height: usize,
    /// Bytes per stored pixel row, padding included
    pub row_stride: usize,
    pub file_size: usize,
    /// Opened passages, each counted once (always `cols * rows - 1`)
    pub passages: usize,
    pub start_cell: usize,
    pub output: String,
}

/// Seed derived from the wall clock, used when none is configured.
pub fn clock_seed() -> u32 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => (elapsed.as_secs() as u32) ^ elapsed.subsec_nanos(),
        Err(_) => 1,
    }
}

/// Generate a maze and assemble its bitmap file in memory.
///
/// # Example
/// ```
/// use bitmaze::{generate_maze_bitmap, GenerateConfig};
///
/// let config = GenerateConfig { cols: 4, rows: 4, seed: Some(7), ..Default::default() };
/// let bitmap = generate_maze_bitmap(&config).unwrap();
/// assert_eq!(bitmap.bytes.len(), 68);
/// ```
pub fn generate_maze_bitmap(
    config: &GenerateConfig,
) -> Result<MazeBitmap, Box<dyn std::error::Error>> {
    let seed = config.seed.unwrap_or_else(clock_seed);
    tracing::info!(
        "Generating {}x{} maze with seed {}",
        config.cols,
        config.rows,
        seed
    );

    let maze = Maze::from_seed(config.cols, config.rows, seed)
        .map_err(|e| format!("Failed to generate maze: {}", e))?;
    tracing::debug!(
        "Carved {} passages from start cell {}",
        maze.passage_count(),
        maze.start()
    );
    if let Some(preview) = ascii_preview(&maze) {
        tracing::trace!("\n{}", preview);
    }

    let bytes = maze.to_bmp();
    let geometry = maze.geometry();
    tracing::info!(
        "Encoded {}x{} px bitmap ({} bytes, {} bytes per row)",
        geometry.width(),
        geometry.height(),
        bytes.len(),
        geometry.row_stride()
    );
    debug_assert_eq!(bytes.len(), bmp::file_size(geometry));

    Ok(MazeBitmap { seed, maze, bytes })
}

/// Text view of small mazes; `None` once either side exceeds
/// `ASCII_PREVIEW_LIMIT` cells.
pub fn ascii_preview(maze: &Maze) -> Option<String> {
    if maze.cols() > ASCII_PREVIEW_LIMIT || maze.rows() > ASCII_PREVIEW_LIMIT {
        return None;
    }
    Some(maze.to_ascii())
}

/// Hand the whole assembled buffer to a byte sink in one write.
pub fn write_bitmap<W: Write>(sink: &mut W, bytes: &[u8]) -> io::Result<()> {
    sink.write_all(bytes)?;
    sink.flush()
}

/// Write the bitmap to `path`. The file is closed on every exit path.
pub fn save_bitmap(bitmap: &MazeBitmap, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    write_bitmap(&mut file, &bitmap.bytes)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    tracing::info!("Wrote {} bytes to {}", bitmap.bytes.len(), path.display());
    Ok(())
}

pub fn save_report(report: &MazeReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<MazeReport, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let report: MazeReport = serde_json::from_str(&json)?;
    Ok(report)
}

/// Generate, save the bitmap and, if configured, the JSON report.
pub fn run(config: &GenerateConfig) -> Result<MazeReport, Box<dyn std::error::Error>> {
    let bitmap = generate_maze_bitmap(config)?;
    save_bitmap(&bitmap, &config.output)?;

    let report = bitmap.report(&config.output);
    if let Some(path) = &config.report {
        save_report(&report, path)?;
        tracing::info!("Saved report to {}", path.display());
    }
    Ok(report)
}
