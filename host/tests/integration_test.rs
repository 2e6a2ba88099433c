use bitmaze::{
    generate_maze_bitmap, load_report, run, save_bitmap, write_bitmap, GenerateConfig,
};
use bitmaze_core::{bmp, Direction, Grid};
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

/// The known maze seed for testing
const MAZE_SEED: u32 = 2918957128;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bitmaze-{}-{}", std::process::id(), name))
}

fn config(cols: usize, rows: usize, seed: u32) -> GenerateConfig {
    GenerateConfig {
        cols,
        rows,
        seed: Some(seed),
        ..Default::default()
    }
}

/// Count cells reachable from cell 0 using only the decoded passage masks
fn reachable(grid: Grid, passages: &[u8]) -> usize {
    let mut seen = vec![false; grid.cell_count()];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    let mut count = 0;

    while let Some(cell) = queue.pop_front() {
        count += 1;
        for dir in Direction::ALL {
            if passages[cell] & dir.flag() == 0 {
                continue;
            }
            let next = grid.neighbor(cell, dir).expect("passage leads off the grid");
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    count
}

struct FailingSink;

impl io::Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_file_round_trip_reconstructs_maze() {
    let path = temp_path("round-trip.bmp");
    let bitmap = generate_maze_bitmap(&config(31, 17, MAZE_SEED)).expect("Maze generation failed");
    save_bitmap(&bitmap, &path).expect("Saving bitmap failed");

    let bytes = std::fs::read(&path).expect("Reading bitmap back failed");
    std::fs::remove_file(&path).ok();
    assert_eq!(bytes, bitmap.bytes);

    let decoded = bmp::decode(&bytes).expect("Decoding bitmap failed");
    assert_eq!(decoded.width(), 63);
    assert_eq!(decoded.height(), 35);
    assert_eq!(decoded.row_stride(), 8);
    assert!(decoded.padding_is_clear(), "padding bits must be zero");

    // The graph rebuilt from pixels alone is the generator's graph
    let passages = decoded.passages().expect("Not a maze bitmap");
    assert_eq!(passages, bitmap.maze.passage_masks());

    let grid = bitmap.maze.grid();
    let flags: u32 = passages.iter().map(|mask| mask.count_ones()).sum();
    assert_eq!(flags as usize / 2, grid.cell_count() - 1, "not a spanning tree");
    assert_eq!(reachable(grid, &passages), grid.cell_count(), "maze is not connected");

    // Nothing but cells and passages is lit
    let ones: u32 = decoded.pixel_data().iter().map(|b| b.count_ones()).sum();
    assert_eq!(ones as usize, grid.cell_count() * 2 - 1);
}

#[test]
fn test_header_for_4x4() {
    let bitmap = generate_maze_bitmap(&config(4, 4, 1)).expect("Maze generation failed");
    let bytes = &bitmap.bytes;

    assert_eq!(bytes.len(), 68);
    assert_eq!(&bytes[0..2], b"BM");
    assert_eq!(u32::from_le_bytes(bytes[2..6].try_into().unwrap()), 68);
    assert_eq!(u32::from_le_bytes(bytes[10..14].try_into().unwrap()), 32);
    assert_eq!(u16::from_le_bytes([bytes[18], bytes[19]]), 9);
    assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 9);
}

#[test]
fn test_same_seed_same_file() {
    let first = generate_maze_bitmap(&config(40, 25, MAZE_SEED)).expect("Maze generation failed");
    let second = generate_maze_bitmap(&config(40, 25, MAZE_SEED)).expect("Maze generation failed");
    assert_eq!(first.bytes, second.bytes);

    let other = generate_maze_bitmap(&config(40, 25, 12345)).expect("Maze generation failed");
    assert_ne!(first.bytes, other.bytes);
}

#[test]
fn test_boundary_grids() {
    for (cols, rows) in [(1, 1), (1, 7), (7, 1), (4, 9), (33, 2)] {
        let bitmap = generate_maze_bitmap(&config(cols, rows, 9)).expect("Maze generation failed");
        let decoded = bmp::decode(&bitmap.bytes).expect("Decoding bitmap failed");
        let passages = decoded.passages().expect("Not a maze bitmap");

        let grid = bitmap.maze.grid();
        assert_eq!(reachable(grid, &passages), cols * rows, "{}x{} not connected", cols, rows);
        assert!(decoded.padding_is_clear());
    }
}

#[test]
fn test_run_writes_bitmap_and_report() {
    let output = temp_path("run.bmp");
    let report_path = temp_path("run.json");
    let config = GenerateConfig {
        output: output.clone(),
        report: Some(report_path.clone()),
        ..config(12, 8, MAZE_SEED)
    };

    let report = run(&config).expect("Run failed");
    let saved = load_report(&report_path).expect("Loading report failed");
    let bytes = std::fs::read(&output).expect("Reading bitmap back failed");
    std::fs::remove_file(&output).ok();
    std::fs::remove_file(&report_path).ok();

    assert_eq!(saved, report);
    assert_eq!(saved.seed, MAZE_SEED);
    assert_eq!(saved.passages, 95);
    assert_eq!(saved.file_size, bytes.len());

    // The report is enough to reproduce the file
    let again = generate_maze_bitmap(&GenerateConfig {
        cols: saved.cols,
        rows: saved.rows,
        seed: Some(saved.seed),
        ..Default::default()
    })
    .expect("Maze generation failed");
    assert_eq!(again.bytes, bytes);
}

#[test]
fn test_unwritable_destination_is_an_error() {
    let bitmap = generate_maze_bitmap(&config(4, 4, 1)).expect("Maze generation failed");
    let path = temp_path("missing-dir").join("maze.bmp");

    let err = save_bitmap(&bitmap, &path).unwrap_err();
    assert!(err.to_string().contains("Failed to open"), "{}", err);
    assert!(!path.exists());
}

#[test]
fn test_failing_sink_is_an_error() {
    let bitmap = generate_maze_bitmap(&config(4, 4, 1)).expect("Maze generation failed");
    let err = write_bitmap(&mut FailingSink, &bitmap.bytes).unwrap_err();
    assert_eq!(err.to_string(), "sink closed");
}
