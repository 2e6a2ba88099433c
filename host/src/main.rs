use bitmaze::{run, GenerateConfig};
use std::env;
use std::time::Instant;

fn main() {
    // Initialize tracing; RUST_LOG overrides the default INFO level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("bitmaze");

    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        print_usage(program);
        return;
    }

    let config = match GenerateConfig::from_argv(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            print_usage(program);
            std::process::exit(1);
        }
    };

    println!("🧱 Bitmap Maze Generator");
    println!("{}", "=".repeat(70));
    println!("  Maze size: {}x{} cells", config.cols, config.rows);
    match config.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: from clock"),
    }
    println!("  Output: {}", config.output.display());
    println!();

    let start = Instant::now();

    match run(&config) {
        Ok(report) => {
            println!("✅ Maze generated in {:.2}s", start.elapsed().as_secs_f64());
            println!("  Seed: {}", report.seed);
            println!("  Image: {}x{} px", report.image_width, report.image_height);
            println!("  Passages: {}", report.passages);
            println!("  File size: {} bytes", report.file_size);
            println!();
            println!("💾 Bitmap saved to: {}", report.output);
            if let Some(path) = &config.report {
                println!("📝 Report saved to: {}", path.display());
            }
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            tracing::error!("Maze generation failed: {}", e);
            eprintln!();
            eprintln!("❌ ERROR: {}", e);
            eprintln!("{}", "=".repeat(70));
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options] [output_file]", program);
    eprintln!();
    eprintln!("Generate a random perfect maze as a 1-bit BMP image.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --seed <u32>           Seed for the maze (default: derived from the clock)");
    eprintln!("  --size <COLS>x<ROWS>   Maze size in cells (default: 256x256, max 32767 per side)");
    eprintln!("  --report <file>        Also save a JSON report of the run");
    eprintln!("  output_file            Bitmap path (default: ./maze.bmp)");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {} --seed 2918957128 --size 64x64 --report maze.json maze.bmp", program);
}
