//! ledtris binary: terminal emulator of the LED matrix, keyboard and FIFO command sources.

mod app;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use ledtris::EngineConfig;
use std::fs::File;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = EngineConfig {
        initial_interval_ms: args.interval_ms,
        min_interval_ms: args.min_interval_ms,
        speedup_per_line_ms: args.speedup_ms,
        blink_phase_ms: args.blink_ms,
        seed: args.seed,
        ..EngineConfig::default()
    };
    let mut app = App::new(args, &config);
    app.run()?;
    Ok(())
}

/// Logs go to `--log-file` when given. Without one the terminal UI stays quiet
/// unless RUST_LOG asks for output; headless mode logs to stderr.
fn init_logging(args: &Args) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else if !args.headless && std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Off);
    }
    builder.init();
    Ok(())
}

/// Falling-block puzzle for a 4-panel 8x32 LED matrix.
#[derive(Debug, Parser)]
#[command(
    name = "ledtris",
    version,
    about = "Falling-block puzzle for a 4-panel 8x32 LED matrix, emulated in the terminal.",
    long_about = "ledtris drives a falling-block puzzle on a column of four 8x8 LED panels.\n\n\
        By default the panels are emulated in the terminal and played from the keyboard. \
        Commands can also be read from a file or FIFO (--commands), one or more \
        whitespace-separated tokens per line: left, right, down (or bottom), \
        rotate_cw (or A), rotate_ccw (or B). Unknown tokens are ignored.\n\n\
        With --headless every frame is written to stdout as 32 lines of 0/1, for an \
        external display driver.\n\n\
        CONTROLS:\n  Left/Right h/l  Move     Down j Space  Drop\n  Up k x          Rotate CW  z u        Rotate CCW\n  r               Reset      q Esc      Quit"
)]
pub struct Args {
    /// Starting gravity interval in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub interval_ms: u64,

    /// Fastest gravity interval; clears never push it below this.
    #[arg(long, default_value = "300", value_name = "MS")]
    pub min_interval_ms: u64,

    /// How much faster gravity gets per cleared line.
    #[arg(long, default_value = "10", value_name = "MS")]
    pub speedup_ms: u64,

    /// Length of each of the three blink phases when rows clear.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub blink_ms: u64,

    /// Polling cadence of the main loop (gravity is gated separately).
    #[arg(long, default_value = "10", value_name = "MS")]
    pub poll_ms: u64,

    /// Seed for the piece sequence (random if not set).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Read command tokens from this file or FIFO.
    #[arg(short, long, value_name = "PATH")]
    pub commands: Option<PathBuf>,

    /// No terminal UI: write frames to stdout. Stops on Ctrl-C or SIGTERM,
    /// or when the command source closes.
    #[arg(long, requires = "commands")]
    pub headless: bool,

    /// Path to LED theme file (btop-style theme[key]=\"value\"; keys led_on, led_off, led_flash, div_line, title, main_fg).
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
