//! Game engine: gravity, locking, line clears, player intents and frame derivation.
//!
//! The engine is single-threaded and not internally synchronized. Callers feed it
//! one call at a time with the current instant; nothing in here sleeps. The
//! line-clear blink is a small timestamp-driven sub-state machine advanced by
//! the same `tick` calls that drive gravity.

use crate::EngineConfig;
use crate::grid::Grid;
use crate::input::Command;
use crate::piece::{Piece, Rotation, Shape};
use crate::render::{Frame, Phase, RenderSink, Stats};
use crate::ticker::Ticker;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Blink sequence shown on completed rows before they are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    FirstOff,
    On,
    SecondOff,
}

impl BlinkPhase {
    fn next(self) -> Option<Self> {
        match self {
            Self::FirstOff => Some(Self::On),
            Self::On => Some(Self::SecondOff),
            Self::SecondOff => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Falling,
    Clearing {
        rows: Vec<usize>,
        phase: BlinkPhase,
        since: Instant,
    },
    Stopped,
}

/// What a single `tick` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not due yet, or nothing to do in this state.
    Idle,
    /// Piece fell one row.
    Moved,
    /// Piece locked with no completed rows; next piece spawned.
    Locked,
    /// Piece locked and completed rows; the blink has started.
    Clearing,
    /// Blink advanced to its next phase.
    Blink,
    /// Rows removed; the count is how many.
    Cleared(u32),
}

pub struct Engine {
    config: EngineConfig,
    grid: Grid,
    piece: Option<Piece>,
    ticker: Ticker,
    score: u32,
    lines: u32,
    state: State,
    rng: StdRng,
    sink: Option<Box<dyn RenderSink>>,
}

fn ticker_for(config: &EngineConfig) -> Ticker {
    Ticker::new(
        Duration::from_millis(config.initial_interval_ms),
        Duration::from_millis(config.min_interval_ms),
        Duration::from_millis(config.speedup_per_line_ms),
    )
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        let mut rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let piece = Piece::spawn(Shape::random(&mut rng));
        Self {
            config: config.clone(),
            grid: Grid::new(),
            piece: Some(piece),
            ticker: ticker_for(config),
            score: 0,
            lines: 0,
            state: State::Falling,
            rng,
            sink: None,
        }
    }

    /// Connect a sink and paint the current frame on it.
    pub fn attach_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.sink = Some(sink);
        self.redraw();
    }

    /// Stop for good and hand the sink back to the caller.
    pub fn shutdown(&mut self) -> Option<Box<dyn RenderSink>> {
        if self.state != State::Stopped {
            info!("engine stopped (score {}, lines {})", self.score, self.lines);
        }
        self.state = State::Stopped;
        self.sink.take()
    }

    /// Start a fresh board on the same engine: empty grid, zero score, new piece.
    /// Gravity keeps its current speed; the interval never goes back up.
    pub fn reset(&mut self) {
        if self.state == State::Stopped {
            return;
        }
        self.grid = Grid::new();
        self.score = 0;
        self.lines = 0;
        self.state = State::Falling;
        self.spawn();
        info!("game reset");
        self.redraw();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn interval(&self) -> Duration {
        self.ticker.interval()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Falling => Phase::Falling,
            State::Clearing { .. } => Phase::Clearing,
            State::Stopped => Phase::Stopped,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            lines: self.lines,
            interval: self.ticker.interval(),
            phase: self.phase(),
        }
    }

    /// Locked grid with the live piece overlaid. The grid itself is never touched.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::from(&self.grid);
        if let Some(piece) = &self.piece {
            frame.overlay(piece.cells());
        }
        frame
    }

    /// Apply one player intent. Returns whether the piece moved.
    pub fn apply(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::Left => self.move_left(),
            Command::Right => self.move_right(),
            Command::Down => self.move_down(now),
            Command::RotateCw => self.rotate_cw(),
            Command::RotateCcw => self.rotate_ccw(),
        }
    }

    /// Paint the current frame again without changing anything (e.g. after a resize).
    pub fn refresh(&mut self) {
        self.redraw();
    }

    pub fn move_left(&mut self) -> bool {
        self.try_commit(|p| p.translated(-1, 0))
    }

    pub fn move_right(&mut self) -> bool {
        self.try_commit(|p| p.translated(1, 0))
    }

    /// Manual drop by one row. Also restarts the gravity interval.
    pub fn move_down(&mut self, now: Instant) -> bool {
        let moved = self.try_commit(|p| p.translated(0, 1));
        if moved {
            self.ticker.reset(now);
        }
        moved
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.rotate(Rotation::Clockwise)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.rotate(Rotation::CounterClockwise)
    }

    fn rotate(&mut self, rotation: Rotation) -> bool {
        self.try_commit(|p| p.rotated(rotation))
    }

    /// Replace the live piece with `f(piece)` if it fits; otherwise leave everything as is.
    fn try_commit(&mut self, f: impl FnOnce(&Piece) -> Piece) -> bool {
        if self.state != State::Falling {
            return false;
        }
        let Some(piece) = &self.piece else {
            return false;
        };
        let candidate = f(piece);
        if !candidate.fits(&self.grid) {
            return false;
        }
        self.piece = Some(candidate);
        self.redraw();
        true
    }

    /// Advance time. Call at a fast fixed cadence; gravity only acts once per interval.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        match self.state {
            State::Stopped => TickOutcome::Idle,
            State::Clearing { .. } => self.animate(now),
            State::Falling => {
                if !self.ticker.elapsed(now) {
                    return TickOutcome::Idle;
                }
                let Some(piece) = self.piece else {
                    self.spawn();
                    self.redraw();
                    return TickOutcome::Idle;
                };
                // Already resting (spawned onto the stack or pushed down by hand).
                if piece.has_contact(&self.grid) {
                    return self.lock(piece, now);
                }
                let fallen = piece.translated(0, 1);
                if fallen.has_contact(&self.grid) {
                    return self.lock(fallen, now);
                }
                self.piece = Some(fallen);
                self.redraw();
                TickOutcome::Moved
            }
        }
    }

    fn lock(&mut self, piece: Piece, now: Instant) -> TickOutcome {
        self.piece = None;
        let skipped = self.grid.lock_cells(piece.cells());
        debug!(
            "locked {:?} at {:?} ({} cells off-board)",
            piece.shape, piece.anchor, skipped
        );
        self.redraw();

        let rows = self.grid.find_complete_rows();
        if rows.is_empty() {
            self.spawn();
            self.redraw();
            return TickOutcome::Locked;
        }
        self.light_rows(&rows, false);
        self.state = State::Clearing {
            rows,
            phase: BlinkPhase::FirstOff,
            since: now,
        };
        self.redraw();
        TickOutcome::Clearing
    }

    fn animate(&mut self, now: Instant) -> TickOutcome {
        let (rows, phase, since) = match &self.state {
            State::Clearing { rows, phase, since } => (rows.clone(), *phase, *since),
            _ => return TickOutcome::Idle,
        };
        let blink = Duration::from_millis(self.config.blink_phase_ms);
        if now.saturating_duration_since(since) < blink {
            return TickOutcome::Idle;
        }
        match phase.next() {
            Some(next) => {
                self.light_rows(&rows, next == BlinkPhase::On);
                self.state = State::Clearing {
                    rows,
                    phase: next,
                    since: now,
                };
                self.redraw();
                TickOutcome::Blink
            }
            None => self.finish_clear(&rows),
        }
    }

    fn finish_clear(&mut self, rows: &[usize]) -> TickOutcome {
        self.grid.clear_rows(rows);
        let count = rows.len() as u32;
        self.score += self.config.points_per_line * count;
        self.lines += count;
        self.ticker.speed_up(count);
        info!(
            "cleared {} row(s): score {}, interval {} ms",
            count,
            self.score,
            self.ticker.interval().as_millis()
        );
        self.state = State::Falling;
        self.spawn();
        self.redraw();
        TickOutcome::Cleared(count)
    }

    fn light_rows(&mut self, rows: &[usize], on: bool) {
        for &y in rows {
            if let Err(e) = self.grid.set_row(y as i32, on) {
                warn!("blink skipped: {e}");
            }
        }
    }

    fn spawn(&mut self) {
        let piece = Piece::spawn(Shape::random(&mut self.rng));
        debug!("spawned {:?}", piece.shape);
        self.piece = Some(piece);
    }

    fn redraw(&mut self) {
        if self.sink.is_none() {
            return;
        }
        let frame = self.render();
        let stats = self.stats();
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&stats);
            sink.draw(&frame);
        }
    }
}
