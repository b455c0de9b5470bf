//! App: wiring, main polling loop, command queue and orderly shutdown.
//!
//! Commands from a file or FIFO arrive on a channel and are drained by the
//! same loop that ticks the engine, so the engine never needs a lock.

use crate::Args;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ledtris::EngineConfig;
use ledtris::engine::Engine;
use ledtris::input::{Action, Command, key_to_action, spawn_reader};
use ledtris::render::TextSink;
use ledtris::theme::Theme;
use ledtris::ui::TerminalSink;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub struct App {
    args: Args,
    engine: Engine,
    commands: Option<Receiver<Command>>,
}

impl App {
    pub fn new(args: Args, config: &EngineConfig) -> Self {
        Self {
            args,
            engine: Engine::new(config),
            commands: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let theme = Theme::load(self.args.theme.as_deref()).context("loading theme")?;
        self.open_command_source()?;
        info!(
            "starting {} (gravity {} ms)",
            if self.args.headless { "headless" } else { "terminal" },
            self.engine.interval().as_millis()
        );
        let result = if self.args.headless {
            self.run_headless()
        } else {
            self.run_terminal(theme)
        };
        // Dropping the sink releases stdout or the terminal.
        drop(self.engine.shutdown());
        result
    }

    /// Opening a FIFO blocks until its writer connects, so the game waits for the controller.
    fn open_command_source(&mut self) -> Result<()> {
        let Some(path) = &self.args.commands else {
            return Ok(());
        };
        info!("waiting for command source {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("opening command source {}", path.display()))?;
        let (tx, rx) = mpsc::channel();
        spawn_reader(BufReader::new(file), tx).context("starting command reader")?;
        self.commands = Some(rx);
        Ok(())
    }

    /// Apply every queued command. Returns false once the source has closed.
    fn drain_commands(&mut self, now: Instant) -> bool {
        let Some(rx) = &self.commands else {
            return true;
        };
        loop {
            match rx.try_recv() {
                Ok(command) => {
                    self.engine.apply(command, now);
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.args.poll_ms.max(1))
    }

    fn run_headless(&mut self) -> Result<()> {
        // SIGINT / SIGTERM end the loop so `run` can stop the engine in order.
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("installing signal handler")?;
        self.engine
            .attach_sink(Box::new(TextSink::new(std::io::stdout().lock())));
        self.headless_loop(&stop)
    }

    fn headless_loop(&mut self, stop: &AtomicBool) -> Result<()> {
        let poll = self.poll_interval();
        loop {
            if stop.load(Ordering::SeqCst) {
                info!("shutdown signal received, stopping");
                return Ok(());
            }
            let now = Instant::now();
            if !self.drain_commands(now) {
                info!("command source closed, stopping");
                return Ok(());
            }
            self.engine.tick(now);
            std::thread::sleep(poll);
        }
    }

    fn run_terminal(&mut self, theme: Theme) -> Result<()> {
        use crossterm::execute;
        use crossterm::terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let source = match &self.args.commands {
            Some(path) => format!("keys + {}", path.display()),
            None => "keyboard".to_string(),
        };
        self.engine
            .attach_sink(Box::new(TerminalSink::new(terminal, theme, source)));

        let result = self.run_loop();

        // Restore
        drop(self.engine.shutdown());
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self) -> Result<()> {
        let poll = self.poll_interval();
        loop {
            let now = Instant::now();
            if self.commands.is_some() && !self.drain_commands(now) {
                info!("command source closed, keyboard only");
                self.commands = None;
            }
            self.engine.tick(now);

            if event::poll(poll)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            match key_to_action(key) {
                                Action::Quit => return Ok(()),
                                Action::Reset => self.engine.reset(),
                                Action::Command(command) => {
                                    self.engine.apply(command, Instant::now());
                                }
                                Action::None => {}
                            }
                        }
                        Event::Resize(..) => self.engine.refresh(),
                        _ => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ledtris::render::Phase;

    fn app_with_queue() -> (App, mpsc::Sender<Command>) {
        let args = Args::try_parse_from(["ledtris", "--seed", "5"]).unwrap();
        let config = EngineConfig {
            seed: args.seed,
            ..EngineConfig::default()
        };
        let mut app = App::new(args, &config);
        let (tx, rx) = mpsc::channel();
        app.commands = Some(rx);
        (app, tx)
    }

    #[test]
    fn test_drain_applies_queued_commands() {
        let (mut app, tx) = app_with_queue();
        let t0 = Instant::now();
        app.engine.tick(t0);
        let start = app.engine.piece().map(|p| p.anchor);
        tx.send(Command::Down).unwrap();
        tx.send(Command::Down).unwrap();
        assert!(app.drain_commands(t0));
        let end = app.engine.piece().map(|p| p.anchor);
        assert_eq!(start.map(|(x, y)| (x, y + 2)), end);
    }

    #[test]
    fn test_headless_loop_honours_stop_signal() {
        let (mut app, tx) = app_with_queue();
        tx.send(Command::Down).unwrap();
        let stop = AtomicBool::new(true);
        assert!(app.headless_loop(&stop).is_ok());
        // Stopped before draining, with the source still open.
        assert_eq!(app.engine.piece().map(|p| p.anchor), Some((3, -1)));
        assert!(app.engine.shutdown().is_none());
        assert_eq!(app.engine.phase(), Phase::Stopped);
    }

    #[test]
    fn test_headless_loop_ends_when_source_closes() {
        let (mut app, tx) = app_with_queue();
        drop(tx);
        let stop = AtomicBool::new(false);
        assert!(app.headless_loop(&stop).is_ok());
    }

    #[test]
    fn test_drain_reports_closed_source() {
        let (mut app, tx) = app_with_queue();
        drop(tx);
        assert!(!app.drain_commands(Instant::now()));
        assert!(app.engine.shutdown().is_none());
        assert_eq!(app.engine.phase(), Phase::Stopped);
    }
}
