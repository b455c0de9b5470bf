//! Command tokens: decoding from text, keyboard bindings, and a background reader.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// The five intents a controller can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    Down,
    RotateCw,
    RotateCcw,
}

impl Command {
    /// Decode one token, case-insensitively. Accepts the long names and the
    /// gamepad-style names (`bottom`, `A`, `B`). Unknown tokens give `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            "down" | "bottom" | "d" => Some(Self::Down),
            "rotate_cw" | "cw" | "a" => Some(Self::RotateCw),
            "rotate_ccw" | "ccw" | "b" => Some(Self::RotateCcw),
            _ => None,
        }
    }
}

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Command(Command),
    Reset,
    Quit,
    None,
}

/// Map key event to an action. Supports arrows plus vim-style keys.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Left | KeyCode::Char('h') => Action::Command(Command::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Command(Command::Right),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char(' ') => Action::Command(Command::Down),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('x') => Action::Command(Command::RotateCw),
        KeyCode::Char('z') | KeyCode::Char('u') => Action::Command(Command::RotateCcw),
        _ => Action::None,
    }
}

/// Decode every whitespace-separated token on a line, skipping unknown ones.
pub fn decode_line(line: &str) -> Vec<Command> {
    line.split_whitespace()
        .filter_map(|token| {
            let command = Command::from_token(token);
            if command.is_none() {
                debug!("ignored token {token:?}");
            }
            command
        })
        .collect()
}

/// Read tokens from `reader` on a background thread and push them into `tx`.
/// The thread ends at end of input or once the receiver is gone; the sender is
/// dropped then, which is how the consumer learns the source closed.
pub fn spawn_reader<R>(reader: R, tx: Sender<Command>) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("command-reader".into())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!("command source read failed: {e}");
                        break;
                    }
                };
                for command in decode_line(&line) {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
            }
            info!("command source closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[test]
    fn test_from_token() {
        assert_eq!(Command::from_token("left"), Some(Command::Left));
        assert_eq!(Command::from_token("RIGHT"), Some(Command::Right));
        assert_eq!(Command::from_token("bottom"), Some(Command::Down));
        assert_eq!(Command::from_token("A"), Some(Command::RotateCw));
        assert_eq!(Command::from_token("B"), Some(Command::RotateCcw));
        assert_eq!(Command::from_token(" rotate_ccw\r"), Some(Command::RotateCcw));
        assert_eq!(Command::from_token("jump"), None);
        assert_eq!(Command::from_token(""), None);
    }

    #[test]
    fn test_decode_line_skips_unknown() {
        assert_eq!(
            decode_line("left  hello A\tdown"),
            vec![Command::Left, Command::RotateCw, Command::Down]
        );
    }

    #[test]
    fn test_key_to_action() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::Command(Command::Left));
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::Command(Command::RotateCw));
        assert_eq!(key_to_action(key(KeyCode::Char('z'))), Action::Command(Command::RotateCcw));
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Reset);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_reader_forwards_and_closes() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new("left right\nnoise\nbottom B\n");
        let handle = spawn_reader(input, tx).unwrap();
        handle.join().unwrap();
        let got: Vec<Command> = rx.iter().collect();
        assert_eq!(
            got,
            vec![Command::Left, Command::Right, Command::Down, Command::RotateCcw]
        );
    }
}
