// Event Handling
// Single-key prompt used to collect the user's intent

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};

/// Answers a y/n prompt can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptEvent {
    Yes,
    No,
    /// Escape, q or Ctrl+C
    Cancel,
    /// Anything else; keep waiting
    None,
}

/// Converts terminal events to prompt answers
pub struct EventHandler;

impl EventHandler {
    /// Convert a crossterm event to a prompt event
    pub fn handle(event: Event) -> PromptEvent {
        match event {
            Event::Key(key) => Self::handle_key(key),
            _ => PromptEvent::None,
        }
    }

    fn handle_key(key: KeyEvent) -> PromptEvent {
        // Only handle key press events
        if key.kind != KeyEventKind::Press {
            return PromptEvent::None;
        }

        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => PromptEvent::Yes,
            KeyCode::Char('n') | KeyCode::Char('N') => PromptEvent::No,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => PromptEvent::Cancel,
            KeyCode::Char('q') | KeyCode::Esc => PromptEvent::Cancel,
            _ => PromptEvent::None,
        }
    }
}

/// Restores cooked mode even if reading fails
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Ask a y/n question; `None` means the user cancelled
pub fn ask_yes_no(question: &str) -> Result<Option<bool>> {
    print!("{} [y/n] ", question);
    io::stdout().flush()?;

    let answer = {
        let _raw = RawModeGuard::enable()?;
        loop {
            match EventHandler::handle(event::read()?) {
                PromptEvent::Yes => break Some(true),
                PromptEvent::No => break Some(false),
                PromptEvent::Cancel => break None,
                PromptEvent::None => {}
            }
        }
    };

    println!(
        "{}",
        match answer {
            Some(true) => "y",
            Some(false) => "n",
            None => "cancelled",
        }
    );
    Ok(answer)
}

/// Read one line of input, trimmed
pub fn ask_line(question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_yes_no_keys() {
        assert_eq!(EventHandler::handle(key(KeyCode::Char('y'), KeyModifiers::NONE)), PromptEvent::Yes);
        assert_eq!(EventHandler::handle(key(KeyCode::Char('N'), KeyModifiers::SHIFT)), PromptEvent::No);
    }

    #[test]
    fn test_cancel_keys() {
        assert_eq!(EventHandler::handle(key(KeyCode::Esc, KeyModifiers::NONE)), PromptEvent::Cancel);
        assert_eq!(
            EventHandler::handle(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            PromptEvent::Cancel
        );
    }

    #[test]
    fn test_release_and_other_keys_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('y'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(EventHandler::handle(release), PromptEvent::None);
        assert_eq!(EventHandler::handle(key(KeyCode::Char('x'), KeyModifiers::NONE)), PromptEvent::None);
        assert_eq!(EventHandler::handle(Event::FocusGained), PromptEvent::None);
    }
}
