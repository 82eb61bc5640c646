//! Handle all the raw input directly from the end user. The only thing we care about is whether
//! they want to quit.

use std::io::Read as _;

use color_eyre::eyre::Result;
use termwiz::input::{InputEvent, KeyCode, KeyEvent, Modifiers};

/// Bytes from STDIN
pub type BytesFromSTDIN = [u8; 128];

/// Handle input from the user
pub(crate) struct Input {
    /// The main Hanabi protocol channel.
    protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    /// Stops the show.
    cancel: hanabi_core::CancellationHandle,
}

impl Input {
    /// Start a thread to listen and parse the end user's STDIN.
    pub fn start(
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
        cancel: hanabi_core::CancellationHandle,
    ) -> std::thread::JoinHandle<std::result::Result<(), color_eyre::eyre::Error>> {
        // The Tokio docs actually suggest using `std::thread` to listen on STDIN for interactive
        // applications.
        std::thread::spawn(move || -> Result<()> {
            let protocol_for_shutdown = protocol_tx.clone();
            let input = Self {
                protocol_tx,
                cancel,
            };
            let result = input.consume_stdin();
            if let Err(error) = result {
                crate::run::broadcast_protocol_end(&protocol_for_shutdown);
                return Err(error);
            }
            Ok(())
        })
    }

    /// Listen to the end user's STDIN until they ask to quit.
    fn consume_stdin(&self) -> Result<()> {
        tracing::debug!("Starting to listen on STDIN");

        let stdin = std::io::stdin();
        let mut reader = std::io::BufReader::new(stdin);
        let mut parser = termwiz::input::InputParser::new();

        while !self.cancel.is_cancelled() {
            let mut buffer: BytesFromSTDIN = [0; 128];
            let count = reader.read(&mut buffer[..])?;
            if count == 0 {
                tracing::debug!("STDIN closed");
                break;
            }

            if let Some(bytes) = buffer.get(0..count) {
                tracing::trace!("Received STDIN input: {bytes:x?}");
                parser.parse(bytes, |event| self.handle_event(&event), false);
            }
        }

        tracing::debug!("Leaving STDIN loop");
        Ok(())
    }

    /// Quit on `q`, `Esc` or `Ctrl-C`. Everything else is ignored.
    fn handle_event(&self, event: &InputEvent) {
        tracing::trace!("Parsed input event: {event:?}");
        if !Self::is_quit_event(event) {
            return;
        }

        tracing::debug!("User asked to quit");
        self.cancel.cancel();
        crate::run::broadcast_protocol_end(&self.protocol_tx);
    }

    /// Whether the event is the user asking to quit.
    #[must_use]
    pub fn is_quit_event(event: &InputEvent) -> bool {
        let InputEvent::Key(KeyEvent { key, modifiers, .. }) = event else {
            return false;
        };

        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "There are hundreds of keys we don't care about"
        )]
        let is_quit = match key {
            KeyCode::Char('q' | 'Q' | '\u{3}') | KeyCode::Escape => true,
            KeyCode::Char('c' | 'C') => modifiers.contains(Modifiers::CTRL),
            _ => false,
        };
        is_quit
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(key: KeyCode, modifiers: Modifiers) -> InputEvent {
        InputEvent::Key(KeyEvent { key, modifiers })
    }

    #[test]
    fn quit_keys() {
        assert!(Input::is_quit_event(&key(KeyCode::Char('q'), Modifiers::NONE)));
        assert!(Input::is_quit_event(&key(KeyCode::Escape, Modifiers::NONE)));
        assert!(Input::is_quit_event(&key(KeyCode::Char('c'), Modifiers::CTRL)));
    }

    #[test]
    fn other_keys_are_ignored() {
        assert!(!Input::is_quit_event(&key(KeyCode::Char('c'), Modifiers::NONE)));
        assert!(!Input::is_quit_event(&key(KeyCode::Enter, Modifiers::NONE)));
        assert!(!Input::is_quit_event(&InputEvent::Paste("q".into())));
    }
}
