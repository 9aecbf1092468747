//! A plain chatbot loop with `!quit` and `!clear` commands.

use crate::console::{Console, Line, send_with_progress};
use crate::session::Session;

/// A parsed line of operator input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// `!quit`: end the chat.
    Quit,
    /// `!clear`: forget the dialog.
    Clear,
    /// Nothing but whitespace.
    Empty,
    /// Anything else, trimmed.
    Message(&'a str),
}

impl<'a> Input<'a> {
    /// Parses one line. Commands are matched case-insensitively.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Input::Empty
        } else if line.eq_ignore_ascii_case("!quit") {
            Input::Quit
        } else if line.eq_ignore_ascii_case("!clear") {
            Input::Clear
        } else {
            Input::Message(line)
        }
    }
}

/// Chats until the operator quits or the input ends.
pub async fn run_chat(session: &mut Session, console: &mut dyn Console) {
    while let Some(line) = console.read_line().await {
        match Input::parse(&line) {
            Input::Quit => {
                console.show(Line::Assistant("Goodbye!"));
                break;
            }
            Input::Clear => {
                session.clear();
                console.show(Line::Notice("Started a new dialog"));
            }
            Input::Empty => {}
            Input::Message(text) => {
                if let Some(reply) = send_with_progress(session, console, text).await {
                    console.show(Line::Assistant(&reply));
                }
            }
        }
    }
    debug!("chat finished");
}
