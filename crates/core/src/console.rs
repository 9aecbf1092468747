//! Operator-facing input and output.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::session::Session;

/// One piece of output for the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// A section title.
    Heading(&'a str),
    /// A reply from the model.
    Assistant(&'a str),
    /// A question the operator is expected to answer.
    Prompt(&'a str),
    /// Progress and status information.
    Notice(&'a str),
    /// A diagnostic about something that went wrong.
    Error(&'a str),
}

impl Line<'_> {
    /// Returns a short label for the kind of this line.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            Line::Heading(_) => "heading",
            Line::Assistant(_) => "assistant",
            Line::Prompt(_) => "prompt",
            Line::Notice(_) => "notice",
            Line::Error(_) => "error",
        }
    }

    /// Returns the text of this line.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Line::Heading(text)
            | Line::Assistant(text)
            | Line::Prompt(text)
            | Line::Notice(text)
            | Line::Error(text) => text,
        }
    }
}

/// The operator's side of a dialog: a line-oriented terminal or a script.
#[async_trait]
pub trait Console: Send {
    /// Reads one line of operator input. Returns `None` once the input is
    /// exhausted.
    async fn read_line(&mut self) -> Option<String>;

    /// Shows one line of output.
    fn show(&mut self, line: Line<'_>);

    /// Called around model requests, so implementations can show progress.
    fn set_waiting(&mut self, _waiting: bool) {}
}

/// Sends `prompt` through the session while the console shows progress.
///
/// A failed request is reported to the operator and yields `None`.
pub async fn send_with_progress(
    session: &mut Session,
    console: &mut dyn Console,
    prompt: &str,
) -> Option<String> {
    console.set_waiting(true);
    let result = session.send(prompt).await;
    console.set_waiting(false);
    match result {
        Ok(reply) => Some(reply),
        Err(err) => {
            console.show(Line::Error(&format!("Error talking to the model: {err}")));
            None
        }
    }
}

/// A console fed from a fixed list of inputs, recording everything shown.
///
/// Mostly useful in tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    /// Creates a console that answers with `inputs`, in order.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: vec![],
        }
    }

    /// Returns everything shown so far as `label: text` strings.
    #[inline]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Returns the number of inputs not read yet.
    #[inline]
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self) -> Option<String> {
        self.inputs.pop_front()
    }

    fn show(&mut self, line: Line<'_>) {
        self.output.push(format!("{}: {}", line.label(), line.text()));
    }
}
