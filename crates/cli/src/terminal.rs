#![forbid(unsafe_code)]

use cmdq_core::{FeedbackSink, Gesture, PresentationAdapter};
use std::io::{BufRead, Write};

pub const HELP: &str = "type to filter, :n / :p to rotate, empty line to confirm, :q to cancel";

/// Line-oriented front end: every input line is one gesture and every
/// transition prints one feedback line.
pub struct TerminalAdapter<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> TerminalAdapter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> FeedbackSink for TerminalAdapter<R, W> {
    fn render_feedback(&mut self, display_text: &str) {
        let written = writeln!(self.output, "{display_text}").and_then(|()| self.output.flush());
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write feedback");
        }
    }
}

impl<R: BufRead, W: Write> PresentationAdapter for TerminalAdapter<R, W> {
    fn next_gesture(&mut self) -> Option<Gesture> {
        self.line.clear();
        match self.input.read_line(&mut self.line) {
            Ok(0) => None,
            Ok(_) => Some(parse_gesture(&self.line)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read input; cancelling");
                None
            }
        }
    }
}

pub fn parse_gesture(line: &str) -> Gesture {
    let line = line.trim();
    match line {
        "" => Gesture::Confirm,
        ":n" | ":next" => Gesture::Next,
        ":p" | ":prev" => Gesture::Previous,
        ":q" | ":quit" => Gesture::Cancel,
        query => Gesture::Input(query.to_string()),
    }
}
