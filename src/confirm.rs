//! Yes/no confirmation before destructive actions.

use std::io::{BufRead, Write};

pub const DELETE_TITLE: &str = "Delete Note";
pub const DELETE_MESSAGE: &str = "Are you sure you want to delete this note?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Confirmation {
    Affirm,
    /// Also the outcome when the prompt is dismissed.
    #[default]
    Cancel,
}

impl Confirmation {
    pub fn is_affirm(self) -> bool {
        self == Confirmation::Affirm
    }
}

pub trait Prompt {
    fn confirm(&mut self, title: &str, message: &str) -> Confirmation;
}

/// Answers every prompt the same way, e.g. for `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub Confirmation);

impl Prompt for Fixed {
    fn confirm(&mut self, _title: &str, _message: &str) -> Confirmation {
        self.0
    }
}

/// Asks on a writer and reads a single line answer.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompt { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn confirm(&mut self, title: &str, message: &str) -> Confirmation {
        if write!(self.output, "{title}: {message} [y/N] ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return Confirmation::Cancel;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => Confirmation::Cancel,
            Ok(_) => match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => Confirmation::Affirm,
                _ => Confirmation::Cancel,
            },
        }
    }
}
