//! Operator decisions after a failed challenge.

use std::io::{self, BufRead, Write};

/// What to do after a challenge fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Continue,
    Abort,
}

impl Decision {
    /// Parse an answer; empty input means continue.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "r" | "retry" => Some(Decision::Retry),
            "" | "c" | "continue" => Some(Decision::Continue),
            "a" | "abort" | "q" | "quit" => Some(Decision::Abort),
            _ => None,
        }
    }
}

/// Source of decisions after a failure.
pub trait Prompt {
    fn decide(&mut self, challenge: &str, error: &str) -> Decision;
}

/// Never asks; always moves on to the next challenge.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompt for NonInteractive {
    fn decide(&mut self, _challenge: &str, _error: &str) -> Decision {
        Decision::Continue
    }
}

/// Reads answers from a line-based input, asking again on anything invalid.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stderr(),
        }
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for StdinPrompt<R, W> {
    fn decide(&mut self, challenge: &str, error: &str) -> Decision {
        let _ = writeln!(self.output, "{} failed: {}", challenge, error);
        loop {
            let _ = write!(self.output, "[r]etry, [c]ontinue or [a]bort? ");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                // End of input: nobody is there to answer.
                Ok(0) | Err(_) => return Decision::Abort,
                Ok(_) => {}
            }
            if let Some(decision) = Decision::parse(&line) {
                return decision;
            }
        }
    }
}
