use crate::{Error, Result};
use std::fmt::Display;
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::path::Path;
use std::str::FromStr;

/// Input that aborts any prompt
pub const ABORT_INPUT: &str = "q";

/// Line-oriented terminal I/O used by every command.
///
/// Generic over its reader and writer so commands can be driven by scripted
/// input in tests.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one line
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}").map_err(terminal_error)
    }

    /// Print an empty line
    pub fn blank(&mut self) -> Result<()> {
        self.say("")
    }

    /// Ask a question and return the trimmed answer.
    ///
    /// Closed input or the abort answer yields [`Error::UserInput`].
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}: ").map_err(terminal_error)?;
        self.output.flush().map_err(terminal_error)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| Error::UserInput(format!("Failed to read input: {e}")))?;
        if read == 0 {
            return Err(Error::UserInput("Input closed".to_string()));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case(ABORT_INPUT) {
            return Err(Error::UserInput("Aborted".to_string()));
        }
        Ok(answer.to_string())
    }

    /// Ask with a default that an empty answer accepts
    pub fn ask_or(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{question} [{default}]"))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Ask until the answer parses, an empty answer keeping `default`
    pub fn ask_parsed<T>(&mut self, question: &str, default: T) -> Result<T>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(&format!("{question} [{default}]"))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(e) => self.say(format!("  {e}"))?,
            }
        }
    }

    /// Yes/no question
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{question} [{hint}]"))?.to_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" | "true" => return Ok(true),
                "n" | "no" | "false" => return Ok(false),
                _ => self.say("  Please answer y or n")?,
            }
        }
    }

    /// Pick one of `count` numbered entries; returns a 0-based index
    pub fn choose(&mut self, question: &str, count: usize) -> Result<usize> {
        loop {
            let answer = self.ask(&format!("{question} (1-{count}, {ABORT_INPUT} to quit)"))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
                _ => self.say(format!("  Enter a number between 1 and {count}"))?,
            }
        }
    }
}

fn terminal_error(e: std::io::Error) -> Error {
    Error::fs(Path::new("<terminal>"), "write", e)
}
