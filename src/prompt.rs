// src/prompt.rs

//! Operator confirmation before a batch touches the system

use crate::error::{Error, Result};
use std::io::{self, BufRead, Write};

/// Asks the operator whether to go ahead with a batch
pub trait Confirm {
    /// Show `items` and ask `question`
    ///
    /// `Ok(false)` is a decline; input that cannot be read is
    /// [`Error::Aborted`].
    fn confirm(&mut self, question: &str, items: &[String]) -> Result<bool>;
}

/// Line-oriented prompt over any reader and writer
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt on the process's stdin and stdout
pub fn stdio_prompt() -> LinePrompt<io::StdinLock<'static>, io::Stdout> {
    LinePrompt::new(io::stdin().lock(), io::stdout())
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str, items: &[String]) -> Result<bool> {
        for item in items {
            writeln!(self.output, "  {}", item)?;
        }
        write!(self.output, "{} [y/N] ", question)?;
        self.output.flush()?;

        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .map_err(|e| Error::Aborted(format!("Could not read the answer: {e}")))?;
        if read == 0 {
            return Err(Error::Aborted("No answer given (end of input)".to_string()));
        }

        Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Fixed answer, for `--yes` style automation and tests
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _question: &str, _items: &[String]) -> Result<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str) -> (Result<bool>, String) {
        let mut out = Vec::new();
        let result = LinePrompt::new(answer.as_bytes(), &mut out).confirm(
            "Do you want to perform this operation?",
            &["Installing foo=1.2".to_string()],
        );
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_yes_answers() {
        assert!(ask("y\n").0.unwrap());
        assert!(ask("Y\n").0.unwrap());
        assert!(ask("yes\n").0.unwrap());
    }

    #[test]
    fn test_decline_is_default() {
        assert!(!ask("n\n").0.unwrap());
        assert!(!ask("\n").0.unwrap());
        assert!(!ask("maybe\n").0.unwrap());
    }

    #[test]
    fn test_end_of_input_aborts() {
        assert!(matches!(ask("").0, Err(Error::Aborted(_))));
    }

    #[test]
    fn test_prompt_lists_items() {
        let (_, shown) = ask("n\n");
        assert!(shown.contains("  Installing foo=1.2\n"));
        assert!(shown.ends_with("Do you want to perform this operation? [y/N] "));
    }
}
