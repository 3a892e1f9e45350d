//! Asking for replacement values on the terminal.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use colored::Colorize;
use docfill::{ReplacementSource, Result};

/// Prompts once per field; an empty answer leaves the field unchanged.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr and read answers from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ReplacementSource for TerminalPrompt<R, W> {
    fn replacements(&mut self, fields: &[String]) -> Result<HashMap<String, String>> {
        let mut answers = HashMap::new();
        if fields.is_empty() {
            writeln!(self.output, "{} No highlighted fields found", "!".yellow().bold())?;
            return Ok(answers);
        }

        writeln!(
            self.output,
            "{} (leave empty to keep the current text)",
            "Fill in the highlighted fields".cyan().bold()
        )?;
        for field in fields {
            write!(self.output, "{} {}: ", "?".green().bold(), field.bold())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let value = line.trim();
            if !value.is_empty() {
                answers.insert(field.clone(), value.to_string());
            }
        }
        Ok(answers)
    }
}
