//! Interactive confirmation before destructive actions.
//!
//! The prompt reads from any [`BufRead`] and writes to any [`Write`], so
//! the binary uses stdin/stdout and tests use in-memory buffers.

use std::io::{self, BufRead, Write};

/// Message printed when the user declines.
pub const ABORT_MESSAGE: &str = "Aborted. No files were removed.";

/// Ask a yes/no question, defaulting to no.
///
/// Writes `"<prompt> [y/N] "` and reads one line. Only `y` or `yes`
/// (any case) confirm; anything else, including end of input, declines.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        // Keep the next output off the prompt line
        writeln!(output)?;
        log::debug!("No answer on input, treating as no");
        return Ok(false);
    }

    let answer = answer.trim();
    let accepted = answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes");
    log::debug!("Confirmation answer {:?} -> {}", answer, accepted);
    Ok(accepted)
}
