//! Driver command grammar.

use thiserror::Error;

/// A parsed driver command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Submit a batch of this many generated items.
    Submit(u32),
    /// Shut down and leave the loop.
    Quit,
    /// Flip debug logging.
    ToggleDebug,
}

/// Input the driver rejects; the loop reports it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A number that is zero or negative.
    #[error("Number must be greater than 0")]
    NotPositive,
    /// Anything that is neither a command nor a base-10 integer.
    #[error("Invalid input, must be a number (base 10).")]
    NotANumber,
}

/// Parse one input line. Surrounding whitespace is ignored.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    match line.trim() {
        "q" => Ok(Command::Quit),
        "d" => Ok(Command::ToggleDebug),
        other => match other.parse::<i64>() {
            Ok(n) if n <= 0 => Err(CommandError::NotPositive),
            Ok(n) => u32::try_from(n).map(Command::Submit).map_err(|_| CommandError::NotANumber),
            Err(_) => Err(CommandError::NotANumber),
        },
    }
}
