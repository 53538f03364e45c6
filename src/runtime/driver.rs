//! Interactive command loop in front of a [`Publisher`].
//!
//! The loop only translates lines into submissions and shutdown; it holds no
//! scheduling logic. Any I/O failure ends it through a graceful shutdown.

use std::io::{self, BufRead, Write};

use tracing::{error, info};

use crate::core::Publisher;
use crate::runtime::command::{parse_command, Command};
use crate::util::VerbosityToggle;

/// Prompt written before every input line.
pub const PROMPT: &str = "Please enter jobs to request: ";

/// Why the loop ended. The publisher is shut down in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The user entered `q`.
    Quit,
    /// Input was exhausted.
    EndOfInput,
    /// Reading input or writing output failed.
    IoError,
    /// The publisher refused a submission.
    Rejected,
}

/// Reads commands and drives a publisher.
pub struct Driver<'a> {
    publisher: &'a Publisher,
    verbosity: &'a dyn VerbosityToggle,
}

impl<'a> Driver<'a> {
    /// Bind a driver to a publisher and a verbosity switch.
    pub fn new(publisher: &'a Publisher, verbosity: &'a dyn VerbosityToggle) -> Self {
        Self { publisher, verbosity }
    }

    /// Run until quit, end of input or an I/O error.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> DriverExit {
        let exit = self.run_loop(&mut input, &mut output);
        match exit {
            Ok(exit) => exit,
            Err(error) => {
                error!(%error, "I/O error in driver loop");
                self.publisher.shutdown();
                DriverExit::IoError
            }
        }
    }

    fn run_loop<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<DriverExit> {
        let mut raw = Vec::new();
        loop {
            writeln!(output, "{PROMPT}")?;
            output.flush()?;

            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                info!("end of input, shutting down");
                self.publisher.shutdown();
                return Ok(DriverExit::EndOfInput);
            }

            // undecodable bytes become replacement characters and fail to parse
            let line = String::from_utf8_lossy(&raw);
            match parse_command(&line) {
                Ok(Command::Quit) => {
                    info!("user requested to quit");
                    self.publisher.shutdown();
                    return Ok(DriverExit::Quit);
                }
                Ok(Command::ToggleDebug) => {
                    let enabled = self.verbosity.toggle_debug();
                    info!(debug = enabled, "debug logging toggled");
                }
                Ok(Command::Submit(jobs)) => {
                    info!(jobs, "user requested jobs");
                    let count = usize::try_from(jobs).unwrap_or(usize::MAX);
                    if let Err(error) = self.publisher.submit_batch(count) {
                        error!(%error, "submission rejected");
                        self.publisher.shutdown();
                        return Ok(DriverExit::Rejected);
                    }
                }
                Err(rejection) => writeln!(output, "{rejection}")?,
            }
        }
    }
}
