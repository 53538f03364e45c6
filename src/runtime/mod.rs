//! Interactive driver surface.

pub mod command;
pub mod driver;

pub use command::{parse_command, Command, CommandError};
pub use driver::{Driver, DriverExit, PROMPT};
