//! Tests for the driver command grammar

use job_publisher::runtime::{parse_command, Command, CommandError};

#[test]
fn test_positive_number_submits() {
    assert_eq!(parse_command("50"), Ok(Command::Submit(50)));
    assert_eq!(parse_command("  7  "), Ok(Command::Submit(7)));
}

#[test]
fn test_letters_control_the_loop() {
    assert_eq!(parse_command("q\n"), Ok(Command::Quit));
    assert_eq!(parse_command("d"), Ok(Command::ToggleDebug));
    assert_eq!(parse_command("Q"), Err(CommandError::NotANumber));
}

#[test]
fn test_rejection_messages() {
    assert_eq!(parse_command("0").unwrap_err().to_string(), "Number must be greater than 0");
    assert_eq!(
        parse_command("abc").unwrap_err().to_string(),
        "Invalid input, must be a number (base 10)."
    );
    assert_eq!(parse_command("1.5"), Err(CommandError::NotANumber));
}
