//! Tests for the interactive driver loop

use std::io::{self, BufRead, Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use job_publisher::builders::build_publisher;
use job_publisher::config::PublisherConfig;
use job_publisher::core::Publisher;
use job_publisher::runtime::{Driver, DriverExit, PROMPT};
use job_publisher::util::VerbosityToggle;

#[derive(Default)]
struct CountingToggle {
    flips: AtomicUsize,
    debug: AtomicBool,
}

impl VerbosityToggle for CountingToggle {
    fn toggle_debug(&self) -> bool {
        self.flips.fetch_add(1, Ordering::SeqCst);
        !self.debug.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Reader whose every read fails.
struct BrokenInput;

impl Read for BrokenInput {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("terminal went away"))
    }
}

impl BufRead for BrokenInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Err(io::Error::other("terminal went away"))
    }

    fn consume(&mut self, _amt: usize) {}
}

fn publisher() -> Publisher {
    build_publisher(
        &PublisherConfig::new()
            .with_managers(1)
            .with_workers_per_manager(2)
            .with_max_work_millis(5)
            .with_thread_stack_size(256 * 1024),
    )
    .unwrap()
}

fn run(publisher: &Publisher, toggle: &CountingToggle, input: &str) -> (DriverExit, String) {
    let mut output = Vec::new();
    let exit = Driver::new(publisher, toggle).run(Cursor::new(input.to_string()), &mut output);
    (exit, String::from_utf8(output).unwrap())
}

#[test]
fn test_driver_full_session() {
    let publisher = publisher();
    let toggle = CountingToggle::default();

    let (exit, output) = run(&publisher, &toggle, "3\n0\nabc\nd\n-2\nq\n");

    assert_eq!(exit, DriverExit::Quit);
    assert_eq!(output.matches(PROMPT).count(), 6);
    assert_eq!(output.matches("Number must be greater than 0").count(), 2);
    assert_eq!(output.matches("Invalid input, must be a number (base 10).").count(), 1);
    assert_eq!(toggle.flips.load(Ordering::SeqCst), 1);
    assert!(publisher.is_shut_down());
    assert_eq!(publisher.stats().submitted, 3);

    publisher.await_termination();
}

#[test]
fn test_driver_end_of_input_shuts_down() {
    let publisher = publisher();
    let toggle = CountingToggle::default();

    let (exit, output) = run(&publisher, &toggle, "2\n");

    assert_eq!(exit, DriverExit::EndOfInput);
    assert_eq!(output.matches(PROMPT).count(), 2);
    assert!(publisher.is_shut_down());
    publisher.await_termination();
}

#[test]
fn test_driver_rejects_undecodable_line_and_continues() {
    let publisher = publisher();
    let toggle = CountingToggle::default();
    let mut input = vec![0xff, 0xfe, b'\n'];
    input.extend_from_slice(b"2\nq\n");
    let mut output = Vec::new();

    let exit = Driver::new(&publisher, &toggle).run(Cursor::new(input), &mut output);
    let output = String::from_utf8(output).unwrap();

    assert_eq!(exit, DriverExit::Quit);
    assert_eq!(output.matches(PROMPT).count(), 3);
    assert_eq!(output.matches("Invalid input, must be a number (base 10).").count(), 1);
    assert_eq!(publisher.stats().submitted, 2);
    publisher.await_termination();
}

#[test]
fn test_driver_io_error_shuts_down() {
    let publisher = publisher();
    let toggle = CountingToggle::default();
    let mut output = Vec::new();

    let exit = Driver::new(&publisher, &toggle).run(BrokenInput, &mut output);

    assert_eq!(exit, DriverExit::IoError);
    assert!(publisher.is_shut_down());
    assert_eq!(publisher.stats().submitted, 0);
    publisher.await_termination();
}

#[test]
fn test_driver_stops_when_publisher_rejects() {
    let publisher = publisher();
    publisher.shutdown();
    let toggle = CountingToggle::default();

    let (exit, _) = run(&publisher, &toggle, "5\nq\n");
    assert_eq!(exit, DriverExit::Rejected);
    publisher.await_termination();
}
