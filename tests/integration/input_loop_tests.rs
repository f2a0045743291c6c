//! Integration tests for the `firstchar-ctl` input loop.

use std::sync::Arc;

use firstchar_bus::requester::{run_input_loop, LoopSummary, PROMPT};
use firstchar_bus::AppError;

use super::test_helpers::{fast_requester, FakeBus};

async fn drive(bus: &Arc<FakeBus>, input: &str) -> (firstchar_bus::Result<LoopSummary>, String) {
    let requester = fast_requester(bus);
    let mut output = Vec::new();
    let result = run_input_loop(input.as_bytes(), &mut output, &requester).await;
    (result, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn replies_are_printed_after_each_prompt() {
    let bus = Arc::new(FakeBus::answering());

    let (result, output) = drive(&bus, "hello\nZ\n").await;

    assert_eq!(
        result.expect("clean end"),
        LoopSummary {
            answered: 2,
            rejected: 0
        }
    );
    assert_eq!(
        output,
        format!(
            "{PROMPT}Message from server: First char of hello is h\n\
             {PROMPT}Message from server: First char of Z is Z\n\
             {PROMPT}"
        )
    );
}

#[tokio::test]
async fn end_of_input_stops_without_bus_traffic() {
    let bus = Arc::new(FakeBus::answering());

    let (result, output) = drive(&bus, "").await;

    assert_eq!(result.expect("clean end"), LoopSummary::default());
    assert_eq!(output, PROMPT);
    assert!(bus.events().is_empty());
}

#[tokio::test]
async fn rejected_line_does_not_stop_the_loop() {
    let bus = Arc::new(FakeBus::answering());

    let (result, output) = drive(&bus, "\nabc\n").await;

    assert_eq!(
        result.expect("clean end"),
        LoopSummary {
            answered: 1,
            rejected: 1
        }
    );
    assert_eq!(
        output,
        format!("{PROMPT}{PROMPT}Message from server: First char of abc is a\n{PROMPT}")
    );
}

#[tokio::test]
async fn last_line_without_line_break_keeps_every_character() {
    let bus = Arc::new(FakeBus::answering());

    let (result, output) = drive(&bus, "abc").await;

    assert!(result.is_ok());
    assert_eq!(bus.calls(), vec!["abc".to_owned()]);
    assert!(output.contains("First char of abc is a"));
}

#[tokio::test]
async fn fatal_error_stops_before_the_next_line() {
    let bus = Arc::new(FakeBus::hanging());

    let (result, output) = drive(&bus, "first\nsecond\n").await;

    assert!(matches!(result, Err(AppError::Timeout(_))));
    assert_eq!(bus.calls(), vec!["first\n".to_owned()]);
    assert_eq!(output, PROMPT);
}
