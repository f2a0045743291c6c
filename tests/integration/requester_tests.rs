//! Integration tests for `Requester::send_first_char_request`.
//!
//! Covers name acquisition, the retry budget, the reply timeout, and the
//! release-after-every-call rule.

use std::sync::Arc;

use firstchar_bus::address::{CLIENT_BUS_NAME, ERROR_FAILED};
use firstchar_bus::bus::{NameQueueing, NameReply};
use firstchar_bus::AppError;

use super::test_helpers::{fast_requester, CallBehavior, Event, FakeBus};

fn request(name: &str) -> Event {
    Event::RequestName(name.to_owned(), NameQueueing::Queue)
}

fn release(name: &str) -> Event {
    Event::ReleaseName(name.to_owned())
}

#[tokio::test]
async fn hello_round_trip_registers_calls_and_releases() {
    let bus = Arc::new(FakeBus::answering());
    let requester = fast_requester(&bus);

    let reply = requester
        .send_first_char_request("hello\n")
        .await
        .expect("reply");

    assert_eq!(reply, "Message from server: First char of hello is h");
    assert_eq!(
        bus.events(),
        vec![
            request(CLIENT_BUS_NAME),
            Event::Call("hello\n".into()),
            release(CLIENT_BUS_NAME),
        ]
    );
}

#[tokio::test]
async fn argument_is_sent_with_its_line_break() {
    let bus = Arc::new(FakeBus::answering());
    let requester = fast_requester(&bus);

    requester.send_first_char_request("Z\n").await.expect("reply");

    assert_eq!(bus.calls(), vec!["Z\n".to_owned()]);
    assert_eq!(bus.echoed(), "Z\n");
}

#[tokio::test]
async fn sequential_calls_each_register_and_release() {
    let bus = Arc::new(FakeBus::answering());
    let requester = fast_requester(&bus);

    let first = requester.send_first_char_request("abc\n").await.expect("first");
    let second = requester.send_first_char_request("xyz\n").await.expect("second");

    assert_eq!(first, "Message from server: First char of abc is a");
    assert_eq!(second, "Message from server: First char of xyz is x");
    assert_eq!(
        bus.events(),
        vec![
            request(CLIENT_BUS_NAME),
            Event::Call("abc\n".into()),
            release(CLIENT_BUS_NAME),
            request(CLIENT_BUS_NAME),
            Event::Call("xyz\n".into()),
            release(CLIENT_BUS_NAME),
        ]
    );
}

#[tokio::test]
async fn queued_name_is_polled_until_granted() {
    let bus = Arc::new(
        FakeBus::answering().with_name_replies([NameReply::InQueue, NameReply::InQueue]),
    );
    let requester = fast_requester(&bus);

    let reply = requester.send_first_char_request("q\n").await.expect("reply");

    assert_eq!(reply, "Message from server: First char of q is q");
    let requests = bus
        .events()
        .iter()
        .filter(|event| matches!(event, Event::RequestName(..)))
        .count();
    assert_eq!(requests, 3);
}

#[tokio::test]
async fn already_owner_counts_as_granted() {
    let bus = Arc::new(FakeBus::answering().with_name_replies([NameReply::AlreadyOwner]));
    let requester = fast_requester(&bus);

    let reply = requester.send_first_char_request("a\n").await;

    assert!(reply.is_ok());
}

#[tokio::test]
async fn queued_past_budget_fails_and_leaves_queue() {
    let bus = Arc::new(FakeBus::answering().with_name_replies([
        NameReply::InQueue,
        NameReply::InQueue,
        NameReply::InQueue,
    ]));
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("late\n")
        .await
        .expect_err("budget exhausted");

    assert!(matches!(err, AppError::NameUnavailable(_)), "got {err:?}");
    assert!(bus.calls().is_empty(), "nothing may be sent without the name");
    assert_eq!(bus.events().last(), Some(&release(CLIENT_BUS_NAME)));
}

#[tokio::test]
async fn refused_name_fails_without_retry() {
    let bus = Arc::new(FakeBus::answering().with_name_replies([NameReply::Exists]));
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("x\n")
        .await
        .expect_err("refused");

    assert!(matches!(err, AppError::NameUnavailable(_)));
    assert_eq!(bus.events(), vec![request(CLIENT_BUS_NAME)]);
}

#[tokio::test]
async fn silent_responder_times_out_and_still_releases() {
    let bus = Arc::new(FakeBus::hanging());
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("hello\n")
        .await
        .expect_err("timeout");

    assert!(matches!(err, AppError::Timeout(_)), "got {err:?}");
    assert_eq!(bus.events().last(), Some(&release(CLIENT_BUS_NAME)));
}

#[tokio::test]
async fn line_break_only_gets_explicit_error_reply() {
    let bus = Arc::new(FakeBus::answering());
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("\n")
        .await
        .expect_err("empty content");

    match &err {
        AppError::Remote { name, message } => {
            assert_eq!(name, ERROR_FAILED);
            assert!(message.starts_with("Error in input"), "message: {message}");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert!(err.is_input_rejection());
    assert_eq!(bus.events().last(), Some(&release(CLIENT_BUS_NAME)));
}

#[tokio::test]
async fn empty_line_is_never_sent() {
    let bus = Arc::new(FakeBus::answering());
    let requester = fast_requester(&bus);

    let err = requester.send_first_char_request("").await.expect_err("empty");

    assert_eq!(err, AppError::EmptyInput);
    assert!(bus.events().is_empty());
}

#[tokio::test]
async fn transport_failure_propagates_after_release() {
    let bus = Arc::new(FakeBus::with_behavior(CallBehavior::Fail(AppError::Bus(
        "connection reset".into(),
    ))));
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("hello\n")
        .await
        .expect_err("transport failure");

    assert_eq!(err, AppError::Bus("connection reset".into()));
    assert_eq!(bus.events().last(), Some(&release(CLIENT_BUS_NAME)));
}

#[tokio::test]
async fn failed_release_is_reported() {
    let bus = Arc::new(FakeBus::answering().failing_release());
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("hello\n")
        .await
        .expect_err("release failure");

    assert!(matches!(err, AppError::Bus(_)));
}

#[tokio::test]
async fn call_error_wins_over_release_error() {
    let bus = Arc::new(FakeBus::hanging().failing_release());
    let requester = fast_requester(&bus);

    let err = requester
        .send_first_char_request("hello\n")
        .await
        .expect_err("timeout");

    assert!(matches!(err, AppError::Timeout(_)), "got {err:?}");
}
