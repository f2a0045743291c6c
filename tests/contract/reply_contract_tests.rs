//! Contract tests for the `first_char` reply sentence and rejections.

use firstchar_bus::address::{
    BusAddress, ERROR_FAILED, INTERFACE_NAME, METHOD_NAME, SERVER_OBJECT_PATH,
};
use firstchar_bus::first_char::strip_line_break;
use firstchar_bus::responder::{Disposition, Inbound, MethodCall, Responder};

fn answer(argument: &str) -> Disposition {
    let inbound = Inbound::MethodCall(MethodCall {
        path: Some(SERVER_OBJECT_PATH.into()),
        interface: Some(INTERFACE_NAME.into()),
        member: Some(METHOD_NAME.into()),
        argument: Ok(argument.into()),
    });
    Responder::new(BusAddress::default()).handle(&inbound, &mut std::io::sink())
}

#[test]
fn hello_scenario() {
    assert_eq!(
        answer("hello\n"),
        Disposition::Return("Message from server: First char of hello is h".into())
    );
}

#[test]
fn single_letter_scenario() {
    assert_eq!(
        answer("Z\n"),
        Disposition::Return("Message from server: First char of Z is Z".into())
    );
}

#[test]
fn reply_follows_the_sentence_pattern_for_ascii_lines() {
    let lines = [
        "a\n",
        "ab\n",
        "The quick brown fox\n",
        "0123456789\n",
        "~!@#$%^&*()\n",
        "trailing space \n",
        "tab\tinside\n",
    ];
    for line in lines {
        let expected = format!(
            "Message from server: First char of {} is {}",
            strip_line_break(line),
            &line[..1]
        );
        assert_eq!(answer(line), Disposition::Return(expected), "line {line:?}");
    }
}

#[test]
fn every_request_gets_exactly_one_answer() {
    for line in ["\n", "", "\r\n"] {
        match answer(line) {
            Disposition::Error { name, message } => {
                assert_eq!(name, ERROR_FAILED, "line {line:?}");
                assert!(message.starts_with("Error in input"), "line {line:?}");
            }
            other => panic!("line {line:?} must be rejected, got {other:?}"),
        }
    }
}
