//! Text handling for the `first_char` method.
//!
//! The request argument is a line as typed by the operator, normally
//! ending in a line break. The break is not part of the content.

use crate::{AppError, Result};

/// Strip exactly one trailing line break, if there is one.
///
/// `"\r\n"` counts as a single line break.
#[must_use]
pub fn strip_line_break(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// First character of `text`, if any.
#[must_use]
pub fn first_char(text: &str) -> Option<char> {
    text.chars().next()
}

/// Build the reply sentence for one request argument.
///
/// # Errors
///
/// Returns `AppError::EmptyInput` when nothing is left after the line
/// break is stripped.
pub fn compose_reply(argument: &str) -> Result<String> {
    let content = strip_line_break(argument);
    let first = first_char(content).ok_or(AppError::EmptyInput)?;
    Ok(format!(
        "Message from server: First char of {content} is {first}"
    ))
}
