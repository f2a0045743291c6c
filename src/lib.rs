#![forbid(unsafe_code)]

//! `firstchar-bus` — a D-Bus requester/responder pair.
//!
//! The requester sends a line of text to the responder's `first_char`
//! method; the responder answers with a sentence naming the line's first
//! character.

pub mod address;
pub mod bus;
pub mod config;
pub mod errors;
pub mod first_char;
pub mod logging;
pub mod requester;
pub mod responder;

pub use config::Config;
pub use errors::{AppError, Result};
