//! Parser callback messages and payload decoding.

pub mod decoder;
pub mod feed;

#[cfg(test)]
mod feed_test;

pub use decoder::{DelimitedDecoder, PayloadDecoder};
pub use feed::{feed_lines, FeedStats};

/// A `(msgtype, payload)` pair delivered by the parser subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackMessage {
    pub msgtype: i32,
    pub payload: String,
}

impl CallbackMessage {
    pub fn new(msgtype: i32, payload: impl Into<String>) -> Self {
        Self {
            msgtype,
            payload: payload.into(),
        }
    }

    /// Parses a `<msgtype>\t<payload>` line as produced by the stdin feed.
    pub fn from_line(line: &str) -> Option<Self> {
        let (msgtype, payload) = line.split_once('\t')?;
        let msgtype = msgtype.trim().parse().ok()?;
        Some(Self::new(msgtype, payload))
    }
}

impl From<(i32, String)> for CallbackMessage {
    fn from((msgtype, payload): (i32, String)) -> Self {
        Self { msgtype, payload }
    }
}
