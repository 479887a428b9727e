//! Boundary-facing result transmission.
//!
//! A [`ResultDispatcher`] performs the mechanical cross-boundary send of
//! one [`Outcome`]. Exactly-once invocation is the caller's
//! responsibility (see [`crate::reply::ReplySlot`]); implementations
//! only have to move the outcome across and report whether the channel
//! was still open.

use audex_core::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Error code strings carried by a failure outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    QueryError,
    Superseded,
    NotInitialized,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::QueryError => "QUERY_ERROR",
            ErrorCode::Superseded => "SUPERSEDED",
            ErrorCode::NotInitialized => "NOT_INITIALIZED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reply to one boundary request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        records: Vec<Record>,
    },
    Failure {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },
    /// The requested method is not part of this plugin's surface.
    Unimplemented,
}

impl Outcome {
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Outcome::Failure {
            code,
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransmitError {
    #[error("boundary channel closed")]
    ChannelClosed,
    #[error("boundary send failed: {message}")]
    SendFailed { message: String },
}

pub trait ResultDispatcher: Send + Sync {
    fn transmit(&self, outcome: Outcome) -> Result<(), TransmitError>;
}

/// Dispatcher backed by an in-process channel. The embedding host owns
/// the receiving end; a dropped receiver shows up as a closed channel.
pub struct ChannelDispatcher {
    tx: Sender<Outcome>,
}

impl ChannelDispatcher {
    pub fn new(tx: Sender<Outcome>) -> Self {
        Self { tx }
    }
}

impl ResultDispatcher for ChannelDispatcher {
    fn transmit(&self, outcome: Outcome) -> Result<(), TransmitError> {
        self.tx.send(outcome).map_err(|_| TransmitError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = Outcome::failure(ErrorCode::QueryError, "boom");
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""status":"failure""#));
        assert!(json.contains(r#""code":"QUERY_ERROR""#));
        assert!(json.contains(r#""details":null"#));
    }

    #[test]
    fn channel_dispatcher_delivers() {
        let (tx, rx) = mpsc::channel();
        let dispatcher = ChannelDispatcher::new(tx);
        dispatcher.transmit(Outcome::Unimplemented).unwrap();
        assert_eq!(rx.recv().unwrap(), Outcome::Unimplemented);
    }

    #[test]
    fn closed_channel_reports_transmit_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let dispatcher = ChannelDispatcher::new(tx);
        assert!(matches!(
            dispatcher.transmit(Outcome::Unimplemented),
            Err(TransmitError::ChannelClosed)
        ));
    }
}
