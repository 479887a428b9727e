//! At-most-once reply delivery.

use crate::dispatch::{ErrorCode, Outcome, ResultDispatcher};
use audex_core::record::Record;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-assignment delivery slot bound to one boundary request.
///
/// The first terminal call wins the atomic `delivered` flag and performs
/// the actual transmission; every later call, from any thread, is
/// dropped with a warning. A failed transmission is logged and
/// swallowed, since there is no one left to reply to.
pub struct ReplySlot {
    delivered: AtomicBool,
    dispatcher: Arc<dyn ResultDispatcher>,
}

impl ReplySlot {
    pub fn new(dispatcher: Arc<dyn ResultDispatcher>) -> Arc<Self> {
        Arc::new(Self {
            delivered: AtomicBool::new(false),
            dispatcher,
        })
    }

    pub fn succeed(&self, records: Vec<Record>) {
        self.deliver(Outcome::Success { records }, "success");
    }

    pub fn fail(&self, code: ErrorCode, message: impl Into<String>) {
        self.deliver(Outcome::failure(code, message), "failure");
    }

    pub fn unimplemented(&self) {
        self.deliver(Outcome::Unimplemented, "unimplemented");
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    fn deliver(&self, outcome: Outcome, label: &'static str) {
        if self
            .delivered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            if let Err(err) = self.dispatcher.transmit(outcome) {
                tracing::error!(%err, outcome = label, "failed to transmit reply");
            }
        } else {
            tracing::warn!(outcome = label, "reply already sent, dropping duplicate");
        }
    }
}
