//! Cancellable background query execution.

use crate::dispatch::ErrorCode;
use crate::format::KindProfile;
use crate::reply::ReplySlot;
use audex_core::query::QueryDescriptor;
use audex_core::source::MediaSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Cooperative cancellation flag shared between a controller and its
/// task.
///
/// Best effort only: cancelling never interrupts store I/O that is
/// already underway; the task drops its own result at the next
/// checkpoint instead.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// One background query: run the store query, shape the rows, deliver
/// at most once through the bound slot.
///
/// Cancellation is checked at two checkpoints: before the store query
/// starts and after it returns, before any row is read. A task past the
/// second checkpoint runs to completion and delivers to its own slot.
pub struct QueryTask {
    descriptor: QueryDescriptor,
    profile: &'static KindProfile,
    source: Arc<dyn MediaSource>,
    slot: Arc<ReplySlot>,
    token: CancelToken,
    detailed_log: bool,
}

impl QueryTask {
    pub fn new(
        descriptor: QueryDescriptor,
        profile: &'static KindProfile,
        source: Arc<dyn MediaSource>,
        slot: Arc<ReplySlot>,
        token: CancelToken,
    ) -> Self {
        Self {
            descriptor,
            profile,
            source,
            slot,
            token,
            detailed_log: false,
        }
    }

    /// Log query failures with the full resolved descriptor instead of
    /// just the error message. Off unless the host's config asks for it.
    pub fn with_detailed_logging(mut self, enabled: bool) -> Self {
        self.detailed_log = enabled;
        self
    }

    fn log_failure(&self, stage: &'static str, err: &dyn std::fmt::Display) {
        let kind = self.descriptor.kind.as_str();
        if self.detailed_log {
            tracing::error!(kind, %err, stage, descriptor = ?self.descriptor, "query failed");
        } else {
            tracing::error!(kind, %err, stage, "query failed");
        }
    }

    /// Move the task onto its own worker thread. Store I/O may block
    /// there; it must never block the boundary caller.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        let name = format!("audex-query-{}", self.descriptor.kind.as_str());
        let slot = Arc::clone(&self.slot);
        match thread::Builder::new().name(name).spawn(move || self.run()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                slot.fail(
                    ErrorCode::QueryError,
                    format!("failed to start query worker: {err}"),
                );
                None
            }
        }
    }

    pub(crate) fn run(self) {
        let kind = self.descriptor.kind.as_str();

        if self.token.is_cancelled() {
            tracing::debug!(kind, "cancelled before store query");
            return;
        }

        let cursor = match self.source.query(&self.descriptor) {
            Ok(cursor) => cursor,
            Err(err) => {
                self.log_failure("store query", &err);
                self.slot
                    .fail(ErrorCode::QueryError, format!("error querying {kind}: {err}"));
                return;
            }
        };

        if self.token.is_cancelled() {
            // The cursor drops here; a superseded task must never report
            // stale rows after a newer request took over.
            tracing::debug!(kind, "cancelled before reading rows");
            return;
        }

        let mut records = Vec::new();
        // An absent cursor is zero rows, not an error.
        if let Some(mut cursor) = cursor {
            loop {
                match cursor.next_row() {
                    Ok(Some(row)) => records.push((self.profile.format)(&self.descriptor, row)),
                    Ok(None) => break,
                    Err(err) => {
                        self.log_failure("row read", &err);
                        self.slot.fail(
                            ErrorCode::QueryError,
                            format!("error reading {kind} rows: {err}"),
                        );
                        return;
                    }
                }
            }
        }

        let records = (self.profile.finalize)(records);
        tracing::debug!(kind, rows = records.len(), "query finished");
        self.slot.succeed(records);
    }
}
