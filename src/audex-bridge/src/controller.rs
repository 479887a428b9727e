//! Per-kind query dispatch: newest request wins.

use crate::dispatch::{ErrorCode, ResultDispatcher};
use crate::format::profile_for;
use crate::reply::ReplySlot;
use crate::task::{CancelToken, QueryTask};
use audex_core::query::{QueryDescriptor, QueryKind};
use audex_core::source::MediaSource;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

struct ActiveTask {
    token: CancelToken,
    slot: Arc<ReplySlot>,
    worker: Option<JoinHandle<()>>,
}

/// Owns at most one in-flight [`QueryTask`] per query kind.
///
/// `dispatch` retires the previous task before starting the new one:
/// its token is cancelled and its slot receives an explicit
/// `SUPERSEDED` failure. A retired task that already passed its last
/// cancellation checkpoint wins its own slot instead, in which case the
/// superseded failure is the logged duplicate. Controllers for
/// different kinds never interact.
pub struct QueryController {
    kind: QueryKind,
    source: Arc<dyn MediaSource>,
    current: Mutex<Option<ActiveTask>>,
    detailed_log: bool,
}

impl QueryController {
    pub fn new(kind: QueryKind, source: Arc<dyn MediaSource>) -> Self {
        Self {
            kind,
            source,
            current: Mutex::new(None),
            detailed_log: false,
        }
    }

    /// Have spawned tasks log failures with the resolved descriptor.
    pub fn with_detailed_logging(mut self, enabled: bool) -> Self {
        self.detailed_log = enabled;
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Start a query for this kind, superseding any in-flight one.
    /// Returns without waiting for the worker.
    pub fn dispatch(&self, descriptor: QueryDescriptor, dispatcher: Arc<dyn ResultDispatcher>) {
        debug_assert_eq!(descriptor.kind, self.kind);

        let slot = ReplySlot::new(dispatcher);
        let token = CancelToken::new();
        let task = QueryTask::new(
            descriptor,
            profile_for(self.kind),
            Arc::clone(&self.source),
            Arc::clone(&slot),
            token.clone(),
        )
        .with_detailed_logging(self.detailed_log);

        let mut current = self.current.lock().unwrap();
        if let Some(previous) = current.take() {
            previous.token.cancel();
            previous.slot.fail(
                ErrorCode::Superseded,
                format!("superseded by a newer {} query", self.kind.as_str()),
            );
            tracing::debug!(kind = self.kind.as_str(), "retired in-flight query");
        }

        let worker = task.spawn();
        *current = Some(ActiveTask {
            token,
            slot,
            worker,
        });
    }

    /// Cancel the in-flight task, if any, without starting a new one.
    /// Its caller receives a `SUPERSEDED` failure unless the task has
    /// already delivered.
    pub fn cancel_current(&self) {
        if let Some(active) = self.current.lock().unwrap().take() {
            active.token.cancel();
            active.slot.fail(
                ErrorCode::Superseded,
                format!("{} query cancelled", self.kind.as_str()),
            );
        }
    }

    /// Block until the tracked worker (if any) has terminated. Teardown
    /// and test helper; `dispatch` itself never waits.
    pub fn join_current(&self) {
        let worker = self
            .current
            .lock()
            .unwrap()
            .as_mut()
            .and_then(|active| active.worker.take());
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}
