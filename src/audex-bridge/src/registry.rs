//! Boundary-adapter registry for host-owned handles and the current
//! call.
//!
//! The query core never reads this: [`crate::handler::Bridge::handle`]
//! takes the call and dispatcher explicitly. The registry exists for
//! embedding hosts that deliver those pieces out of band and cannot
//! thread a context value themselves. It holds only weak references, so
//! it never extends a host object's lifetime past the host's own
//! teardown.

use crate::dispatch::ResultDispatcher;
use crate::handler::MethodCall;
use std::sync::{Arc, RwLock, Weak};
use thiserror::Error;

/// Opaque host-owned platform object (window, activity, channel...).
pub trait HostHandle: Send + Sync {}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry accessed before the host supplied {what}")]
    NotInitialized { what: &'static str },
}

/// Snapshot of the current inbound request. Exactly one per request;
/// replaced wholesale when the next request arrives.
#[derive(Clone)]
pub struct InvocationContext {
    pub call: MethodCall,
    pub dispatcher: Arc<dyn ResultDispatcher>,
}

struct StoredCall {
    call: MethodCall,
    dispatcher: Weak<dyn ResultDispatcher>,
}

#[derive(Default)]
pub struct Registry {
    host: RwLock<Option<Weak<dyn HostHandle>>>,
    current: RwLock<Option<StoredCall>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host's platform handle. Set once at attach time.
    pub fn set_host_handle(&self, handle: &Arc<dyn HostHandle>) {
        *self.host.write().unwrap() = Some(Arc::downgrade(handle));
    }

    pub fn host_handle(&self) -> Result<Arc<dyn HostHandle>, RegistryError> {
        self.host
            .read()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(RegistryError::NotInitialized {
                what: "the platform handle",
            })
    }

    /// True when a host handle was recorded and has since been dropped.
    /// A registry that never saw a handle is not detached; headless
    /// embeddings work without one.
    pub fn host_detached(&self) -> bool {
        self.host
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|weak| weak.upgrade().is_none())
    }

    /// Record the current request. Replaced on every inbound call.
    pub fn set_invocation(&self, call: MethodCall, dispatcher: &Arc<dyn ResultDispatcher>) {
        *self.current.write().unwrap() = Some(StoredCall {
            call,
            dispatcher: Arc::downgrade(dispatcher),
        });
    }

    /// The current request, or `NotInitialized` if no request was ever
    /// recorded or the host already dropped its dispatcher.
    pub fn current(&self) -> Result<InvocationContext, RegistryError> {
        let guard = self.current.read().unwrap();
        let stored = guard.as_ref().ok_or(RegistryError::NotInitialized {
            what: "a call and result dispatcher",
        })?;
        let dispatcher = stored
            .dispatcher
            .upgrade()
            .ok_or(RegistryError::NotInitialized {
                what: "a live result dispatcher",
            })?;
        Ok(InvocationContext {
            call: stored.call.clone(),
            dispatcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Outcome, TransmitError};

    struct NullDispatcher;

    impl ResultDispatcher for NullDispatcher {
        fn transmit(&self, _outcome: Outcome) -> Result<(), TransmitError> {
            Ok(())
        }
    }

    struct FakeHandle;

    impl HostHandle for FakeHandle {}

    #[test]
    fn current_before_set_is_not_initialized() {
        let registry = Registry::new();
        assert!(matches!(
            registry.current(),
            Err(RegistryError::NotInitialized { .. })
        ));
        assert!(matches!(
            registry.host_handle(),
            Err(RegistryError::NotInitialized { .. })
        ));
    }

    #[test]
    fn set_then_current_round_trips() {
        let registry = Registry::new();
        let dispatcher: Arc<dyn ResultDispatcher> = Arc::new(NullDispatcher);
        registry.set_invocation(MethodCall::named("querySongs"), &dispatcher);

        let context = registry.current().unwrap();
        assert_eq!(context.call.method, "querySongs");
    }

    #[test]
    fn dropped_dispatcher_reads_as_not_initialized() {
        let registry = Registry::new();
        let dispatcher: Arc<dyn ResultDispatcher> = Arc::new(NullDispatcher);
        registry.set_invocation(MethodCall::named("querySongs"), &dispatcher);
        drop(dispatcher);
        assert!(matches!(
            registry.current(),
            Err(RegistryError::NotInitialized { .. })
        ));
    }

    #[test]
    fn weak_host_handle_does_not_keep_host_alive() {
        let registry = Registry::new();
        let handle: Arc<dyn HostHandle> = Arc::new(FakeHandle);
        registry.set_host_handle(&handle);
        assert!(registry.host_handle().is_ok());
        drop(handle);
        assert!(matches!(
            registry.host_handle(),
            Err(RegistryError::NotInitialized { .. })
        ));
    }

    #[test]
    fn detachment_requires_a_handle_to_have_been_set() {
        let registry = Registry::new();
        assert!(!registry.host_detached());

        let handle: Arc<dyn HostHandle> = Arc::new(FakeHandle);
        registry.set_host_handle(&handle);
        assert!(!registry.host_detached());

        drop(handle);
        assert!(registry.host_detached());
    }

    #[test]
    fn newer_invocation_replaces_older() {
        let registry = Registry::new();
        let first: Arc<dyn ResultDispatcher> = Arc::new(NullDispatcher);
        let second: Arc<dyn ResultDispatcher> = Arc::new(NullDispatcher);
        registry.set_invocation(MethodCall::named("querySongs"), &first);
        registry.set_invocation(MethodCall::named("queryAlbums"), &second);
        assert_eq!(registry.current().unwrap().call.method, "queryAlbums");
    }
}
