//! Query bridge between the Audex media index and an embedding host.
//!
//! This crate provides:
//! - A request/response surface (`querySongs`, `queryAlbums`, ...) that
//!   turns boundary calls into media-store queries
//! - A per-kind controller that runs each query on a background worker
//!   and supersedes an in-flight query when a newer one arrives
//! - An at-most-once reply slot so every request gets exactly one
//!   outcome, even under cancellation, duplicate completion or worker
//!   failure
//!
//! # Delivery protocol
//!
//! Each inbound call binds a fresh [`ReplySlot`] to the caller's
//! [`ResultDispatcher`]. The slot's atomic flag picks the single winner
//! among success, failure, supersede and unimplemented; everyone else
//! becomes a logged duplicate. Cancellation is cooperative: a retired
//! task checks its [`CancelToken`] before and after store I/O and drops
//! its own result instead of delivering stale rows.
//!
//! # Usage
//!
//! ```rust,ignore
//! use audex_bridge::{Bridge, ChannelDispatcher, MethodCall};
//! use std::sync::{mpsc, Arc};
//!
//! let bridge = Bridge::new(source); // source: Arc<dyn MediaSource>
//! let (tx, rx) = mpsc::channel();
//! let call: MethodCall = serde_json::from_str(
//!     r#"{"method":"querySongs","args":{"sortType":0,"orderType":0,"ignoreCase":true,"uri":0}}"#,
//! )?;
//! bridge.handle(&call, Arc::new(ChannelDispatcher::new(tx)));
//! let outcome = rx.recv()?; // exactly one outcome per call
//! ```

pub mod args;
pub mod controller;
pub mod dispatch;
pub mod format;
pub mod handler;
pub mod registry;
pub mod reply;
pub mod task;

pub use args::{ArgError, CallArgs};
pub use controller::QueryController;
pub use dispatch::{ChannelDispatcher, ErrorCode, Outcome, ResultDispatcher, TransmitError};
pub use handler::{method_kind, Bridge, BridgeOptions, MethodCall};
pub use registry::{HostHandle, InvocationContext, Registry, RegistryError};
pub use reply::ReplySlot;
pub use task::{CancelToken, QueryTask};
