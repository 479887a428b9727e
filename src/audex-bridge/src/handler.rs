//! Method-name dispatch for inbound boundary calls.

use crate::args::{self, CallArgs};
use crate::controller::QueryController;
use crate::dispatch::{ErrorCode, ResultDispatcher};
use crate::registry::Registry;
use crate::reply::ReplySlot;
use audex_core::config::Config;
use audex_core::query::{QueryKind, ScopeSelector};
use audex_core::source::MediaSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One inbound boundary request: a method name plus its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: CallArgs,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: CallArgs) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// A call with no arguments.
    pub fn named(method: impl Into<String>) -> Self {
        Self::new(method, CallArgs::new())
    }
}

/// Maps a boundary method name to the query kind it serves.
pub fn method_kind(method: &str) -> Option<QueryKind> {
    match method {
        "querySongs" => Some(QueryKind::Songs),
        "queryAlbums" => Some(QueryKind::Albums),
        "queryArtists" => Some(QueryKind::Artists),
        "queryPlaylists" => Some(QueryKind::Playlists),
        "queryGenres" => Some(QueryKind::Genres),
        "queryAllPath" => Some(QueryKind::PathIndex),
        _ => None,
    }
}

/// Host-tunable bridge behavior, usually lifted straight from the
/// loaded [`Config`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeOptions {
    /// Log query failures with the full resolved descriptor.
    pub detailed_log: bool,
    /// Scope assumed when a call carries no `uri` argument.
    pub default_scope: ScopeSelector,
}

impl From<&Config> for BridgeOptions {
    fn from(config: &Config) -> Self {
        Self {
            detailed_log: config.detailed_log,
            default_scope: config.default_scope,
        }
    }
}

/// The plugin's call surface: one [`QueryController`] per kind, shared
/// access to the media source.
pub struct Bridge {
    controllers: HashMap<QueryKind, QueryController>,
    options: BridgeOptions,
}

impl Bridge {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self::with_options(source, BridgeOptions::default())
    }

    pub fn with_options(source: Arc<dyn MediaSource>, options: BridgeOptions) -> Self {
        let controllers = QueryKind::ALL
            .into_iter()
            .map(|kind| {
                let controller = QueryController::new(kind, Arc::clone(&source))
                    .with_detailed_logging(options.detailed_log);
                (kind, controller)
            })
            .collect();
        Self {
            controllers,
            options,
        }
    }

    /// Handle one request. Non-blocking: the reply arrives through the
    /// dispatcher once the background query settles. Every call yields
    /// exactly one outcome on its own dispatcher.
    pub fn handle(&self, call: &MethodCall, dispatcher: Arc<dyn ResultDispatcher>) {
        let Some(kind) = method_kind(&call.method) else {
            tracing::debug!(method = %call.method, "unknown method");
            ReplySlot::new(dispatcher).unimplemented();
            return;
        };

        match args::decode(kind, &call.args, self.options.default_scope) {
            Ok(descriptor) => {
                tracing::debug!(
                    method = %call.method,
                    kind = kind.as_str(),
                    scope = ?descriptor.scope,
                    sort = ?descriptor.sort,
                    filter = ?descriptor.filter,
                    "query config"
                );
                self.controller(kind).dispatch(descriptor, dispatcher);
            }
            Err(err) => {
                tracing::warn!(method = %call.method, %err, "rejecting call");
                ReplySlot::new(dispatcher).fail(ErrorCode::QueryError, err.to_string());
            }
        }
    }

    /// Handle the request currently recorded in the boundary registry.
    ///
    /// A request recorded after the host's platform handle was torn
    /// down fails through its dispatcher with `NOT_INITIALIZED`. With
    /// nothing recorded at all there is no dispatcher to fail through;
    /// the request is logged and dropped, per contract.
    pub fn handle_current(&self, registry: &Registry) {
        match registry.current() {
            Ok(context) => {
                if registry.host_detached() {
                    tracing::warn!(method = %context.call.method, "host detached, failing request");
                    ReplySlot::new(context.dispatcher).fail(
                        ErrorCode::NotInitialized,
                        "the host detached before the call could run",
                    );
                    return;
                }
                self.handle(&context.call, context.dispatcher);
            }
            Err(err) => tracing::error!(%err, "dropping request"),
        }
    }

    pub fn controller(&self, kind: QueryKind) -> &QueryController {
        // Every kind is inserted in `new`.
        &self.controllers[&kind]
    }

    /// Wait for every in-flight worker to terminate. Teardown helper.
    pub fn join_all(&self) {
        for controller in self.controllers.values() {
            controller.join_current();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_map_to_kinds() {
        assert_eq!(method_kind("querySongs"), Some(QueryKind::Songs));
        assert_eq!(method_kind("queryAllPath"), Some(QueryKind::PathIndex));
        assert_eq!(method_kind("queryArtwork"), None);
        assert_eq!(method_kind(""), None);
    }

    #[test]
    fn method_call_deserializes_without_args() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"queryGenres"}"#).unwrap();
        assert_eq!(call.method, "queryGenres");
        assert!(call.args.is_empty());
    }

    #[test]
    fn options_lift_from_config() {
        let mut config = Config::default();
        config.detailed_log = true;
        config.default_scope = ScopeSelector::Internal;

        let options = BridgeOptions::from(&config);
        assert!(options.detailed_log);
        assert_eq!(options.default_scope, ScopeSelector::Internal);

        let defaults = BridgeOptions::default();
        assert!(!defaults.detailed_log);
        assert_eq!(defaults.default_scope, ScopeSelector::External);
    }
}
