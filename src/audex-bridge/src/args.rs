//! Boundary argument decoding.
//!
//! Inbound calls carry integer enums (`sortType`, `orderType`, `uri`),
//! an `ignoreCase` flag and kind-specific filters. This module turns
//! them into a [`QueryDescriptor`]; the sort-column tables live here as
//! data.

use crate::format::profile_for;
use audex_core::query::{QueryDescriptor, QueryKind, RowFilter, ScopeSelector, SortSpec};
use serde_json::{Map, Value as ArgValue};
use thiserror::Error;

/// Argument mapping attached to one boundary call.
pub type CallArgs = Map<String, ArgValue>;

#[derive(Debug, Error)]
pub enum ArgError {
    #[error("missing required argument '{name}'")]
    Missing { name: &'static str },
    #[error("invalid value for argument '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Decode the arguments of a call for `kind` into a query descriptor.
/// `default_scope` is used when the call carries no `uri` argument.
pub fn decode(
    kind: QueryKind,
    args: &CallArgs,
    default_scope: ScopeSelector,
) -> Result<QueryDescriptor, ArgError> {
    let mut descriptor = QueryDescriptor::new(kind, decode_scope(args, default_scope)?);
    descriptor.sort = decode_sort(kind, args)?;
    descriptor.projection = profile_for(kind)
        .projection
        .map(|columns| columns.iter().map(|column| column.to_string()).collect());

    if kind == QueryKind::Songs {
        if let Some(path) = optional_str(args, "path")? {
            descriptor.filter = Some(RowFilter::under_path("_data", path));
        }
    }

    Ok(descriptor)
}

fn decode_scope(args: &CallArgs, default_scope: ScopeSelector) -> Result<ScopeSelector, ArgError> {
    // Path-index calls carry no arguments at all; any other caller may
    // also omit `uri` and take the configured default.
    match optional_int(args, "uri")? {
        None => Ok(default_scope),
        Some(0) => Ok(ScopeSelector::External),
        Some(1) => Ok(ScopeSelector::Internal),
        Some(other) => Err(ArgError::Invalid {
            name: "uri",
            reason: format!("expected 0 (external) or 1 (internal), got {other}"),
        }),
    }
}

fn decode_sort(kind: QueryKind, args: &CallArgs) -> Result<Option<SortSpec>, ArgError> {
    // The path index takes no sort arguments at all.
    if kind == QueryKind::PathIndex {
        return Ok(None);
    }

    let sort_type = optional_int(args, "sortType")?.unwrap_or(0);
    let column = sort_column(kind, sort_type);
    let mut sort = match require_int(args, "orderType")? {
        0 => SortSpec::ascending(column),
        1 => SortSpec::descending(column),
        other => {
            return Err(ArgError::Invalid {
                name: "orderType",
                reason: format!("expected 0 (ascending) or 1 (descending), got {other}"),
            })
        }
    };
    sort.case_insensitive = require_bool(args, "ignoreCase")?;
    Ok(Some(sort))
}

/// Per-kind `sortType` tables. Out-of-range values fall back to the
/// kind's default column (index 0).
fn sort_column(kind: QueryKind, sort_type: i64) -> &'static str {
    let table: &[&str] = match kind {
        QueryKind::Songs => &[
            "title",
            "artist",
            "album",
            "duration",
            "date_added",
            "size",
            "_display_name",
        ],
        QueryKind::Albums => &["album", "artist", "numsongs"],
        QueryKind::Artists => &["artist", "number_of_tracks", "number_of_albums"],
        QueryKind::Playlists => &["name", "date_added"],
        QueryKind::Genres => &["name"],
        QueryKind::PathIndex => &["_data"],
    };
    usize::try_from(sort_type)
        .ok()
        .and_then(|index| table.get(index))
        .copied()
        .unwrap_or(table[0])
}

fn require_int(args: &CallArgs, name: &'static str) -> Result<i64, ArgError> {
    match args.get(name) {
        None | Some(ArgValue::Null) => Err(ArgError::Missing { name }),
        Some(value) => value.as_i64().ok_or_else(|| ArgError::Invalid {
            name,
            reason: format!("expected an integer, got {value}"),
        }),
    }
}

fn optional_int(args: &CallArgs, name: &'static str) -> Result<Option<i64>, ArgError> {
    match args.get(name) {
        None | Some(ArgValue::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| ArgError::Invalid {
            name,
            reason: format!("expected an integer, got {value}"),
        }),
    }
}

fn require_bool(args: &CallArgs, name: &'static str) -> Result<bool, ArgError> {
    match args.get(name) {
        None | Some(ArgValue::Null) => Err(ArgError::Missing { name }),
        Some(value) => value.as_bool().ok_or_else(|| ArgError::Invalid {
            name,
            reason: format!("expected a boolean, got {value}"),
        }),
    }
}

fn optional_str(args: &CallArgs, name: &'static str) -> Result<Option<String>, ArgError> {
    match args.get(name) {
        None | Some(ArgValue::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|text| Some(text.to_owned()))
            .ok_or_else(|| ArgError::Invalid {
                name,
                reason: format!("expected a string, got {value}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audex_core::query::SortDirection;
    use serde_json::json;

    fn song_args() -> CallArgs {
        json!({
            "sortType": 0,
            "orderType": 0,
            "ignoreCase": true,
            "uri": 0,
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn decodes_title_ascending_external() {
        let descriptor = decode(QueryKind::Songs, &song_args(), ScopeSelector::External).unwrap();
        assert_eq!(descriptor.scope, ScopeSelector::External);
        let sort = descriptor.sort.unwrap();
        assert_eq!(sort.column, "title");
        assert_eq!(sort.direction, SortDirection::Ascending);
        assert!(sort.case_insensitive);
        assert!(descriptor.filter.is_none());
        assert!(descriptor.projection.is_some());
    }

    #[test]
    fn path_argument_becomes_data_filter() {
        let mut args = song_args();
        args.insert("path".into(), json!("/storage/music"));
        let descriptor = decode(QueryKind::Songs, &args, ScopeSelector::External).unwrap();
        let filter = descriptor.filter.unwrap();
        assert_eq!(filter.column, "_data");
        assert_eq!(filter.substring, "/storage/music/");
    }

    #[test]
    fn unknown_sort_type_falls_back_to_default_column() {
        let mut args = song_args();
        args.insert("sortType".into(), json!(99));
        let descriptor = decode(QueryKind::Songs, &args, ScopeSelector::External).unwrap();
        assert_eq!(descriptor.sort.unwrap().column, "title");
    }

    #[test]
    fn album_sort_table_resolves() {
        let mut args = song_args();
        args.insert("sortType".into(), json!(1));
        args.insert("orderType".into(), json!(1));
        let descriptor = decode(QueryKind::Albums, &args, ScopeSelector::External).unwrap();
        let sort = descriptor.sort.unwrap();
        assert_eq!(sort.column, "artist");
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn invalid_uri_is_rejected() {
        let mut args = song_args();
        args.insert("uri".into(), json!(7));
        assert!(matches!(
            decode(QueryKind::Songs, &args, ScopeSelector::External),
            Err(ArgError::Invalid { name: "uri", .. })
        ));
    }

    #[test]
    fn absent_uri_falls_back_to_the_default_scope() {
        let mut args = song_args();
        args.remove("uri");
        let descriptor = decode(QueryKind::Songs, &args, ScopeSelector::Internal).unwrap();
        assert_eq!(descriptor.scope, ScopeSelector::Internal);

        // An explicit uri still overrides the default.
        let descriptor = decode(QueryKind::Songs, &song_args(), ScopeSelector::Internal).unwrap();
        assert_eq!(descriptor.scope, ScopeSelector::External);
    }

    #[test]
    fn missing_order_type_is_rejected() {
        let mut args = song_args();
        args.remove("orderType");
        assert!(matches!(
            decode(QueryKind::Songs, &args, ScopeSelector::External),
            Err(ArgError::Missing { name: "orderType" })
        ));
    }

    #[test]
    fn path_index_takes_no_arguments() {
        let descriptor =
            decode(QueryKind::PathIndex, &CallArgs::new(), ScopeSelector::External).unwrap();
        assert_eq!(descriptor.scope, ScopeSelector::External);
        assert!(descriptor.sort.is_none());
        assert!(descriptor.filter.is_none());
    }
}
