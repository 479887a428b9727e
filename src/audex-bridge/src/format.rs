//! Per-kind projection and row-shaping tables.
//!
//! Kind-specific behavior is data, not code: each [`QueryKind`] maps to
//! a [`KindProfile`] naming its projection, its per-row formatter and a
//! whole-result finalize step.

use audex_core::query::{QueryDescriptor, QueryKind, ScopeSelector};
use audex_core::record::{Record, Value};
use std::collections::HashSet;
use std::path::Path;

/// Columns fetched for song queries. Other kinds take every column the
/// store has.
pub const SONG_PROJECTION: &[&str] = &[
    "_data",
    "_display_name",
    "_id",
    "album",
    "album_id",
    "artist",
    "artist_id",
    "bookmark",
    "composer",
    "date_added",
    "date_modified",
    "duration",
    "size",
    "title",
    "track",
];

pub struct KindProfile {
    pub kind: QueryKind,
    pub projection: Option<&'static [&'static str]>,
    pub format: fn(&QueryDescriptor, Record) -> Record,
    pub finalize: fn(Vec<Record>) -> Vec<Record>,
}

pub fn profile_for(kind: QueryKind) -> &'static KindProfile {
    match kind {
        QueryKind::Songs => &SONGS,
        QueryKind::Albums => &ALBUMS,
        QueryKind::Artists => &ARTISTS,
        QueryKind::Playlists => &PLAYLISTS,
        QueryKind::Genres => &GENRES,
        QueryKind::PathIndex => &PATH_INDEX,
    }
}

static SONGS: KindProfile = KindProfile {
    kind: QueryKind::Songs,
    projection: Some(SONG_PROJECTION),
    format: format_song,
    finalize: keep_all,
};

static ALBUMS: KindProfile = KindProfile {
    kind: QueryKind::Albums,
    projection: None,
    format: format_album,
    finalize: keep_all,
};

static ARTISTS: KindProfile = KindProfile {
    kind: QueryKind::Artists,
    projection: None,
    format: format_passthrough,
    finalize: keep_all,
};

static PLAYLISTS: KindProfile = KindProfile {
    kind: QueryKind::Playlists,
    projection: None,
    format: format_passthrough,
    finalize: keep_all,
};

static GENRES: KindProfile = KindProfile {
    kind: QueryKind::Genres,
    projection: None,
    format: format_passthrough,
    finalize: keep_all,
};

static PATH_INDEX: KindProfile = KindProfile {
    kind: QueryKind::PathIndex,
    projection: None,
    format: format_parent_path,
    finalize: dedupe_paths,
};

fn keep_all(records: Vec<Record>) -> Vec<Record> {
    records
}

fn format_passthrough(_descriptor: &QueryDescriptor, row: Record) -> Record {
    row
}

/// Enrich a song row with the extras callers expect: file extension,
/// display name without it, and a derived content URI.
fn format_song(descriptor: &QueryDescriptor, mut row: Record) -> Record {
    let display_name = row
        .get("_display_name")
        .and_then(Value::as_text)
        .map(str::to_owned);
    if let Some(name) = display_name {
        if let Some((stem, extension)) = name.rsplit_once('.') {
            row.insert("_display_name_wo_ext", stem);
            row.insert("file_extension", extension);
        }
    }

    if let Some(id) = row.get("_id").and_then(Value::as_int) {
        row.insert("_uri", media_uri(descriptor.scope, id));
    }

    row
}

/// Newer platforms report an empty `album_art`; drop the column so
/// callers fall back to their artwork query instead of a blank path.
fn format_album(_descriptor: &QueryDescriptor, mut row: Record) -> Record {
    let art_is_blank = match row.get("album_art") {
        Some(Value::Null) => true,
        Some(Value::Text(path)) => path.is_empty(),
        _ => false,
    };
    if art_is_blank {
        row.remove("album_art");
    }
    row
}

/// Map a song row to its parent directory. Rows without a usable data
/// path become empty records and are discarded by the finalize step.
fn format_parent_path(_descriptor: &QueryDescriptor, row: Record) -> Record {
    let mut out = Record::new();
    if let Some(data) = row.get("_data").and_then(Value::as_text) {
        if let Some(parent) = Path::new(data).parent() {
            out.insert("path", parent.to_string_lossy().into_owned());
        }
    }
    out
}

fn dedupe_paths(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| match record.get("path") {
            Some(Value::Text(path)) if !path.is_empty() => seen.insert(path.clone()),
            _ => false,
        })
        .collect()
}

fn media_uri(scope: ScopeSelector, id: i64) -> String {
    let volume = match scope {
        ScopeSelector::External => "external",
        ScopeSelector::Internal => "internal",
    };
    format!("content://media/{volume}/audio/media/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_descriptor() -> QueryDescriptor {
        QueryDescriptor::new(QueryKind::Songs, ScopeSelector::External)
    }

    #[test]
    fn song_rows_gain_extension_and_uri() {
        let mut row = Record::new();
        row.insert("_display_name", "track one.mp3");
        row.insert("_id", 42i64);
        let formatted = format_song(&song_descriptor(), row);

        assert_eq!(
            formatted.get("file_extension"),
            Some(&Value::from("mp3"))
        );
        assert_eq!(
            formatted.get("_display_name_wo_ext"),
            Some(&Value::from("track one"))
        );
        assert_eq!(
            formatted.get("_uri"),
            Some(&Value::from("content://media/external/audio/media/42"))
        );
    }

    #[test]
    fn song_without_extension_is_left_alone() {
        let mut row = Record::new();
        row.insert("_display_name", "README");
        let formatted = format_song(&song_descriptor(), row);
        assert!(!formatted.contains("file_extension"));
    }

    #[test]
    fn blank_album_art_is_removed() {
        let descriptor = QueryDescriptor::new(QueryKind::Albums, ScopeSelector::External);
        let mut row = Record::new();
        row.insert("album", "The Album");
        row.insert("album_art", "");
        let formatted = format_album(&descriptor, row);
        assert!(!formatted.contains("album_art"));

        let mut kept = Record::new();
        kept.insert("album_art", "/cache/art.png");
        let kept = format_album(&descriptor, kept);
        assert!(kept.contains("album_art"));
    }

    #[test]
    fn path_index_dedupes_preserving_order() {
        let descriptor = QueryDescriptor::new(QueryKind::PathIndex, ScopeSelector::External);
        let rows = vec!["/music/rock/a.mp3", "/music/jazz/b.mp3", "/music/rock/c.mp3"]
            .into_iter()
            .map(|path| {
                let mut row = Record::new();
                row.insert("_data", path);
                (PATH_INDEX.format)(&descriptor, row)
            })
            .collect();
        let paths = (PATH_INDEX.finalize)(rows);
        let values: Vec<_> = paths
            .iter()
            .map(|record| record.get("path").unwrap().as_text().unwrap())
            .collect();
        assert_eq!(values, vec!["/music/rock", "/music/jazz"]);
    }

    #[test]
    fn rows_without_data_are_dropped_from_path_index() {
        let descriptor = QueryDescriptor::new(QueryKind::PathIndex, ScopeSelector::External);
        let empty = (PATH_INDEX.format)(&descriptor, Record::new());
        assert!((PATH_INDEX.finalize)(vec![empty]).is_empty());
    }
}
