use serde::{Deserialize, Serialize};

/// Media categories served by the bridge. Each kind has its own
/// controller and row-shaping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Songs,
    Albums,
    Artists,
    Playlists,
    Genres,
    PathIndex,
}

impl QueryKind {
    pub const ALL: [QueryKind; 6] = [
        QueryKind::Songs,
        QueryKind::Albums,
        QueryKind::Artists,
        QueryKind::Playlists,
        QueryKind::Genres,
        QueryKind::PathIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Songs => "songs",
            QueryKind::Albums => "albums",
            QueryKind::Artists => "artists",
            QueryKind::Playlists => "playlists",
            QueryKind::Genres => "genres",
            QueryKind::PathIndex => "path_index",
        }
    }
}

/// Which media-store volume a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeSelector {
    #[default]
    External,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Resolved sort order for one query. Immutable once derived from the
/// call arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
    pub case_insensitive: bool,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
            case_insensitive: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
            case_insensitive: false,
        }
    }
}

/// Substring row filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub substring: String,
}

impl RowFilter {
    pub fn contains(column: impl Into<String>, substring: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            substring: substring.into(),
        }
    }

    /// Filter rows whose `column` path lies under `path`. The trailing
    /// separator keeps `/music` from matching `/music-old/...`.
    pub fn under_path(column: impl Into<String>, path: impl Into<String>) -> Self {
        let mut substring = path.into();
        if !substring.ends_with('/') {
            substring.push('/');
        }
        Self {
            column: column.into(),
            substring,
        }
    }
}

/// Everything a data source needs to run one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub kind: QueryKind,
    pub scope: ScopeSelector,
    /// Columns to fetch; `None` fetches every column the store has.
    pub projection: Option<Vec<String>>,
    pub filter: Option<RowFilter>,
    pub sort: Option<SortSpec>,
}

impl QueryDescriptor {
    pub fn new(kind: QueryKind, scope: ScopeSelector) -> Self {
        Self {
            kind,
            scope,
            projection: None,
            filter: None,
            sort: None,
        }
    }

    pub fn with_projection(mut self, columns: Vec<String>) -> Self {
        self.projection = Some(columns);
        self
    }

    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_path_appends_separator() {
        let filter = RowFilter::under_path("_data", "/storage/music");
        assert_eq!(filter.substring, "/storage/music/");

        let already = RowFilter::under_path("_data", "/storage/music/");
        assert_eq!(already.substring, "/storage/music/");
    }

    #[test]
    fn sort_builders_set_direction() {
        let ascending = SortSpec::ascending("title");
        assert_eq!(ascending.direction, SortDirection::Ascending);
        assert!(!ascending.case_insensitive);

        let descending = SortSpec::descending("duration");
        assert_eq!(descending.direction, SortDirection::Descending);
        assert_eq!(descending.column, "duration");
    }

    #[test]
    fn descriptor_builder_sets_fields() {
        let descriptor = QueryDescriptor::new(QueryKind::Songs, ScopeSelector::External)
            .with_sort(SortSpec::ascending("title"))
            .with_filter(RowFilter::contains("artist", "band"));
        assert_eq!(descriptor.kind, QueryKind::Songs);
        assert_eq!(descriptor.sort.unwrap().column, "title");
        assert_eq!(descriptor.filter.unwrap().substring, "band");
    }
}
