use crate::query::QueryDescriptor;
use crate::record::Record;
use thiserror::Error;

/// Failures raised by a media data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("media store query failed: {message}")]
    QueryFailed { message: String },
    #[error("failed to read row {index}: {message}")]
    RowFailed { index: usize, message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A lazy, forward-only sequence of query result rows.
///
/// Cursors release their backing resources on drop, so every exit path
/// that abandons one only has to let it go out of scope.
pub trait RowCursor: Send {
    /// Fetch the next raw row, or `None` once the sequence is exhausted.
    fn next_row(&mut self) -> SourceResult<Option<Record>>;
}

/// A queryable tabular media index.
///
/// `Ok(None)` means the store had no cursor to hand out for this query;
/// callers treat that exactly like a cursor with zero rows.
pub trait MediaSource: Send + Sync {
    fn query(&self, descriptor: &QueryDescriptor) -> SourceResult<Option<Box<dyn RowCursor>>>;
}
