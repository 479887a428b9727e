//! In-memory [`MediaSource`] backed by plain row tables.
//!
//! Used by the demo CLI and the bridge test suites. Besides serving
//! rows it can inject faults (query-time failure, row-read failure,
//! absent cursor) and counts open cursors so tests can assert that
//! every cursor is released.

use audex_core::query::{QueryDescriptor, QueryKind, ScopeSelector, SortDirection};
use audex_core::record::Record;
use audex_core::source::{MediaSource, RowCursor, SourceError, SourceResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Fault injected into a [`MemorySource`] for failure-path tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    /// `query` itself fails.
    FailQuery,
    /// The cursor fails when asked for the row at this index.
    FailAtRow(usize),
    /// `query` succeeds but hands out no cursor.
    AbsentCursor,
}

#[derive(Default)]
pub struct MemorySource {
    tables: HashMap<(QueryKind, ScopeSelector), Vec<Record>>,
    fault: Fault,
    open_cursors: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(
        mut self,
        kind: QueryKind,
        scope: ScopeSelector,
        rows: Vec<Record>,
    ) -> Self {
        self.tables.insert((kind, scope), rows);
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    /// Number of cursors handed out and not yet dropped.
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(AtomicOrdering::SeqCst)
    }

    fn resolve_rows(&self, descriptor: &QueryDescriptor) -> Vec<Record> {
        let mut rows = self
            .tables
            .get(&(descriptor.kind, descriptor.scope))
            .cloned()
            .unwrap_or_default();

        if let Some(filter) = &descriptor.filter {
            rows.retain(|row| {
                row.get(&filter.column)
                    .and_then(|value| value.as_text())
                    .is_some_and(|text| text.contains(&filter.substring))
            });
        }

        if let Some(sort) = &descriptor.sort {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(&sort.column), b.get(&sort.column)) {
                    (Some(left), Some(right)) => left.compare(right, sort.case_insensitive),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(projection) = &descriptor.projection {
            for row in &mut rows {
                row.project(projection);
            }
        }

        rows
    }
}

impl MediaSource for MemorySource {
    fn query(&self, descriptor: &QueryDescriptor) -> SourceResult<Option<Box<dyn RowCursor>>> {
        match self.fault {
            Fault::FailQuery => {
                return Err(SourceError::QueryFailed {
                    message: format!("injected failure for {}", descriptor.kind.as_str()),
                })
            }
            Fault::AbsentCursor => return Ok(None),
            _ => {}
        }

        let rows = self.resolve_rows(descriptor);
        tracing::debug!(
            kind = descriptor.kind.as_str(),
            rows = rows.len(),
            "memory source query"
        );

        self.open_cursors.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Some(Box::new(MemoryCursor {
            rows: rows.into_iter(),
            position: 0,
            fail_at: match self.fault {
                Fault::FailAtRow(index) => Some(index),
                _ => None,
            },
            open_cursors: Arc::clone(&self.open_cursors),
        })))
    }
}

struct MemoryCursor {
    rows: std::vec::IntoIter<Record>,
    position: usize,
    fail_at: Option<usize>,
    open_cursors: Arc<AtomicUsize>,
}

impl RowCursor for MemoryCursor {
    fn next_row(&mut self) -> SourceResult<Option<Record>> {
        if self.fail_at == Some(self.position) {
            return Err(SourceError::RowFailed {
                index: self.position,
                message: "injected row failure".to_string(),
            });
        }
        self.position += 1;
        Ok(self.rows.next())
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}
