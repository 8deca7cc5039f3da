//! Lazy, caching record collections.
//!
//! A [`RecordCollection`] wraps the single-pass row source produced by
//! an executed query. Rows are pulled on demand and cached in order, so
//! the collection can be indexed, sliced, and iterated repeatedly even
//! though the underlying source can only be consumed once.
//!
//! The cache is always a strict prefix of the full result sequence: a
//! row that has been pulled is never re-fetched from the source.
//! Iteration is restartable — every pass replays the cache first, then
//! continues pulling, so interleaved partial iterations never skip or
//! duplicate a row.
//!
//! The collection is single-threaded by design. Interior mutability
//! lets several iterators share one cache from `&self`, but the type is
//! not `Sync`; concurrent mutation from multiple threads requires
//! external synchronization.

use std::cell::RefCell;
use std::fmt;

use serde_json::Value;

use crate::error::{RowsetError, RowsetResult};
use crate::export::{Dataset, Format};
use crate::record::Record;

/// The single-pass row source underlying a collection.
///
/// Errors raised by the source propagate unchanged to the caller; this
/// layer has no retry policy.
pub type RowSource = Box<dyn Iterator<Item = RowsetResult<Record>>>;

/// A lazy, caching sequence of [`Record`]s from one executed query.
pub struct RecordCollection {
    inner: RefCell<Inner>,
}

struct Inner {
    source: RowSource,
    cached: Vec<Record>,
    pending: bool,
}

impl RecordCollection {
    /// Wrap a single-pass row source.
    pub fn new(source: RowSource) -> Self {
        Self {
            inner: RefCell::new(Inner {
                source,
                cached: Vec::new(),
                pending: true,
            }),
        }
    }

    /// Build an already-materialized collection from a vector of records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            inner: RefCell::new(Inner {
                source: Box::new(std::iter::empty()),
                cached: records,
                pending: false,
            }),
        }
    }

    /// Advance the source by one row, appending it to the cache.
    ///
    /// Returns `Ok(None)` once the source is exhausted — a normal
    /// terminal condition, not a failure. After that the collection is
    /// immutable and every subsequent pull returns `Ok(None)`.
    pub fn pull_one(&self) -> RowsetResult<Option<Record>> {
        let mut inner = self.inner.borrow_mut();
        if !inner.pending {
            return Ok(None);
        }
        match inner.source.next() {
            Some(Ok(record)) => {
                inner.cached.push(record.clone());
                Ok(Some(record))
            }
            Some(Err(e)) => Err(e),
            None => {
                inner.pending = false;
                Ok(None)
            }
        }
    }

    /// Number of rows cached so far. This is not the full result size
    /// until the collection is fully materialized; for the total, use
    /// `all()?.len()`, and to test for an empty result set, use
    /// [`RecordCollection::first`].
    pub fn cached_len(&self) -> usize {
        self.inner.borrow().cached.len()
    }

    /// True while the source may still hold more rows.
    pub fn is_pending(&self) -> bool {
        self.inner.borrow().pending
    }

    /// Return the row at `index`, pulling from the source as needed.
    ///
    /// Fails with [`RowsetError::IndexOutOfRange`] if the source
    /// exhausts before reaching `index`.
    pub fn get(&self, index: usize) -> RowsetResult<Record> {
        loop {
            {
                let inner = self.inner.borrow();
                if index < inner.cached.len() {
                    return Ok(inner.cached[index].clone());
                }
                if !inner.pending {
                    return Err(RowsetError::out_of_range(index, inner.cached.len()));
                }
            }
            self.pull_one()?;
        }
    }

    /// Return a new, fully-materialized collection over
    /// `rows[start..stop].step_by(step)`.
    ///
    /// `stop` is exclusive; `None` forces full materialization and means
    /// "to the end". A `stop` past the end of the result set is clamped,
    /// matching slice semantics rather than indexing semantics.
    ///
    /// Indices are front-relative only. Negative (end-relative) indices
    /// have no well-defined meaning on a partially-lazy sequence and are
    /// excluded by the `usize` signature; to slice from the end, call
    /// [`RecordCollection::all`] first and slice the returned vector.
    pub fn slice(
        &self,
        start: usize,
        stop: Option<usize>,
        step: usize,
    ) -> RowsetResult<RecordCollection> {
        if step == 0 {
            return Err(RowsetError::InvalidSlice("step must be non-zero".to_string()));
        }
        match stop {
            Some(stop) => self.fill_to(stop)?,
            None => {
                while self.pull_one()?.is_some() {}
            }
        }

        let inner = self.inner.borrow();
        let stop = stop.unwrap_or(inner.cached.len()).min(inner.cached.len());
        let start = start.min(stop);
        let rows = inner.cached[start..stop]
            .iter()
            .step_by(step)
            .cloned()
            .collect();
        Ok(RecordCollection::from_records(rows))
    }

    /// Pull every remaining row and return the complete, ordered result
    /// set. Idempotent: a second call never re-invokes the source.
    pub fn all(&self) -> RowsetResult<Vec<Record>> {
        while self.pull_one()?.is_some() {}
        Ok(self.inner.borrow().cached.clone())
    }

    /// The first row, or `None` for an empty result set. Pulls at most
    /// one row. Callers supply defaults with `unwrap_or`.
    pub fn first(&self) -> RowsetResult<Option<Record>> {
        match self.get(0) {
            Ok(record) => Ok(Some(record)),
            Err(RowsetError::IndexOutOfRange { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The single row of a result set expected to hold exactly one.
    ///
    /// Fails with [`RowsetError::NoRows`] on an empty result and with
    /// [`RowsetError::AmbiguousResult`] when a second row exists. The
    /// ambiguity check is never suppressed; a caller that wants a
    /// default for the empty case should use [`RecordCollection::first`]
    /// and keep the strictness of `one` for the multi-row case.
    pub fn one(&self) -> RowsetResult<Record> {
        self.fill_to(2)?;
        let inner = self.inner.borrow();
        match inner.cached.len() {
            0 => Err(RowsetError::NoRows),
            1 => Ok(inner.cached[0].clone()),
            _ => Err(RowsetError::AmbiguousResult),
        }
    }

    /// The first column of the first row, for `SELECT count(*)`-style
    /// queries. `None` for an empty result set.
    pub fn scalar(&self) -> RowsetResult<Option<Value>> {
        Ok(self.first()?.and_then(|record| record.at(0).cloned()))
    }

    /// Iterate over the rows. The pass replays the cache first, then
    /// pulls any rows not yet cached; multiple interleaved iterators
    /// converge on the same full sequence.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            collection: self,
            index: 0,
        }
    }

    /// Drop the underlying source without draining it, releasing
    /// whatever rows it still buffers. The collection then behaves as
    /// if exhausted at its current cached prefix.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.source = Box::new(std::iter::empty());
        inner.pending = false;
    }

    /// The fully materialized result set as a column-oriented
    /// [`Dataset`]. Forces full materialization as a side effect.
    ///
    /// An empty result set yields a dataset with no headers: the driver
    /// reports column names per row, so there is nothing to name.
    pub fn dataset(&self) -> RowsetResult<Dataset> {
        let rows = self.all()?;
        let headers = rows
            .first()
            .map(|record| record.keys().to_vec())
            .unwrap_or_default();
        let mut data = Dataset::new(headers);
        for record in rows {
            data.push(record.values().to_vec());
        }
        Ok(data)
    }

    /// Export the fully materialized result set to the given format.
    pub fn export(&self, format: Format) -> RowsetResult<String> {
        self.dataset()?.export(format)
    }

    /// Pull until at least `n` rows are cached or the source exhausts.
    fn fill_to(&self, n: usize) -> RowsetResult<()> {
        while self.cached_len() < n && self.is_pending() {
            if self.pull_one()?.is_none() {
                break;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RecordCollection")
            .field("cached", &inner.cached.len())
            .field("pending", &inner.pending)
            .finish()
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        RecordCollection::from_records(records)
    }
}

/// A restartable iterator over a [`RecordCollection`].
pub struct Iter<'a> {
    collection: &'a RecordCollection,
    index: usize,
}

impl Iterator for Iter<'_> {
    type Item = RowsetResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        // Another iterator may have pulled rows since the last call, so
        // always check the cache before touching the source.
        {
            let inner = self.collection.inner.borrow();
            if self.index < inner.cached.len() {
                let record = inner.cached[self.index].clone();
                self.index += 1;
                return Some(Ok(record));
            }
            if !inner.pending {
                return None;
            }
        }
        match self.collection.pull_one() {
            Ok(Some(record)) => {
                self.index += 1;
                Some(Ok(record))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = RowsetResult<Record>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
