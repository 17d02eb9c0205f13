use std::convert::Infallible;

/// Forward-only, closable producer of source records.
pub trait CursorSource {
    type Record;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the next record. `Ok(None)` marks end-of-stream.
    fn next(&mut self) -> Result<Option<Self::Record>, Self::Error>;

    /// Release the underlying resource. Must be idempotent.
    fn close(&mut self);
}

impl<C: CursorSource + ?Sized> CursorSource for &mut C {
    type Record = C::Record;
    type Error = C::Error;

    fn next(&mut self) -> Result<Option<Self::Record>, Self::Error> {
        (**self).next()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// A source record that can name itself in diagnostics.
pub trait SourceRecord {
    fn identity(&self) -> String;
}

/// Single owner of an open cursor. Closes it exactly once when dropped,
/// including on early return and unwinding.
pub struct CursorGuard<C: CursorSource> {
    cursor: C,
}

impl<C: CursorSource> CursorGuard<C> {
    pub fn new(cursor: C) -> Self {
        Self { cursor }
    }

    pub fn next(&mut self) -> Result<Option<C::Record>, C::Error> {
        self.cursor.next()
    }
}

impl<C: CursorSource> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// Cursor over an in-memory iterator. Reads never fail.
pub struct IterCursor<I> {
    iter: Option<I>,
}

impl<I: Iterator> IterCursor<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: Some(iter.into_iter()),
        }
    }
}

impl<I: Iterator> CursorSource for IterCursor<I> {
    type Record = I::Item;
    type Error = Infallible;

    fn next(&mut self) -> Result<Option<Self::Record>, Self::Error> {
        Ok(self.iter.as_mut().and_then(Iterator::next))
    }

    fn close(&mut self) {
        self.iter = None;
    }
}
