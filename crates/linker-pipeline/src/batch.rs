use crate::sink::Sink;

/// Ordered buffer of derived records that never grows past `threshold`.
pub(crate) struct Batch<T> {
    items: Vec<T>,
    threshold: usize,
}

impl<T> Batch<T> {
    pub(crate) fn new(threshold: usize) -> Self {
        Self {
            items: Vec::with_capacity(threshold.min(1024)),
            threshold,
        }
    }

    /// Append an item. Returns `true` once the batch is full and must be
    /// flushed before the next push.
    pub(crate) fn push(&mut self, item: T) -> bool {
        debug_assert!(self.items.len() < self.threshold, "push into a full batch");
        self.items.push(item);
        self.is_full()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() >= self.threshold
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hand the buffered items to the sink, clearing them on success.
    pub(crate) fn flush_into<S>(&mut self, sink: &mut S) -> Result<usize, S::Error>
    where
        S: Sink<Record = T>,
    {
        sink.persist(&self.items)?;
        let flushed = self.items.len();
        self.items.clear();
        Ok(flushed)
    }
}
