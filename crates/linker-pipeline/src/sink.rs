/// Durable destination for batches of derived records.
///
/// Each `persist` call receives a disjoint batch; an implementation decides
/// whether a batch is written atomically, retried, or deduplicated.
pub trait Sink {
    type Record;
    type Error: std::error::Error + Send + Sync + 'static;

    fn persist(&mut self, batch: &[Self::Record]) -> Result<(), Self::Error>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    type Record = S::Record;
    type Error = S::Error;

    fn persist(&mut self, batch: &[Self::Record]) -> Result<(), Self::Error> {
        (**self).persist(batch)
    }
}
