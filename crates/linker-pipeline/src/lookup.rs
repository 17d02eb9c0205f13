/// Result of a secondary lookup performed inside an enrichment function.
///
/// `NotFound` is an ordinary outcome and never reaches the pipeline's error
/// channel; only the `Err` side of a lookup is fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Read-only keyed lookup against a secondary store.
pub trait LookupSource<K: ?Sized> {
    type Entity;
    type Error: std::error::Error + Send + Sync + 'static;

    fn find(&self, key: &K) -> Result<Lookup<Self::Entity>, Self::Error>;
}

/// Storage errors that can mean "no such row".
pub trait IsNotFound {
    fn is_not_found(&self) -> bool;
}

/// Splits "not found" out of a storage result into [`Lookup::NotFound`].
pub trait LookupResultExt<T, E> {
    fn found(self) -> Result<Lookup<T>, E>;
}

impl<T, E: IsNotFound> LookupResultExt<T, E> for Result<T, E> {
    fn found(self) -> Result<Lookup<T>, E> {
        match self {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }
}
