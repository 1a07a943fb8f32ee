//! Clock port — the single source of "now" for cooldowns and estimates.

use linewatch_domain::time::Timestamp;

/// Supplies the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
