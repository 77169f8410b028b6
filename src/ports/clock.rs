//! Clock port - injectable time source.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
///
/// Pass as `Arc<dyn Clock>`; tests inject a mock clock and advance it
/// instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
