//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// UTC timestamp used for rule triggers, plan start/end and ETAs.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether at least `window` has passed between `since` and `now`.
///
/// `None` means "never happened", which is always considered elapsed.
/// A `now` earlier than `since` (clock stepped backwards) is not elapsed.
#[must_use]
pub fn has_elapsed(since: Option<Timestamp>, now: Timestamp, window: Duration) -> bool {
    let Some(since) = since else {
        return true;
    };
    (now - since)
        .to_std()
        .is_ok_and(|elapsed| elapsed >= window)
}

/// Serde helpers for a [`Duration`] expressed as fractional seconds.
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a duration as seconds (`f64`).
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Deserialize seconds (`f64`) into a duration.
    ///
    /// # Errors
    ///
    /// Fails on negative, NaN or overflowing values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
