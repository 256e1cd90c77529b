use crate::types::Duration;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

// Invariant:
// Timestamp and Duration are both nanosecond-native.
// All arithmetic is nanosecond-consistent.
// Wire format remains a bare `i64`.

///
/// Timestamp
///
/// Stored as signed Unix nanoseconds; negative values address instants
/// before the epoch. `ZERO` doubles as the empty value for key-emptiness
/// checks and sentinel substitution.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    const NANOS_PER_SEC: i64 = 1_000_000_000;
    const NANOS_PER_MILLI: i64 = 1_000_000;

    // ---- Constructors ----

    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * Self::NANOS_PER_MILLI)
    }

    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * Self::NANOS_PER_SEC)
    }

    // ---- Accessors ----

    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0.div_euclid(Self::NANOS_PER_MILLI)
    }

    /// Whole seconds since the epoch, rounding toward negative infinity
    /// so pre-epoch instants bucket consistently.
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.0.div_euclid(Self::NANOS_PER_SEC)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    // ---- Arithmetic ----

    #[must_use]
    pub const fn saturating_add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.nanos()))
    }

    #[must_use]
    pub const fn saturating_sub(self, rhs: Duration) -> Self {
        Self(self.0.saturating_sub(rhs.nanos()))
    }

    #[must_use]
    pub fn checked_add(self, rhs: Duration) -> Option<Self> {
        self.0.checked_add(rhs.nanos()).map(Self)
    }

    /// Signed distance from `rhs` to `self`.
    #[must_use]
    pub const fn since(self, rhs: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(rhs.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.nanos())
    }
}

impl AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.nanos();
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        Self(self.0 - rhs.nanos())
    }
}

impl SubAssign<Duration> for Timestamp {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.nanos();
    }
}
