use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

///
/// Duration
///
/// Stored as signed nanoseconds. TTLs are carried through statements as
/// durations and emitted on the wire as whole seconds.
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
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i64::MAX);

    // ratio constants
    const NANOS_PER_MILLI: i64 = 1_000_000;
    const NANOS_PER_SEC: i64 = 1_000_000_000;
    const SECS_PER_MIN: i64 = 60;
    const MINS_PER_HOUR: i64 = 60;

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

    #[must_use]
    pub const fn from_mins(mins: i64) -> Self {
        Self::from_secs(mins * Self::SECS_PER_MIN)
    }

    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        Self::from_mins(hours * Self::MINS_PER_HOUR)
    }

    // ---- Accessors ----

    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Whole seconds, truncating toward negative infinity.
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.0.div_euclid(Self::NANOS_PER_SEC)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
