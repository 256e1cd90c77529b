use crate::types::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

///
/// Clock
///
/// Wall-clock source for TTL expiry. Frozen clocks make expiry
/// deterministic in tests.
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) enum Clock {
    #[default]
    System,
    Frozen(Timestamp),
}

impl Clock {
    pub(crate) fn now(self) -> Timestamp {
        match self {
            Self::System => system_now(),
            Self::Frozen(at) => at,
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
pub(crate) fn system_now() -> Timestamp {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Timestamp::from_nanos(since_epoch.as_nanos() as i64)
}
