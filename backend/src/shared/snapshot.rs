use crate::domain::{NutrientLevels, Reading, Snapshot};
use crate::error::IngestError;
use crate::fallback::FallbackData;
use crate::thresholds::{classify_levels, trend_of};
use crate::time::Clock;

/// Build a snapshot from real feed readings (oldest first)
pub fn from_feed(history: Vec<Reading>, clock: &dyn Clock) -> Result<Snapshot, IngestError> {
    let current = history
        .last()
        .map(NutrientLevels::from_reading)
        .ok_or(IngestError::NoValidRows)?;

    Ok(Snapshot {
        status: classify_levels(&current),
        trend: trend_of(&history),
        current,
        history,
        timestamp: clock.now_epoch_millis(),
        is_fallback: false,
        error: None,
    })
}

/// Build a snapshot from synthetic readings
///
/// `error` is the failure that caused the substitution, or `None` when
/// simulation was requested explicitly.
pub fn from_fallback(data: FallbackData, error: Option<String>, clock: &dyn Clock) -> Snapshot {
    Snapshot {
        status: classify_levels(&data.current),
        trend: trend_of(&data.history),
        current: data.current,
        history: data.history,
        timestamp: clock.now_epoch_millis(),
        is_fallback: true,
        error,
    }
}
