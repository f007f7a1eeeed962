use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Absolute `[from, to)` range for a time-series query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of `lookback_minutes` ending at `now`
    pub fn ending_at(now: DateTime<Utc>, lookback_minutes: u32) -> Self {
        Self {
            from: now - Duration::minutes(i64::from(lookback_minutes)),
            to: now,
        }
    }

    pub fn last_minutes(lookback_minutes: u32) -> Self {
        Self::ending_at(Utc::now(), lookback_minutes)
    }

    pub fn from_param(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn to_param(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
