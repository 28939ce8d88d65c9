//! Date range for the temporal event filter.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Everything, past and future.
    pub fn all() -> Self {
        DateRange {
            from: None,
            to: None,
        }
    }

    /// Events that have not started yet.
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        DateRange {
            from: Some(now),
            to: None,
        }
    }

    /// Events starting after `now` and no later than `now + window`.
    pub fn upcoming_within(now: DateTime<Utc>, window: Duration) -> Self {
        DateRange {
            from: Some(now),
            to: Some(now + window),
        }
    }

    /// Parse CLI arguments into a DateRange.
    /// - `from`: "all" for unbounded, or YYYY-MM-DD; defaults to `now`
    /// - `to`: YYYY-MM-DD, unbounded if not specified
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        let from_dt = match from {
            Some("all") => None,
            Some(s) => Some(parse_date_start(s)?),
            None => Some(now),
        };

        let to_dt = match to {
            Some(s) => Some(parse_date_end(s)?),
            None => None,
        };

        if let (Some(from), Some(to)) = (from_dt, to_dt) {
            if to < from {
                return Err(format!("'to' date {} is before 'from' date", to.date_naive()));
            }
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// `from` is exclusive so an event starting right now counts as past;
    /// `to` is inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at > from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))?;
    let end = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| format!("Invalid date '{}'", s))?;
    Ok(end.and_utc())
}
