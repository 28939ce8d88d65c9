//! Event listing order.

use super::EventView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Soonest first
    #[default]
    StartTime,
    /// Most available members first
    Attendance,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" | "start" | "start_time" => Ok(SortOrder::StartTime),
            "attendance" | "available" => Ok(SortOrder::Attendance),
            other => Err(format!("Unknown sort order '{other}'. Expected date or attendance")),
        }
    }
}

/// Stable sort: equal keys keep their incoming (catalog) order.
pub fn sort_views(views: &mut [EventView<'_>], order: SortOrder) {
    match order {
        SortOrder::StartTime => views.sort_by_key(|v| v.event.start_time),
        SortOrder::Attendance => views.sort_by(|a, b| b.available.cmp(&a.available)),
    }
}
