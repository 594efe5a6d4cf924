//! Monthly rollup of a year's watch events.

use crate::aggregator::aggregate_content;
use crate::normalizer::Calendar;
use crate::types::{MonthlyAggregate, WatchEvent};
use recap_common::month_name;
use std::collections::BTreeMap;

/// Build per-month aggregates for `year`, in calendar order.
///
/// Only months with at least one event appear. Events whose timestamp falls
/// outside `year` in the calendar's zone are ignored.
pub fn build_monthly_rollup(
    events: &[WatchEvent],
    year: i32,
    calendar: &Calendar,
) -> Vec<MonthlyAggregate> {
    let mut by_month: BTreeMap<u32, Vec<&WatchEvent>> = BTreeMap::new();
    for event in events {
        if let Some((event_year, month)) = calendar.year_month(event.occurred_at) {
            if event_year == year {
                by_month.entry(month).or_default().push(event);
            }
        }
    }

    by_month
        .into_iter()
        .filter_map(|(month, month_events)| {
            let summary = aggregate_content(month_events);
            Some(MonthlyAggregate {
                month,
                month_name: month_name(month)?.to_string(),
                total_watch_minutes: summary.total_watch_minutes,
                top_movie: summary.movies.into_iter().next(),
                top_show: summary.shows.into_iter().next(),
            })
        })
        .collect()
}
