// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date filter for the question changelist.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Preset `pub_date` ranges offered in the changelist sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Any,
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    pub const ALL: [DateFilter; 5] = [
        DateFilter::Any,
        DateFilter::Today,
        DateFilter::Past7Days,
        DateFilter::ThisMonth,
        DateFilter::ThisYear,
    ];

    /// Parse the `pub_date` query parameter. Unknown values mean no filter.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("today") => DateFilter::Today,
            Some("past_7_days") => DateFilter::Past7Days,
            Some("this_month") => DateFilter::ThisMonth,
            Some("this_year") => DateFilter::ThisYear,
            _ => DateFilter::Any,
        }
    }

    /// Query parameter value; empty for [`DateFilter::Any`].
    pub fn param(self) -> &'static str {
        match self {
            DateFilter::Any => "",
            DateFilter::Today => "today",
            DateFilter::Past7Days => "past_7_days",
            DateFilter::ThisMonth => "this_month",
            DateFilter::ThisYear => "this_year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateFilter::Any => "Any date",
            DateFilter::Today => "Today",
            DateFilter::Past7Days => "Past 7 days",
            DateFilter::ThisMonth => "This month",
            DateFilter::ThisYear => "This year",
        }
    }

    /// Half-open `[start, end)` range in UTC, or `None` for no filtering.
    ///
    /// Every range ends at the next midnight (or month/year boundary), so
    /// questions scheduled later today still match "Today".
    pub fn bounds(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        let tomorrow = midnight(today + Duration::days(1));

        match self {
            DateFilter::Any => None,
            DateFilter::Today => Some((midnight(today), tomorrow)),
            DateFilter::Past7Days => Some((midnight(today - Duration::days(7)), tomorrow)),
            DateFilter::ThisMonth => {
                let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;
                let end = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((midnight(start), midnight(end)))
            }
            DateFilter::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
                let end = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?;
                Some((midnight(start), midnight(end)))
            }
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
