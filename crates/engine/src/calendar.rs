//! Calendar windows over records.
//!
//! Every day/month boundary in the engine goes through a [`Calendar`], so
//! the dashboard, the history views and the reports agree on what "today"
//! means.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{EngineError, Record, ResultEngine};

/// Timezone used to turn record timestamps into calendar dates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Calendar {
    /// The timezone of the running process.
    #[default]
    Local,
    /// A fixed IANA zone.
    Zone(Tz),
}

impl Calendar {
    pub fn with_zone(tz: Tz) -> Self {
        Self::Zone(tz)
    }

    /// Parses an IANA zone name; a blank name selects the process timezone.
    pub fn from_name(name: &str) -> ResultEngine<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        name.parse::<Tz>()
            .map(Self::Zone)
            .map_err(|err| EngineError::InvalidTimezone(format!("{name}: {err}")))
    }

    /// Wall-clock time of `at` in this calendar.
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Local => at.with_timezone(&chrono::Local).naive_local(),
            Self::Zone(tz) => at.with_timezone(tz).naive_local(),
        }
    }

    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        self.local_time(at).date()
    }

    /// Records on the same calendar day as `reference`.
    pub fn filter_by_day<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
        reference: DateTime<Utc>,
    ) -> Vec<&'a Record> {
        let day = self.date_of(reference);
        records
            .into_iter()
            .filter(|r| self.date_of(r.timestamp()) == day)
            .collect()
    }

    /// Records in the same calendar month and year as `reference`.
    pub fn filter_by_month<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
        reference: DateTime<Utc>,
    ) -> Vec<&'a Record> {
        let day = self.date_of(reference);
        records
            .into_iter()
            .filter(|r| {
                let date = self.date_of(r.timestamp());
                date.year() == day.year() && date.month() == day.month()
            })
            .collect()
    }

    /// Number of distinct calendar dates with at least one record.
    pub fn distinct_day_count<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> usize {
        records
            .into_iter()
            .map(|r| self.date_of(r.timestamp()))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Records bucketed by calendar date, oldest day first.
    pub fn group_by_day<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> BTreeMap<NaiveDate, Vec<&'a Record>> {
        let mut days: BTreeMap<NaiveDate, Vec<&'a Record>> = BTreeMap::new();
        for record in records {
            days.entry(self.date_of(record.timestamp()))
                .or_default()
                .push(record);
        }
        days
    }
}
