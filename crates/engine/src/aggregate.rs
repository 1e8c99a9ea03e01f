//! Sums, balances and per-km ratios over a set of records.
//!
//! Nothing here caches: callers pass the window they care about (usually the
//! output of a [`Calendar`](crate::Calendar) filter) and every call walks it
//! again.

use std::cmp::Reverse;

use crate::{Kilometers, MoneyCents, Record, RecordKind};

/// Total amount of the records of `kind`.
pub fn sum_by_kind<'a>(records: impl IntoIterator<Item = &'a Record>, kind: RecordKind) -> MoneyCents {
    records
        .into_iter()
        .filter(|r| r.kind() == kind)
        .map(Record::amount)
        .sum()
}

/// Trips minus expenses.
pub fn balance<'a>(records: impl IntoIterator<Item = &'a Record>) -> MoneyCents {
    DaySummary::from_records(records).net
}

/// `amount / distance`, or `0.0` when there is no distance to divide by.
pub fn per_distance(amount: f64, distance: Kilometers) -> f64 {
    if distance.is_positive() {
        amount / distance.value()
    } else {
        0.0
    }
}

/// Revenue, cost and profit per kilometre, in reais.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistanceRatios {
    pub revenue_per_distance: f64,
    pub cost_per_distance: f64,
    pub profit_per_distance: f64,
}

pub fn ratios<'a>(records: impl IntoIterator<Item = &'a Record>, distance: Kilometers) -> DistanceRatios {
    DaySummary::from_records(records).ratios(distance)
}

/// Gains, losses and net result of a record window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub gains: MoneyCents,
    pub losses: MoneyCents,
    pub net: MoneyCents,
    pub count: usize,
}

impl DaySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let (gains, losses, count) = records.into_iter().fold(
            (MoneyCents::ZERO, MoneyCents::ZERO, 0usize),
            |(gains, losses, count), record| match record.kind() {
                RecordKind::Trip => (gains + record.amount(), losses, count + 1),
                RecordKind::Expense => (gains, losses + record.amount(), count + 1),
            },
        );
        Self {
            gains,
            losses,
            net: gains - losses,
            count,
        }
    }

    pub fn ratios(&self, distance: Kilometers) -> DistanceRatios {
        DistanceRatios {
            revenue_per_distance: per_distance(self.gains.to_major(), distance),
            cost_per_distance: per_distance(self.losses.to_major(), distance),
            profit_per_distance: per_distance(self.net.to_major(), distance),
        }
    }
}

/// Records of one kind, or all of them when `kind` is `None`.
pub fn records_of_kind<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    kind: Option<RecordKind>,
) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| kind.is_none_or(|k| r.kind() == k))
        .collect()
}

/// Sorts newest first, the order records are displayed and exported in.
pub fn sort_newest_first(records: &mut [&Record]) {
    records.sort_by_key(|r| Reverse(r.timestamp()));
}
