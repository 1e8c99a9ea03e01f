//! The record store.
//!
//! `Ledger` owns the record list, the distance reading and the history mode,
//! plus the storage backend they are persisted to. Every write goes to
//! storage first; the in-memory state only changes after storage accepted it.
//!
//! Stored entries that cannot be read are kept verbatim and written back
//! with every record list, so a newer or damaged entry is never dropped.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    Calendar, EngineError, HistoryMode, Kilometers, NewRecord, Record, RecordId, RecordKind,
    ResultEngine,
    aggregate::{self, DaySummary, DistanceRatios},
    export::{self, BackupSnapshot},
    history::{self, DayBreakdown, HistoryView, Overview},
    storage::KeyValueStore,
};

/// Storage key of the record list.
pub const RECORDS_KEY: &str = "registros_motorista";
/// Storage key of the distance reading.
pub const DISTANCE_KEY: &str = "km_rodados";
/// Storage key of the history mode.
pub const MODE_KEY: &str = "modo_historico";

#[derive(Debug)]
pub struct Ledger<S: KeyValueStore> {
    storage: S,
    calendar: Calendar,
    records: Vec<Record>,
    unreadable: Vec<serde_json::Value>,
    distance: Kilometers,
    mode: HistoryMode,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder(storage: S) -> LedgerBuilder<S> {
        LedgerBuilder {
            storage,
            calendar: Calendar::default(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn distance(&self) -> Kilometers {
        self.distance
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of stored entries that could not be read and are carried
    /// along untouched.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    // Writes

    /// Appends a trip or an expense.
    pub fn add_record(&mut self, cmd: impl Into<NewRecord>) -> ResultEngine<Record> {
        let cmd = cmd.into();
        let at = cmd.occurred_at();
        let mut id = RecordId::generate(at);
        while self.record(id).is_some() {
            id = id.successor();
        }
        let record = Record::new(id, cmd.movement(), cmd.amount(), cmd.description(), at)?;

        let mut next = self.records.clone();
        next.push(record.clone());
        self.save_records(&next)?;
        self.records = next;

        tracing::info!("added {} {} ({})", record.kind().label(), record.amount(), record.id());
        Ok(record)
    }

    /// Removes the record with `id`. Returns `false` (and writes nothing) when
    /// there is no such record.
    pub fn remove_record(&mut self, id: RecordId) -> ResultEngine<bool> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            tracing::debug!("remove: record {id} not found");
            return Ok(false);
        };

        let mut next = self.records.clone();
        next.remove(index);
        self.save_records(&next)?;
        self.records = next;

        tracing::info!("removed record {id}");
        Ok(true)
    }

    /// Removes every record of the calendar day of `reference` and returns how
    /// many were removed.
    pub fn clear_day(&mut self, reference: DateTime<Utc>) -> ResultEngine<usize> {
        let day = self.calendar.date_of(reference);
        let (cleared, kept): (Vec<Record>, Vec<Record>) = self
            .records
            .iter()
            .cloned()
            .partition(|r| self.calendar.date_of(r.timestamp()) == day);

        if cleared.is_empty() {
            return Err(EngineError::EmptySelection(day.to_string()));
        }

        self.save_records(&kept)?;
        self.records = kept;

        tracing::info!("cleared {} records of {day}", cleared.len());
        Ok(cleared.len())
    }

    /// Overwrites the distance reading.
    pub fn set_distance(&mut self, distance: Kilometers) -> ResultEngine<()> {
        if !distance.is_positive() {
            return Err(EngineError::InvalidDistance(
                "distance must be a positive number".to_string(),
            ));
        }
        self.storage
            .set(DISTANCE_KEY, &distance.value().to_string())?;
        self.distance = distance;

        tracing::info!("distance set to {distance}");
        Ok(())
    }

    pub fn set_history_mode(&mut self, mode: HistoryMode) -> ResultEngine<()> {
        self.storage.set(MODE_KEY, mode.as_str())?;
        self.mode = mode;

        tracing::info!("history mode set to {}", mode.as_str());
        Ok(())
    }

    /// Replaces the whole state with the content of a backup.
    ///
    /// The three keys are written in turn; when one write fails the keys
    /// already written get the current state back.
    pub fn restore(&mut self, snapshot: BackupSnapshot) -> ResultEngine<()> {
        let distance = snapshot.reading()?;
        let mut records = Vec::with_capacity(snapshot.records.len());
        for record in snapshot.records {
            if records.iter().any(|r: &Record| r.id() == record.id()) {
                tracing::warn!("backup contains duplicate record {}, skipped", record.id());
                continue;
            }
            records.push(record);
        }

        let previous = [
            (RECORDS_KEY, records_payload(&self.records, &self.unreadable)?),
            (DISTANCE_KEY, self.distance.value().to_string()),
            (MODE_KEY, self.mode.as_str().to_string()),
        ];
        let next = [
            (RECORDS_KEY, records_payload(&records, &[])?),
            (DISTANCE_KEY, distance.value().to_string()),
            (MODE_KEY, snapshot.mode.as_str().to_string()),
        ];
        for (written, (key, value)) in next.iter().enumerate() {
            if let Err(err) = self.storage.set(key, value) {
                for (key, value) in previous[..written].iter().rev() {
                    if let Err(rollback) = self.storage.set(key, value) {
                        tracing::error!("failed to roll back {key} after a failed restore: {rollback}");
                    }
                }
                return Err(err.into());
            }
        }

        if !self.unreadable.is_empty() {
            tracing::warn!(
                "restore replaced {} unreadable stored records",
                self.unreadable.len()
            );
        }
        tracing::info!(
            "restored {} records from backup of {}",
            records.len(),
            snapshot.created_at
        );
        self.records = records;
        self.unreadable.clear();
        self.distance = distance;
        self.mode = snapshot.mode;
        Ok(())
    }

    fn save_records(&mut self, records: &[Record]) -> ResultEngine<()> {
        let payload = records_payload(records, &self.unreadable)?;
        self.storage.set(RECORDS_KEY, &payload)?;
        tracing::debug!("persisted {} records", records.len());
        Ok(())
    }

    // Queries

    /// Records of the day of `now`, newest first, optionally of one kind.
    pub fn day_records(&self, now: DateTime<Utc>, kind: Option<RecordKind>) -> Vec<&Record> {
        let mut today =
            aggregate::records_of_kind(self.calendar.filter_by_day(&self.records, now), kind);
        aggregate::sort_newest_first(&mut today);
        today
    }

    pub fn day_summary(&self, now: DateTime<Utc>) -> DaySummary {
        DaySummary::from_records(self.calendar.filter_by_day(&self.records, now))
    }

    pub fn ratios(&self, now: DateTime<Utc>) -> DistanceRatios {
        self.day_summary(now).ratios(self.distance)
    }

    /// The projection of the active history mode.
    pub fn history(&self, now: DateTime<Utc>) -> HistoryView {
        self.history_as(self.mode, now)
    }

    pub fn history_as(&self, mode: HistoryMode, now: DateTime<Utc>) -> HistoryView {
        history::project(mode, &self.calendar, &self.records, self.distance, now)
    }

    pub fn month_days(&self, now: DateTime<Utc>) -> Vec<DayBreakdown> {
        history::month_days(&self.calendar, &self.records, self.distance, now)
    }

    pub fn overview(&self, now: DateTime<Utc>) -> Overview {
        history::overview(&self.calendar, &self.records, self.distance, self.mode, now)
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.calendar.date_of(now)
    }

    /// CSV report of the day of `now`.
    pub fn daily_report(&self, now: DateTime<Utc>) -> ResultEngine<String> {
        let today = self.calendar.filter_by_day(&self.records, now);
        export::daily_report(
            &self.calendar,
            &today,
            self.distance,
            history::monthly_distance(&self.calendar, &self.records, self.distance, now),
            history::all_time_distance(&self.calendar, &self.records, self.distance),
        )
    }

    pub fn backup(&self, now: DateTime<Utc>) -> BackupSnapshot {
        BackupSnapshot::new(self.records.clone(), self.distance, self.mode, now)
    }

    pub fn share_text(&self, now: DateTime<Utc>) -> String {
        export::share_text(&self.day_summary(now), self.distance, self.today(now))
    }
}

/// The builder for `Ledger`
pub struct LedgerBuilder<S: KeyValueStore> {
    storage: S,
    calendar: Calendar,
}

impl<S: KeyValueStore> LedgerBuilder<S> {
    /// Calendar used for day and month windows (process timezone by default).
    pub fn calendar(mut self, calendar: Calendar) -> LedgerBuilder<S> {
        self.calendar = calendar;
        self
    }

    /// Construct `Ledger`, loading whatever state the storage holds.
    pub fn build(self) -> ResultEngine<Ledger<S>> {
        let (records, unreadable) = load_records(&self.storage)?;
        let distance = load_distance(&self.storage)?;
        let mode = load_mode(&self.storage)?;
        tracing::debug!(
            "loaded {} records, distance {distance}, mode {}",
            records.len(),
            mode.as_str()
        );

        Ok(Ledger {
            storage: self.storage,
            calendar: self.calendar,
            records,
            unreadable,
            distance,
            mode,
        })
    }
}

/// Stored record list, plus the entries that could not be read.
fn records_payload(records: &[Record], unreadable: &[serde_json::Value]) -> ResultEngine<String> {
    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.extend(unreadable.iter().cloned());
    Ok(serde_json::to_string(&values)?)
}

fn load_records(
    storage: &impl KeyValueStore,
) -> ResultEngine<(Vec<Record>, Vec<serde_json::Value>)> {
    let Some(raw) = storage.get(RECORDS_KEY)? else {
        return Ok((Vec::new(), Vec::new()));
    };
    if raw.trim().is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    // A malformed list is an error; a single unreadable entry is kept aside.
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let mut records: Vec<Record> = Vec::with_capacity(values.len());
    let mut unreadable = Vec::new();
    for value in values {
        match serde_json::from_value::<Record>(value.clone()) {
            Ok(record) if records.iter().any(|r| r.id() == record.id()) => {
                tracing::warn!("duplicate stored record {}, kept aside", record.id());
                unreadable.push(value);
            }
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!("unreadable stored record kept aside: {err}");
                unreadable.push(value);
            }
        }
    }
    Ok((records, unreadable))
}

fn load_distance(storage: &impl KeyValueStore) -> ResultEngine<Kilometers> {
    let Some(raw) = storage.get(DISTANCE_KEY)? else {
        return Ok(Kilometers::ZERO);
    };
    match raw.trim().replace(',', ".").parse::<f64>() {
        Ok(value) if value == 0.0 => Ok(Kilometers::ZERO),
        Ok(value) => Kilometers::new(value).or_else(|err| {
            tracing::warn!("ignoring stored distance: {err}");
            Ok(Kilometers::ZERO)
        }),
        Err(_) => {
            tracing::warn!("ignoring unreadable stored distance {raw:?}");
            Ok(Kilometers::ZERO)
        }
    }
}

fn load_mode(storage: &impl KeyValueStore) -> ResultEngine<HistoryMode> {
    let Some(raw) = storage.get(MODE_KEY)? else {
        return Ok(HistoryMode::default());
    };
    Ok(raw.parse().unwrap_or_else(|err| {
        tracing::warn!("ignoring stored history mode: {err}");
        HistoryMode::default()
    }))
}
