//! Report and backup formats.
//!
//! - [`daily_report`]: CSV of today's records followed by summary blocks.
//! - [`BackupSnapshot`]: full ledger state as JSON.
//! - [`share_text`]: short day summary for messaging apps.

use chrono::{DateTime, NaiveDate, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::{
    Calendar, EngineError, HistoryMode, Kilometers, Record, ResultEngine,
    aggregate::{DaySummary, sort_newest_first},
    history::DistanceEstimate,
    money::format_major,
};

/// File name prefix of the daily CSV report.
pub const REPORT_FILE_PREFIX: &str = "controle_motorista";
/// File name prefix of the JSON backup.
pub const BACKUP_FILE_PREFIX: &str = "backup_motorista";
/// Format version written into every backup.
pub const BACKUP_VERSION: &str = "3.0";

/// `<prefix>_<YYYY-MM-DD>.<ext>`
pub fn export_file_name(prefix: &str, date: NaiveDate, ext: &str) -> String {
    format!("{prefix}_{date}.{ext}")
}

/// Long date used in the share text, e.g. `Sunday, 18 October 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

fn export_err(err: impl std::fmt::Display) -> EngineError {
    EngineError::Export(err.to_string())
}

/// Writes one CSV block; rows may have different lengths.
fn section<I, R>(rows: I) -> ResultEngine<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new().flexible(true).from_writer(vec![]);
    for row in rows {
        writer.write_record(row).map_err(export_err)?;
    }
    let data = writer.into_inner().map_err(export_err)?;
    String::from_utf8(data).map_err(export_err)
}

fn amount_cell(value: f64) -> String {
    format!("{value:.2}")
}

/// CSV report of one day.
///
/// `today` must already be filtered to the reported day; rows come out newest
/// first. The distance history block always uses day-granularity estimates,
/// whatever history mode is active.
pub fn daily_report(
    calendar: &Calendar,
    today: &[&Record],
    reading: Kilometers,
    month: DistanceEstimate,
    all_time: DistanceEstimate,
) -> ResultEngine<String> {
    if today.is_empty() {
        return Err(EngineError::EmptySelection("today".to_string()));
    }

    let mut rows: Vec<&Record> = today.to_vec();
    sort_newest_first(&mut rows);

    let mut table = vec![vec![
        "Kind".to_string(),
        "Description".to_string(),
        "Amount (R$)".to_string(),
        "Date".to_string(),
        "Time".to_string(),
    ]];
    for record in &rows {
        let local = calendar.local_time(record.timestamp());
        table.push(vec![
            record.kind().label().to_string(),
            record.description().to_string(),
            amount_cell(record.amount().to_major()),
            local.format("%d/%m/%Y").to_string(),
            local.format("%H:%M:%S").to_string(),
        ]);
    }

    let summary = DaySummary::from_records(rows.iter().copied());
    let mut sections = vec![
        section(table)?,
        section([
            vec!["DAY SUMMARY".to_string()],
            vec!["Total Gains".to_string(), amount_cell(summary.gains.to_major())],
            vec!["Total Expenses".to_string(), amount_cell(summary.losses.to_major())],
            vec!["Net Balance".to_string(), amount_cell(summary.net.to_major())],
            vec!["Distance (km)".to_string(), reading.value().to_string()],
        ])?,
    ];

    if reading.is_positive() {
        let ratios = summary.ratios(reading);
        sections.push(section([
            vec!["PER KM METRICS".to_string()],
            vec!["Revenue per km".to_string(), amount_cell(ratios.revenue_per_distance)],
            vec!["Cost per km".to_string(), amount_cell(ratios.cost_per_distance)],
            vec!["Profit per km".to_string(), amount_cell(ratios.profit_per_distance)],
        ])?);
    }

    sections.push(section([
        vec!["DISTANCE HISTORY".to_string()],
        vec!["Distance Today (km)".to_string(), reading.value().to_string()],
        vec![
            "Month Distance (estimated)".to_string(),
            format!("{:.0}", month.total.value()),
        ],
        vec![
            "Total Distance (estimated)".to_string(),
            format!("{:.0}", all_time.total.value()),
        ],
        vec!["Days Worked This Month".to_string(), month.days_worked.to_string()],
        vec!["Total Days Worked".to_string(), all_time.days_worked.to_string()],
    ])?);

    Ok(sections.join("\n"))
}

/// Text handed to the sharing/clipboard sink.
pub fn share_text(summary: &DaySummary, reading: Kilometers, date: NaiveDate) -> String {
    let profit_per_km = summary.ratios(reading).profit_per_distance;
    format!(
        "Rideshare Driver Report\n\
         Date: {date}\n\
         Gains: {gains}\n\
         Expenses: {losses}\n\
         Balance: {net}\n\
         Distance Today: {reading}\n\
         Profit/km: {per_km}",
        date = format_long_date(date),
        gains = summary.gains,
        losses = summary.losses,
        net = summary.net,
        per_km = format_major(profit_per_km),
    )
}

/// Full ledger state, as written to a backup file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    #[serde(rename = "registros")]
    pub records: Vec<Record>,
    #[serde(rename = "kmRodados")]
    pub distance: f64,
    #[serde(rename = "modoHistorico")]
    pub mode: HistoryMode,
    #[serde(rename = "dataBackup")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "versao")]
    pub version: String,
}

impl BackupSnapshot {
    pub fn new(
        records: Vec<Record>,
        reading: Kilometers,
        mode: HistoryMode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            records,
            distance: reading.value(),
            mode,
            created_at,
            version: BACKUP_VERSION.to_string(),
        }
    }

    /// Distance reading carried by the snapshot; zero means "never set".
    pub fn reading(&self) -> ResultEngine<Kilometers> {
        if self.distance == 0.0 {
            Ok(Kilometers::ZERO)
        } else {
            Kilometers::new(self.distance)
        }
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ResultEngine<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != BACKUP_VERSION {
            tracing::warn!(
                "backup version {} differs from {BACKUP_VERSION}, loading anyway",
                snapshot.version
            );
        }
        Ok(snapshot)
    }
}
