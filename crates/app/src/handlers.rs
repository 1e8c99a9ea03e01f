//! Runs one command against the ledger and prints the outcome.

use std::{fs, io::Write, path::PathBuf};

use chrono::{DateTime, Utc};
use engine::{
    BackupSnapshot, Calendar, ExpenseCategory, ExpenseCmd, FileStore, HistoryMode, HistoryView,
    KeyValueStore, Kilometers, Ledger, RecordId, RecordKind, TripCmd,
    export::{self, BACKUP_FILE_PREFIX, REPORT_FILE_PREFIX},
    money::format_major,
};

use crate::{
    cli::{Command, ExpenseArgs, OutputArgs, TripArgs},
    error::{AppError, Result},
    settings::Settings,
};

/// Opens the file-backed ledger described by `settings` and runs `command`.
pub fn run(command: Command, settings: &Settings) -> Result<()> {
    let calendar = Calendar::from_name(&settings.timezone)?;
    let storage = FileStore::open(&settings.data_dir)?;
    tracing::debug!("data directory: {}", storage.root().display());
    let mut ledger = Ledger::builder(storage).calendar(calendar).build()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&mut ledger, command, Utc::now(), &mut out)
}

pub fn execute<S: KeyValueStore>(
    ledger: &mut Ledger<S>,
    command: Command,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Trip(args) => add_trip(ledger, args, now, out),
        Command::Expense(args) => add_expense(ledger, args, now, out),
        Command::Remove { id } => {
            let id: RecordId = id
                .parse()
                .map_err(|err| AppError::Argument(format!("invalid record id {id:?}: {err}")))?;
            if ledger.remove_record(id)? {
                writeln!(out, "Removed record {id}")?;
            } else {
                writeln!(out, "No record with id {id}")?;
            }
            Ok(())
        }
        Command::ClearDay { yes } => {
            let count = ledger.day_records(now, None).len();
            if !yes {
                return Err(AppError::Argument(format!(
                    "this deletes {count} records of today, pass --yes to confirm"
                )));
            }
            let cleared = ledger.clear_day(now)?;
            writeln!(out, "Cleared {cleared} records of {}", ledger.today(now))?;
            Ok(())
        }
        Command::Distance { km } => {
            if let Some(raw) = km {
                let distance: Kilometers = raw.parse()?;
                ledger.set_distance(distance)?;
            }
            writeln!(out, "Distance today: {}", ledger.distance())?;
            Ok(())
        }
        Command::Mode { mode } => {
            if let Some(raw) = mode {
                let mode: HistoryMode = raw.parse()?;
                ledger.set_history_mode(mode)?;
            }
            writeln!(out, "History mode: {}", ledger.mode())?;
            Ok(())
        }
        Command::Today { kind } => {
            let kind = kind
                .as_deref()
                .map(RecordKind::try_from)
                .transpose()?;
            print_today(ledger, kind, now, out)
        }
        Command::Summary => print_summary(ledger, now, out),
        Command::History { mode } => {
            let mode = match mode {
                Some(raw) => raw.parse()?,
                None => ledger.mode(),
            };
            print_history(ledger.history_as(mode, now), out)
        }
        Command::Month => print_month(ledger, now, out),
        Command::Overview => {
            let overview = ledger.overview(now);
            writeln!(out, "Records: {}", overview.record_count)?;
            writeln!(out, "Distance today: {}", overview.distance_today)?;
            writeln!(
                out,
                "Month: {} days, {:.0} km (estimated)",
                overview.month.days_worked,
                overview.month.total.value()
            )?;
            writeln!(
                out,
                "All time: {} days, {:.0} km (estimated)",
                overview.all_time.days_worked,
                overview.all_time.total.value()
            )?;
            writeln!(out, "History mode: {}", overview.mode)?;
            if ledger.unreadable_count() > 0 {
                writeln!(
                    out,
                    "Unreadable stored records (kept as is): {}",
                    ledger.unreadable_count()
                )?;
            }
            Ok(())
        }
        Command::Categories => {
            for category in ExpenseCategory::ALL {
                writeln!(out, "{:<16}{}", category.key(), category.display_name())?;
            }
            Ok(())
        }
        Command::Report(args) => {
            let report = ledger.daily_report(now)?;
            let name = export::export_file_name(REPORT_FILE_PREFIX, ledger.today(now), "csv");
            write_export(&args, &name, &report, out)
        }
        Command::Backup(args) => {
            let backup = ledger.backup(now).to_json()?;
            let name = export::export_file_name(BACKUP_FILE_PREFIX, ledger.today(now), "json");
            write_export(&args, &name, &backup, out)
        }
        Command::Restore { file, yes } => {
            let content = fs::read_to_string(&file)?;
            let snapshot = BackupSnapshot::from_json(&content)?;
            if !yes {
                return Err(AppError::Argument(format!(
                    "this replaces {} records with the {} of {}, pass --yes to confirm",
                    ledger.records().len(),
                    snapshot.records.len(),
                    file.display()
                )));
            }
            ledger.restore(snapshot)?;
            writeln!(out, "Restored {} records", ledger.records().len())?;
            Ok(())
        }
        Command::Share => {
            writeln!(out, "{}", ledger.share_text(now))?;
            Ok(())
        }
    }
}

fn add_trip<S: KeyValueStore>(
    ledger: &mut Ledger<S>,
    args: TripArgs,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let mut cmd = TripCmd::parse(&args.amount, now)?;
    if let Some(description) = args.description {
        cmd = cmd.description(description);
    }
    let record = ledger.add_record(cmd)?;
    writeln!(
        out,
        "Added {} \"{}\" {} (id {})",
        record.kind().label(),
        record.description(),
        record.amount(),
        record.id()
    )?;
    Ok(())
}

fn add_expense<S: KeyValueStore>(
    ledger: &mut Ledger<S>,
    args: ExpenseArgs,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let mut cmd = ExpenseCmd::parse(&args.category, &args.amount, now)?;
    if let Some(description) = args.description {
        cmd = cmd.description(description);
    }
    let record = ledger.add_record(cmd)?;
    writeln!(
        out,
        "Added {} \"{}\" {} (id {})",
        record.kind().label(),
        record.description(),
        record.amount(),
        record.id()
    )?;
    Ok(())
}

fn print_today<S: KeyValueStore>(
    ledger: &Ledger<S>,
    kind: Option<RecordKind>,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let records = ledger.day_records(now, kind);
    if records.is_empty() {
        writeln!(out, "No records today.")?;
        return Ok(());
    }
    for record in records {
        let sign = match record.kind() {
            RecordKind::Trip => "+",
            RecordKind::Expense => "-",
        };
        writeln!(
            out,
            "{}  {}  {:<8}{:<24}{sign}{}",
            record.id(),
            ledger.calendar().local_time(record.timestamp()).format("%H:%M"),
            record.kind().label(),
            record.description(),
            record.amount()
        )?;
    }
    Ok(())
}

fn print_summary<S: KeyValueStore>(
    ledger: &Ledger<S>,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let summary = ledger.day_summary(now);
    writeln!(out, "Date: {}", export::format_long_date(ledger.today(now)))?;
    writeln!(out, "Records: {}", summary.count)?;
    writeln!(out, "Gains: {}", summary.gains)?;
    writeln!(out, "Expenses: {}", summary.losses)?;
    writeln!(out, "Balance: {}", summary.net)?;
    writeln!(out, "Distance: {}", ledger.distance())?;
    if ledger.distance().is_positive() {
        let ratios = ledger.ratios(now);
        writeln!(out, "Revenue/km: {}", format_major(ratios.revenue_per_distance))?;
        writeln!(out, "Cost/km: {}", format_major(ratios.cost_per_distance))?;
        writeln!(out, "Profit/km: {}", format_major(ratios.profit_per_distance))?;
    }
    Ok(())
}

fn print_history(view: HistoryView, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", view.mode())?;
    match view {
        HistoryView::CurrentDay(day) => {
            writeln!(out, "Balance today: {}", day.daily_balance)?;
            writeln!(out, "Best day: {}", day.best_day)?;
            writeln!(out, "Distance today: {}", day.distance_today)?;
            writeln!(
                out,
                "Month distance (estimated): {:.0} km",
                day.estimated_monthly_distance.value()
            )?;
            writeln!(
                out,
                "Total distance (estimated): {:.0} km",
                day.estimated_total_distance.value()
            )?;
            writeln!(out, "Profit/km: {}", format_major(day.profit_per_distance_today))?;
        }
        HistoryView::MonthlyAverage(month) => {
            writeln!(out, "Days worked: {}", month.days_worked)?;
            writeln!(out, "Average balance/day: {}", format_major(month.average_daily_balance))?;
            writeln!(out, "Best day: {}", month.best_day)?;
            writeln!(out, "Average km/day: {:.1}", month.average_distance_per_day)?;
            writeln!(
                out,
                "Month distance (estimated): {:.0} km",
                month.total_distance_this_month.value()
            )?;
            writeln!(
                out,
                "Total distance (estimated): {:.0} km",
                month.total_distance_all_time.value()
            )?;
            writeln!(
                out,
                "Average profit/km: {}",
                format_major(month.average_profit_per_distance)
            )?;
        }
    }
    Ok(())
}

fn print_month<S: KeyValueStore>(
    ledger: &Ledger<S>,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let days = ledger.month_days(now);
    if days.is_empty() {
        writeln!(out, "No records this month.")?;
        return Ok(());
    }
    for day in days {
        writeln!(
            out,
            "{}  +{}  -{}  = {}  ({})",
            day.date.format("%d/%m/%Y"),
            day.summary.gains,
            day.summary.losses,
            day.summary.net,
            day.distance
        )?;
    }
    Ok(())
}

fn write_export(args: &OutputArgs, name: &str, content: &str, out: &mut impl Write) -> Result<()> {
    if args.stdout {
        write!(out, "{content}")?;
        return Ok(());
    }
    fs::create_dir_all(&args.out_dir)?;
    let path: PathBuf = args.out_dir.join(name);
    fs::write(&path, content)?;
    tracing::info!("exported {name}");
    writeln!(out, "Written {}", path.display())?;
    Ok(())
}
