use chrono::{DateTime, Duration, TimeZone, Utc};

use engine::{
    BackupSnapshot, Calendar, EngineError, ExpenseCategory, ExpenseCmd, FileStore, HistoryMode,
    HistoryView, Kilometers, KeyValueStore, Ledger, MAX_RECORD_AMOUNT, MemoryStore, MoneyCents,
    RECORDS_KEY, Record, RecordKind, TripCmd, aggregate,
};

fn calendar() -> Calendar {
    Calendar::with_zone(chrono_tz::America::Sao_Paulo)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap()
}

fn ledger_with_memory() -> Ledger<MemoryStore> {
    Ledger::builder(MemoryStore::new())
        .calendar(calendar())
        .build()
        .unwrap()
}

fn scratch_dir() -> std::path::PathBuf {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_data");
    std::fs::create_dir_all(&root).unwrap();
    root.join(format!("ledger_{}", uuid::Uuid::new_v4()))
}

fn ledger_with_files(dir: &std::path::Path) -> Ledger<FileStore> {
    Ledger::builder(FileStore::open(dir).unwrap())
        .calendar(calendar())
        .build()
        .unwrap()
}

fn add_airport_run_and_fuel(ledger: &mut Ledger<impl KeyValueStore>) {
    ledger
        .add_record(TripCmd::parse("50", now()).unwrap().description("Airport run"))
        .unwrap();
    ledger
        .add_record(ExpenseCmd::parse("combustivel", "12", now() + Duration::minutes(20)).unwrap())
        .unwrap();
}

#[test]
fn adding_a_trip_raises_the_daily_balance_by_its_amount() {
    let mut ledger = ledger_with_memory();
    for amount in ["0,01", "23.90", "150", "9999.99"] {
        let before = aggregate::balance(ledger.calendar().filter_by_day(ledger.records(), now()));
        let cmd = TripCmd::parse(amount, now()).unwrap();
        let added = cmd.amount;
        ledger.add_record(cmd).unwrap();
        let after = aggregate::balance(ledger.calendar().filter_by_day(ledger.records(), now()));
        assert_eq!(after - before, added);
    }
}

#[test]
fn airport_run_scenario() {
    let mut ledger = ledger_with_memory();
    add_airport_run_and_fuel(&mut ledger);

    let today = ledger.calendar().filter_by_day(ledger.records(), now());
    assert_eq!(
        aggregate::sum_by_kind(today.iter().copied(), RecordKind::Trip),
        MoneyCents::new(5000)
    );
    assert_eq!(
        aggregate::sum_by_kind(today.iter().copied(), RecordKind::Expense),
        MoneyCents::new(1200)
    );

    let HistoryView::CurrentDay(view) = ledger.history(now()) else {
        panic!("expected the current day view");
    };
    assert_eq!(view.daily_balance, MoneyCents::new(3800));

    let fuel = ledger
        .records()
        .iter()
        .find(|r| r.kind() == RecordKind::Expense)
        .unwrap();
    assert_eq!(fuel.description(), "Fuel");
    assert_eq!(fuel.category(), Some(ExpenseCategory::Fuel));
}

#[test]
fn ratios_with_ten_km() {
    let mut ledger = ledger_with_memory();
    add_airport_run_and_fuel(&mut ledger);
    ledger.set_distance("10".parse().unwrap()).unwrap();

    let ratios = ledger.ratios(now());
    assert!((ratios.revenue_per_distance - 5.0).abs() < 1e-9);
    assert!((ratios.cost_per_distance - 1.2).abs() < 1e-9);
    assert!((ratios.profit_per_distance - 3.8).abs() < 1e-9);
}

#[test]
fn invalid_raw_input_is_rejected_without_state_change() {
    let mut ledger = ledger_with_memory();
    for raw in ["", "abc", "-5", "0", "0,00"] {
        let result = TripCmd::parse(raw, now()).and_then(|cmd| ledger.add_record(cmd));
        assert!(
            matches!(result, Err(EngineError::InvalidAmount(_))),
            "{raw:?} should be rejected"
        );
    }
    assert!(ledger.records().is_empty());

    assert!(matches!(
        "-3".parse::<Kilometers>(),
        Err(EngineError::InvalidDistance(_))
    ));
    assert!(matches!(
        ExpenseCmd::parse("pizza", "10", now()),
        Err(EngineError::InvalidCategory(_))
    ));
}

#[test]
fn huge_amounts_are_capped_and_sums_stay_sound() {
    let mut ledger = ledger_with_memory();
    assert!(matches!(
        TripCmd::parse("90000000000000000", now()).and_then(|cmd| ledger.add_record(cmd)),
        Err(EngineError::InvalidAmount(_))
    ));

    for _ in 0..3 {
        ledger
            .add_record(TripCmd::new(MAX_RECORD_AMOUNT, now()))
            .unwrap();
    }
    let summary = ledger.day_summary(now());
    assert_eq!(summary.gains.cents(), 3 * MAX_RECORD_AMOUNT.cents());
    assert_eq!(summary.net, summary.gains);
}

#[test]
fn monthly_average_over_three_days() {
    let mut ledger = ledger_with_memory();
    let day = |d: u32| Utc.with_ymd_and_hms(2026, 10, d, 14, 0, 0).unwrap();

    // Balances: 10, -5 and 20.
    ledger.add_record(TripCmd::parse("30", day(5)).unwrap()).unwrap();
    ledger
        .add_record(ExpenseCmd::parse("alimentacao", "20", day(5)).unwrap())
        .unwrap();
    ledger
        .add_record(ExpenseCmd::parse("pedagio", "5", day(11)).unwrap())
        .unwrap();
    ledger.add_record(TripCmd::parse("20", day(18)).unwrap()).unwrap();
    ledger.set_distance(Kilometers::new(8.0).unwrap()).unwrap();
    ledger.set_history_mode(HistoryMode::MonthlyAverage).unwrap();

    let HistoryView::MonthlyAverage(view) = ledger.history(now()) else {
        panic!("expected the monthly view");
    };
    assert!((view.average_daily_balance - 25.0 / 3.0).abs() < 1e-9);
    assert_eq!(view.best_day, MoneyCents::new(2000));
    assert_eq!(view.total_distance_this_month.value(), 24.0);

    let days = ledger.month_days(now());
    assert_eq!(days.len(), 3);
    assert_eq!(days[1].summary.net, MoneyCents::new(-500));
}

#[test]
fn switching_modes_does_not_touch_records() {
    let mut ledger = ledger_with_memory();
    add_airport_run_and_fuel(&mut ledger);
    let before = ledger.records().to_vec();

    ledger.set_history_mode(HistoryMode::MonthlyAverage).unwrap();
    assert_eq!(ledger.history(now()).mode(), HistoryMode::MonthlyAverage);
    ledger.set_history_mode(HistoryMode::CurrentDay).unwrap();
    assert_eq!(ledger.history(now()).mode(), HistoryMode::CurrentDay);

    assert_eq!(ledger.records(), before.as_slice());
}

#[test]
fn remove_record_shrinks_by_exactly_one() {
    let mut ledger = ledger_with_memory();
    add_airport_run_and_fuel(&mut ledger);
    let id = ledger.records()[0].id();

    assert!(ledger.remove_record(id).unwrap());
    assert_eq!(ledger.records().len(), 1);
    assert!(!ledger.remove_record(id).unwrap());
    assert_eq!(ledger.records().len(), 1);
}

#[test]
fn clear_day_on_empty_day_reports_empty_selection() {
    let mut ledger = ledger_with_memory();
    ledger
        .add_record(TripCmd::parse("40", now() - Duration::days(3)).unwrap())
        .unwrap();

    assert!(matches!(
        ledger.clear_day(now()),
        Err(EngineError::EmptySelection(_))
    ));
    assert_eq!(ledger.records().len(), 1);
}

#[test]
fn backup_round_trip_reproduces_the_store() {
    let mut source = ledger_with_memory();
    add_airport_run_and_fuel(&mut source);
    source
        .add_record(TripCmd::parse("18,40", now() - Duration::days(40)).unwrap())
        .unwrap();
    source.set_distance(Kilometers::new(95.5).unwrap()).unwrap();
    source.set_history_mode(HistoryMode::MonthlyAverage).unwrap();

    let json = source.backup(now()).to_json().unwrap();

    let mut target = ledger_with_memory();
    target
        .add_record(TripCmd::parse("1", now()).unwrap())
        .unwrap();
    target.restore(BackupSnapshot::from_json(&json).unwrap()).unwrap();

    let mut expected: Vec<Record> = source.records().to_vec();
    let mut actual: Vec<Record> = target.records().to_vec();
    expected.sort_by_key(Record::id);
    actual.sort_by_key(Record::id);
    assert_eq!(actual, expected);
    assert_eq!(target.distance(), source.distance());
    assert_eq!(target.mode(), source.mode());

    let stored = target.storage().get(RECORDS_KEY).unwrap().unwrap();
    let stored: Vec<Record> = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored.len(), 3);
}

#[test]
fn file_store_survives_a_restart() {
    let dir = scratch_dir();
    let id = {
        let mut ledger = ledger_with_files(&dir);
        add_airport_run_and_fuel(&mut ledger);
        ledger.set_distance(Kilometers::new(10.0).unwrap()).unwrap();
        ledger.set_history_mode(HistoryMode::MonthlyAverage).unwrap();
        ledger.records()[0].id()
    };

    let mut reopened = ledger_with_files(&dir);
    assert_eq!(reopened.records().len(), 2);
    assert_eq!(reopened.distance().value(), 10.0);
    assert_eq!(reopened.mode(), HistoryMode::MonthlyAverage);
    assert_eq!(reopened.day_summary(now()).net, MoneyCents::new(3800));

    assert!(reopened.remove_record(id).unwrap());
    let again = ledger_with_files(&dir);
    assert_eq!(again.records().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn daily_report_and_share_text() {
    let mut ledger = ledger_with_memory();
    assert!(matches!(
        ledger.daily_report(now()),
        Err(EngineError::EmptySelection(_))
    ));

    add_airport_run_and_fuel(&mut ledger);
    ledger
        .add_record(TripCmd::parse("30", now() - Duration::days(1)).unwrap())
        .unwrap();
    ledger.set_distance(Kilometers::new(10.0).unwrap()).unwrap();

    let report = ledger.daily_report(now()).unwrap();
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("Kind,Description,Amount (R$),Date,Time"));
    assert_eq!(lines.next(), Some("Expense,Fuel,12.00,18/10/2026,12:20:00"));
    assert_eq!(lines.next(), Some("Trip,Airport run,50.00,18/10/2026,12:00:00"));
    assert!(report.contains("Net Balance,38.00\n"));
    assert!(report.contains("Profit per km,3.80\n"));
    assert!(report.contains("Month Distance (estimated),20\n"));
    assert!(report.contains("Total Days Worked,2\n"));

    let share = ledger.share_text(now());
    assert!(share.contains("Balance: R$ 38,00"));
    assert!(share.contains("Profit/km: R$ 3,80"));

    let overview = ledger.overview(now());
    assert_eq!(overview.record_count, 3);
    assert_eq!(overview.month.days_worked, 2);
}
