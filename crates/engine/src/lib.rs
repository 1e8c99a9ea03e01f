//! Ledger and aggregation engine for a rideshare driver.
//!
//! The [`Ledger`] keeps trips and expenses, a single distance reading and the
//! active history mode, persisting every change through a [`KeyValueStore`].
//! Everything else is derived on demand:
//!
//! - [`Calendar`] windows records by local day and month.
//! - [`aggregate`] sums amounts and computes per-km ratios.
//! - [`history`] projects the "current day" and "monthly average" views.
//! - [`export`] renders the daily CSV report, the backup and the share text.
//!
//! ```rust
//! use chrono::Utc;
//! use engine::{ExpenseCategory, ExpenseCmd, Kilometers, Ledger, MemoryStore, MoneyCents, TripCmd};
//!
//! let mut ledger = Ledger::builder(MemoryStore::new()).build().unwrap();
//! let now = Utc::now();
//! ledger
//!     .add_record(TripCmd::new(MoneyCents::new(50_00), now).description("Airport run"))
//!     .unwrap();
//! ledger
//!     .add_record(ExpenseCmd::new(ExpenseCategory::Fuel, MoneyCents::new(12_00), now))
//!     .unwrap();
//! ledger.set_distance(Kilometers::new(10.0).unwrap()).unwrap();
//!
//! assert_eq!(ledger.day_summary(now).net, MoneyCents::new(38_00));
//! ```

pub use calendar::Calendar;
pub use commands::{ExpenseCmd, NewRecord, TripCmd};
pub use distance::Kilometers;
pub use error::EngineError;
pub use export::BackupSnapshot;
pub use history::{HistoryMode, HistoryView};
pub use ledger::{DISTANCE_KEY, Ledger, LedgerBuilder, MODE_KEY, RECORDS_KEY};
pub use money::MoneyCents;
pub use record::{ExpenseCategory, MAX_RECORD_AMOUNT, Movement, Record, RecordId, RecordKind};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub mod aggregate;
mod calendar;
mod commands;
mod distance;
mod error;
pub mod export;
pub mod history;
mod ledger;
pub mod money;
mod record;
pub mod storage;

type ResultEngine<T> = Result<T, EngineError>;
