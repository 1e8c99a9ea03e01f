//! Record primitives.
//!
//! A `Record` is one trip (income) or one expense. Records are never edited:
//! the ledger only inserts or removes them wholesale.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Description used for trips entered without one.
pub const DEFAULT_TRIP_DESCRIPTION: &str = "Rideshare Trip";

/// Largest amount a single record may carry: R$ 10.000.000,00.
pub const MAX_RECORD_AMOUNT: MoneyCents = MoneyCents::new(1_000_000_000);

/// Record identifier: creation time in milliseconds times 1000, plus a random
/// tiebreaker in `0..1000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Generates an id for a record created at `at`.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        let tiebreaker = (Uuid::new_v4().as_u128() % 1000) as u64;
        Self(millis.saturating_mul(1000).saturating_add(tiebreaker))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Next id in sequence, used to step over a collision.
    #[must_use]
    pub const fn successor(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            // Older data stored `millis + random()` as a float.
            Float(f64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(value) => Ok(Self(value)),
            RawId::Float(value) if value.is_finite() && value >= 0.0 => {
                let millis = value.trunc() as u64;
                let tiebreaker = ((value.fract() * 1000.0).floor() as u64).min(999);
                Ok(Self(millis.saturating_mul(1000).saturating_add(tiebreaker)))
            }
            RawId::Float(value) => Err(serde::de::Error::custom(format!(
                "invalid record id: {value}"
            ))),
        }
    }
}

/// The two kinds of record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "corrida")]
    Trip,
    #[serde(rename = "gasto")]
    Expense,
}

impl RecordKind {
    /// Label used in reports and tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trip => "Trip",
            Self::Expense => "Expense",
        }
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "corrida" | "trip" => Ok(Self::Trip),
            "gasto" | "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

/// Fixed set of expense categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Fuel,
    Food,
    Parking,
    Toll,
    Wash,
    Maintenance,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        Self::Fuel,
        Self::Food,
        Self::Parking,
        Self::Toll,
        Self::Wash,
        Self::Maintenance,
        Self::Other,
    ];

    /// Key stored in the `categoria` field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Fuel => "combustivel",
            Self::Food => "alimentacao",
            Self::Parking => "estacionamento",
            Self::Toll => "pedagio",
            Self::Wash => "lavagem",
            Self::Maintenance => "manutencao",
            Self::Other => "outro",
        }
    }

    /// Human readable name, also the default description of an expense.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Food => "Food",
            Self::Parking => "Parking",
            Self::Toll => "Toll",
            Self::Wash => "Wash",
            Self::Maintenance => "Maintenance",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExpenseCategory {
    type Err = EngineError;

    /// Accepts the stored key (`combustivel`) or the display name (`Fuel`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(needle) || c.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EngineError::InvalidCategory(format!("unknown category: {needle}")))
    }
}

/// What a record represents. The category only exists on expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Trip,
    Expense { category: ExpenseCategory },
}

impl Movement {
    pub fn kind(self) -> RecordKind {
        match self {
            Self::Trip => RecordKind::Trip,
            Self::Expense { .. } => RecordKind::Expense,
        }
    }

    pub fn category(self) -> Option<ExpenseCategory> {
        match self {
            Self::Trip => None,
            Self::Expense { category } => Some(category),
        }
    }

    fn default_description(self) -> &'static str {
        match self {
            Self::Trip => DEFAULT_TRIP_DESCRIPTION,
            Self::Expense { category } => category.display_name(),
        }
    }
}

/// One trip or expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredRecord", try_from = "StoredRecord")]
pub struct Record {
    id: RecordId,
    movement: Movement,
    amount: MoneyCents,
    description: String,
    timestamp: DateTime<Utc>,
}

impl Record {
    /// Builds a record, rejecting amounts outside `(0, MAX_RECORD_AMOUNT]`
    /// and filling a blank description with the kind-specific placeholder.
    pub fn new(
        id: RecordId,
        movement: Movement,
        amount: MoneyCents,
        description: &str,
        timestamp: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be > 0, got {amount}"
            )));
        }
        if amount > MAX_RECORD_AMOUNT {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be at most {MAX_RECORD_AMOUNT}, got {amount}"
            )));
        }
        let description = match description.trim() {
            "" => movement.default_description().to_string(),
            text => text.to_string(),
        };
        Ok(Self {
            id,
            movement,
            amount,
            description,
            timestamp,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    pub fn kind(&self) -> RecordKind {
        self.movement.kind()
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        self.movement.category()
    }

    pub fn amount(&self) -> MoneyCents {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind().label(), self.amount, self.description)
    }
}

/// Persisted shape of a record.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    tipo: RecordKind,
    valor: f64,
    #[serde(default)]
    descricao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categoria: Option<String>,
    data: DateTime<Utc>,
}

impl From<Record> for StoredRecord {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            tipo: record.kind(),
            valor: record.amount.to_major(),
            descricao: record.description,
            categoria: record.movement.category().map(|c| c.key().to_string()),
            data: record.timestamp,
        }
    }
}

impl TryFrom<StoredRecord> for Record {
    type Error = EngineError;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        let amount = MoneyCents::from_major(stored.valor).ok_or_else(|| {
            EngineError::InvalidAmount(format!("invalid stored amount: {}", stored.valor))
        })?;
        if (amount.to_major() - stored.valor).abs() > 1e-9 {
            tracing::warn!(
                "stored amount {} of record {} rounded to {amount}",
                stored.valor,
                stored.id
            );
        }
        // Trips used to carry `categoria: "corrida"`; only expenses read it.
        let movement = match stored.tipo {
            RecordKind::Trip => Movement::Trip,
            RecordKind::Expense => Movement::Expense {
                category: match stored.categoria.as_deref() {
                    Some(key) => key.parse()?,
                    None => ExpenseCategory::Other,
                },
            },
        };
        Record::new(stored.id, movement, amount, &stored.descricao, stored.data)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 14, 30, 0).unwrap()
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let id = RecordId::new(1);
        assert!(matches!(
            Record::new(id, Movement::Trip, MoneyCents::ZERO, "", at()),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            Record::new(id, Movement::Trip, MoneyCents::new(-5), "", at()),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn new_caps_the_amount() {
        let id = RecordId::new(1);
        assert!(Record::new(id, Movement::Trip, MAX_RECORD_AMOUNT, "", at()).is_ok());
        let above = MAX_RECORD_AMOUNT + MoneyCents::new(1);
        assert!(matches!(
            Record::new(id, Movement::Trip, above, "", at()),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn blank_description_uses_placeholder() {
        let trip = Record::new(RecordId::new(1), Movement::Trip, MoneyCents::new(100), "  ", at()).unwrap();
        assert_eq!(trip.description(), DEFAULT_TRIP_DESCRIPTION);

        let fuel = Movement::Expense {
            category: ExpenseCategory::Fuel,
        };
        let expense = Record::new(RecordId::new(2), fuel, MoneyCents::new(100), "", at()).unwrap();
        assert_eq!(expense.description(), "Fuel");
        assert_eq!(expense.category(), Some(ExpenseCategory::Fuel));
        assert_eq!(trip.category(), None);
    }

    #[test]
    fn generated_ids_encode_the_creation_millis() {
        let id = RecordId::generate(at());
        assert_eq!(id.get() / 1000, at().timestamp_millis() as u64);
    }

    #[test]
    fn serializes_to_the_stored_shape() {
        let toll = Movement::Expense {
            category: ExpenseCategory::Toll,
        };
        let record = Record::new(RecordId::new(42), toll, MoneyCents::new(1250), "Ponte", at()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["tipo"], "gasto");
        assert_eq!(value["valor"], 12.5);
        assert_eq!(value["descricao"], "Ponte");
        assert_eq!(value["categoria"], "pedagio");
        assert_eq!(value["data"], "2026-10-18T14:30:00Z");

        let trip = Record::new(RecordId::new(43), Movement::Trip, MoneyCents::new(100), "", at()).unwrap();
        let value = serde_json::to_value(&trip).unwrap();
        assert!(value.get("categoria").is_none());
    }

    #[test]
    fn reads_legacy_records() {
        let json = r#"{
            "id": 1792333800000.4567,
            "tipo": "corrida",
            "valor": 23.9,
            "descricao": "Corrida Uber",
            "data": "2026-10-18T14:30:00.000Z",
            "categoria": "corrida"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), RecordId::new(1_792_333_800_000_456));
        assert_eq!(record.movement(), Movement::Trip);
        assert_eq!(record.amount(), MoneyCents::new(2390));
        assert_eq!(record.timestamp(), at());
    }

    #[test]
    fn stored_amounts_round_to_the_nearest_cent() {
        let json = r#"{"id": 7, "tipo": "corrida", "valor": 12.346, "descricao": "", "data": "2026-10-18T14:30:00Z"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.amount(), MoneyCents::new(1235));
    }

    #[test]
    fn kind_parses_stored_and_english_names() {
        assert_eq!(RecordKind::try_from("gasto").unwrap(), RecordKind::Expense);
        assert_eq!(RecordKind::try_from("Trip").unwrap(), RecordKind::Trip);
        assert!(matches!(
            RecordKind::try_from("transfer"),
            Err(EngineError::InvalidKind(_))
        ));
    }

    #[test]
    fn rejects_stored_expense_with_unknown_category() {
        let json = r#"{"id": 1, "tipo": "gasto", "valor": 5, "descricao": "", "categoria": "pizza", "data": "2026-10-18T14:30:00Z"}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn category_parses_keys_and_names() {
        assert_eq!("pedagio".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Toll);
        assert_eq!("maintenance".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Maintenance);
        assert!("pizza".parse::<ExpenseCategory>().is_err());
    }
}
