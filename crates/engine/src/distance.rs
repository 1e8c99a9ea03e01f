//! Distance readings in kilometres.

use std::{fmt, ops::Mul, str::FromStr};

use crate::{EngineError, ResultEngine};

/// A non-negative distance in kilometres.
///
/// The only way to build a non-zero value is [`Kilometers::new`] (or parsing),
/// which rejects zero, negative and non-finite input. `Kilometers::ZERO` stands
/// for "no reading yet".
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Kilometers(f64);

impl Kilometers {
    pub const ZERO: Kilometers = Kilometers(0.0);

    /// Validates a distance reading entered by the driver.
    pub fn new(value: f64) -> ResultEngine<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(EngineError::InvalidDistance(format!(
                "distance must be a positive number, got {value}"
            )));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

/// Distance assigned to `days` days at the same reading.
impl Mul<usize> for Kilometers {
    type Output = Kilometers;

    fn mul(self, days: usize) -> Self::Output {
        Kilometers(self.0 * days as f64)
    }
}

impl fmt::Display for Kilometers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km", self.0)
    }
}

impl FromStr for Kilometers {
    type Err = EngineError;

    /// Accepts `.` or `,` as decimal separator and an optional `km` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_suffix("km")
            .or_else(|| trimmed.strip_suffix("KM"))
            .unwrap_or(trimmed)
            .trim();
        let value: f64 = trimmed
            .replace(',', ".")
            .parse()
            .map_err(|_| EngineError::InvalidDistance(format!("invalid distance: {}", s.trim())))?;
        Kilometers::new(value)
    }
}
