use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{RaceError, RaceResult};

/// Raw tabular record as handed over by the data source.
///
/// Field names follow the source table (`player`, `stat`, `date`, `value`). Missing fields
/// deserialize to blanks so that a single bad row is rejected during normalization instead
/// of failing the whole file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawRecord {
    /// Entity identifier.
    #[serde(default)]
    pub player: String,
    /// Statistic key.
    #[serde(default)]
    pub stat: String,
    /// Date or period label.
    #[serde(default)]
    pub date: String,
    /// Numeric value, possibly carried as text.
    #[serde(default)]
    pub value: Option<RawValue>,
}

/// A value cell: either a JSON number or numeric text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Already numeric.
    Number(f64),
    /// Text to be coerced.
    Text(String),
}

impl RawValue {
    /// Coerce to a finite number.
    pub fn to_finite(&self) -> RaceResult<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let t = s.trim();
                t.parse::<f64>().map_err(|_| {
                    RaceError::validation(format!("value '{s}' is not numeric"))
                })?
            }
        };
        if !v.is_finite() {
            return Err(RaceError::validation(format!("value {v} is not finite")));
        }
        Ok(v)
    }
}

impl RawRecord {
    /// Build a record from borrowed cells.
    pub fn new(
        player: impl Into<String>,
        stat: impl Into<String>,
        date: impl Into<String>,
        value: RawValue,
    ) -> Self {
        Self {
            player: player.into(),
            stat: stat.into(),
            date: date.into(),
            value: Some(value),
        }
    }

    /// Parse a JSON array of raw records from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RaceResult<Vec<Self>> {
        serde_json::from_reader(r)
            .map_err(|e| RaceError::serde(format!("parse records JSON: {e}")))
    }

    /// Parse a JSON array of raw records from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RaceResult<Vec<Self>> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RaceError::serde(format!("open records JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/observation/record.rs"]
mod tests;
