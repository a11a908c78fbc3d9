//! Record types stored in and returned by the bathtub store

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::core::metrics::Measurements;

/// One measured bathtub with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BathtubRecord {
    pub id: i64,
    pub name: String,
    /// Length at the rim (cm)
    pub top_width: f64,
    /// Length at the floor (cm)
    pub bottom_width: f64,
    /// Breadth (cm)
    pub width: f64,
    /// Depth (cm)
    pub height: f64,
    /// Side incline from vertical (degrees), derived
    pub incline_degrees: f64,
    /// Estimated capacity (liters), derived; `None` when not available
    pub liters: Option<f64>,
    pub created_at: NaiveDate,
}

impl BathtubRecord {
    pub fn measurements(&self) -> Measurements {
        Measurements::new(self.top_width, self.bottom_width, self.width, self.height)
    }
}

/// A caller-editable field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    TopWidth,
    BottomWidth,
    Width,
    Height,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::TopWidth,
        Field::BottomWidth,
        Field::Width,
        Field::Height,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::TopWidth => "top_width",
            Field::BottomWidth => "bottom_width",
            Field::Width => "width",
            Field::Height => "height",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns that are derived or assigned by the store
const READ_ONLY_FIELDS: &[&str] = &["id", "incline_degrees", "incline", "liters", "created_at"];

impl FromStr for Field {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        match key.as_str() {
            "name" => Ok(Field::Name),
            "top_width" | "top_length" => Ok(Field::TopWidth),
            "bottom_width" | "bottom_length" => Ok(Field::BottomWidth),
            "width" => Ok(Field::Width),
            "height" => Ok(Field::Height),
            other if READ_ONLY_FIELDS.contains(&other) => Err(StoreError::Validation {
                field: other.to_string(),
                reason: "field is read-only".to_string(),
            }),
            other => Err(StoreError::Validation {
                field: other.to_string(),
                reason: format!(
                    "unknown field (expected one of: {})",
                    Field::ALL.map(|f| f.as_str()).join(", ")
                ),
            }),
        }
    }
}

/// A partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BathtubUpdate {
    pub name: Option<String>,
    pub top_width: Option<f64>,
    pub bottom_width: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl BathtubUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.top_width.is_none()
            && self.bottom_width.is_none()
            && self.width.is_none()
            && self.height.is_none()
    }

    /// Set one field from its textual name and value
    pub fn set(&mut self, field: &str, value: &str) -> Result<Field, StoreError> {
        let field: Field = field.parse()?;
        let slot = match field {
            Field::Name => {
                self.name = Some(value.to_string());
                return Ok(field);
            }
            Field::TopWidth => &mut self.top_width,
            Field::BottomWidth => &mut self.bottom_width,
            Field::Width => &mut self.width,
            Field::Height => &mut self.height,
        };

        let number: f64 = value.trim().parse().map_err(|_| StoreError::Validation {
            field: field.to_string(),
            reason: format!("expected a number, got '{}'", value),
        })?;
        *slot = Some(number);
        Ok(field)
    }

    /// Apply this update on top of a stored record's editable values
    pub(super) fn apply(&self, record: &BathtubRecord) -> (String, Measurements) {
        let name = self.name.clone().unwrap_or_else(|| record.name.clone());
        let measurements = Measurements::new(
            self.top_width.unwrap_or(record.top_width),
            self.bottom_width.unwrap_or(record.bottom_width),
            self.width.unwrap_or(record.width),
            self.height.unwrap_or(record.height),
        );
        (name, measurements)
    }
}

/// A stored row that failed validation on read
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptRecord {
    pub id: Option<i64>,
    pub reason: String,
}

impl CorruptRecord {
    pub fn into_error(self) -> StoreError {
        StoreError::CorruptRecord {
            id: self.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            reason: self.reason,
        }
    }
}

/// Result of a multi-row read
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub records: Vec<BathtubRecord>,
    /// Rows that were skipped because they failed validation
    pub skipped: Vec<CorruptRecord>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parse_aliases() {
        assert_eq!("top_width".parse::<Field>().unwrap(), Field::TopWidth);
        assert_eq!("top-width".parse::<Field>().unwrap(), Field::TopWidth);
        assert_eq!("bottom_length".parse::<Field>().unwrap(), Field::BottomWidth);
        assert_eq!("HEIGHT".parse::<Field>().unwrap(), Field::Height);
    }

    #[test]
    fn test_read_only_fields_rejected() {
        for name in ["id", "incline_degrees", "liters", "created_at"] {
            match name.parse::<Field>() {
                Err(StoreError::Validation { field, reason }) => {
                    assert_eq!(field, name);
                    assert!(reason.contains("read-only"));
                }
                other => panic!("expected read-only error for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "colour".parse::<Field>().unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref field, .. } if field == "colour"));
    }

    #[test]
    fn test_set_parses_numbers() {
        let mut update = BathtubUpdate::default();
        assert!(update.is_empty());
        update.set("height", " 45.5 ").unwrap();
        update.set("name", "Kaldewei").unwrap();
        assert_eq!(update.height, Some(45.5));
        assert_eq!(update.name.as_deref(), Some("Kaldewei"));
        assert!(!update.is_empty());

        let err = update.set("width", "wide").unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref field, .. } if field == "width"));
    }
}
