//! Stock movement types for the stock ledger
//!
//! This module defines movement kinds, the raw requests callers submit, the
//! validated movements the ledger and log consume, and the entries read back
//! from the transaction log.

use super::error::InventoryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Kind of stock movement
///
/// Ledger adjustments only accept `Entree` and `Sortie`. The transaction log
/// also records free-form labels, trimmed but otherwise as given; spellings
/// of the two known kinds are stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum MovementType {
    /// Inbound stock
    Entree,

    /// Outbound stock
    Sortie,

    /// Any other label (log only)
    Other(String),
}

impl MovementType {
    /// Parse a movement label
    ///
    /// Matching is case-insensitive and accepts the accented `Entrée` spelling.
    /// Unknown labels are kept as `Other` with surrounding whitespace trimmed.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "entree" | "entrée" => MovementType::Entree,
            "sortie" => MovementType::Sortie,
            _ => MovementType::Other(trimmed.to_string()),
        }
    }

    /// Label as stored in the transaction log
    pub fn as_str(&self) -> &str {
        match self {
            MovementType::Entree => "Entree",
            MovementType::Sortie => "Sortie",
            MovementType::Other(label) => label,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MovementType {
    fn from(label: String) -> Self {
        MovementType::parse(&label)
    }
}

impl From<MovementType> for String {
    fn from(kind: MovementType) -> Self {
        kind.as_str().to_string()
    }
}

/// Raw movement request as submitted by a caller
///
/// Every field is optional and loosely typed, matching what a JSON client may
/// send: `product` may be a string or a number, `quantity` a number or a
/// numeric string. Call [`MovementRequest::validate`] to obtain a [`Movement`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MovementRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub product: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl MovementRequest {
    /// Build a request from already typed parts
    pub fn new(kind: &str, product: &str, quantity: i64) -> Self {
        MovementRequest {
            kind: Some(kind.to_string()),
            product: Some(Value::String(product.to_string())),
            quantity: Some(Value::from(quantity)),
        }
    }

    /// Product key of this request, if one can be read
    pub fn product_key(&self) -> Option<String> {
        match self.product.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Validate the request into a typed movement
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` if:
    /// - `type` is missing or blank
    /// - `product` is missing, blank, or neither a string nor a number
    /// - `quantity` is missing, not numeric, or not a whole number
    pub fn validate(&self) -> Result<Movement, InventoryError> {
        let product = self.product_key();
        let product_ref = product.as_deref();

        let kind = match self.kind.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => MovementType::parse(label),
            _ => return Err(InventoryError::validation(product_ref, "type is required")),
        };

        let product = product
            .ok_or_else(|| InventoryError::validation(None, "product is required"))?;

        let quantity = match &self.quantity {
            None | Some(Value::Null) => {
                return Err(InventoryError::validation(
                    Some(&product),
                    "quantity is required",
                ))
            }
            Some(value) => parse_quantity(value).map_err(|message| {
                InventoryError::validation(Some(&product), message)
            })?,
        };

        Ok(Movement {
            kind,
            product,
            quantity,
        })
    }
}

/// Read a whole number out of a JSON value
///
/// Accepts integers, integral floats and numeric strings.
fn parse_quantity(value: &Value) -> Result<i64, &'static str> {
    const NOT_A_NUMBER: &str = "quantity must be a number";
    const NOT_WHOLE: &str = "quantity must be a whole number";

    let as_whole = |f: f64| -> Result<i64, &'static str> {
        if !f.is_finite() {
            Err(NOT_A_NUMBER)
        } else if f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
            Err(NOT_WHOLE)
        } else {
            Ok(f as i64)
        }
    };

    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => n.as_f64().ok_or(NOT_A_NUMBER).and_then(as_whole),
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            s.parse::<f64>().map_err(|_| NOT_A_NUMBER).and_then(as_whole)
        }
        _ => Err(NOT_A_NUMBER),
    }
}

/// A validated stock movement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub kind: MovementType,
    pub product: String,
    pub quantity: i64,
}

/// One row of the transaction log, as read back
///
/// `occurred_at` is rebuilt from the separately stored date and time cells
/// and is `None` when they cannot be combined into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogEntry {
    #[serde(rename = "type")]
    pub kind: MovementType,
    pub product: String,
    pub quantity: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub occurred_at: Option<NaiveDateTime>,
}

fn serialize_timestamp<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S")),
        None => serializer.serialize_none(),
    }
}
