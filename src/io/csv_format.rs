//! CSV format handling for catalog and transaction input and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization of both input files
//! - Conversion from CSV records to domain requests
//! - Date and decimal field parsing
//! - Valuation report serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{InventoryError, NewProduct, NewTransaction, ProductValuation, TransactionKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

/// Column order of the valuation report
pub const REPORT_HEADER: [&str; 10] = [
    "product",
    "method",
    "entries",
    "exits",
    "remaining_stock",
    "total_cost",
    "average_cost",
    "current_stock",
    "low_stock",
    "unsatisfied",
];

/// Transaction log row: `id,product,type,quantity,unit_cost,date,notes`
///
/// Numbers and dates are kept as strings so that a bad value produces a
/// message naming the offending field instead of a generic serde error.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvTransactionRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub product: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: String,
    #[serde(default)]
    pub unit_cost: Option<String>,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Catalog row: `id,name,description,category,sku,min_stock,price,barcode`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvProductRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub min_stock: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

/// A CSV row type together with its conversion into a domain request
///
/// Lets the sync and async readers stream either input file.
pub trait CsvRow: DeserializeOwned + Send + 'static {
    type Output: Send + 'static;

    fn convert(self) -> Result<Self::Output, InventoryError>;
}

impl CsvRow for CsvTransactionRecord {
    type Output = NewTransaction;

    fn convert(self) -> Result<NewTransaction, InventoryError> {
        convert_transaction_record(self)
    }
}

impl CsvRow for CsvProductRecord {
    type Output = NewProduct;

    fn convert(self) -> Result<NewProduct, InventoryError> {
        convert_product_record(self)
    }
}

/// Map a failure to open an input file
///
/// A missing file becomes `FileNotFound`; anything else is an I/O error
/// naming the path.
pub fn open_error(path: &Path, error: io::Error) -> InventoryError {
    match error.kind() {
        io::ErrorKind::NotFound => InventoryError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => InventoryError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), error),
        },
    }
}

/// Trimmed, non-empty value of an optional field
fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a decimal field
///
/// # Errors
///
/// Returns a `ParseError` naming the field and the owning record.
pub fn parse_decimal(field: &str, value: &str, owner: &str) -> Result<Decimal, InventoryError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| InventoryError::parse(format!("Invalid {field} '{value}' for {owner}")))
}

/// Parse a transaction timestamp
///
/// Accepted forms:
/// - `YYYY-MM-DD` (midnight)
/// - `YYYY-MM-DDTHH:MM:SS` or with a space separator, optional fraction
/// - RFC 3339 with an offset; the offset is dropped so the written wall-clock
///   time, and with it the calendar day, is kept
///
/// # Errors
///
/// Returns a `ParseError` when none of the forms match.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, InventoryError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime);
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|datetime| datetime.naive_local())
        .map_err(|_| InventoryError::parse(format!("Invalid date '{value}'")))
}

/// Convert a transaction log row into a write request
///
/// # Errors
///
/// Returns a `ParseError` if:
/// - The type is neither `entry` nor `exit` (case-insensitive)
/// - The quantity, unit cost or date cannot be parsed
/// - An entry has no unit cost
pub fn convert_transaction_record(
    record: CsvTransactionRecord,
) -> Result<NewTransaction, InventoryError> {
    let id = non_empty(record.id);
    let owner = match &id {
        Some(id) => format!("tx {id}"),
        None => format!("{} row for product {}", record.kind.trim(), record.product.trim()),
    };

    let kind = match record.kind.trim().to_lowercase().as_str() {
        "entry" => TransactionKind::Entry,
        "exit" => TransactionKind::Exit,
        _ => {
            return Err(InventoryError::parse(format!(
                "Invalid transaction type: '{}' for {owner}",
                record.kind
            )))
        }
    };

    let quantity = parse_decimal("quantity", &record.quantity, &owner)?;

    let unit_cost = match (non_empty(record.unit_cost), kind) {
        (Some(cost), _) => parse_decimal("unit_cost", &cost, &owner)?,
        (None, TransactionKind::Exit) => Decimal::ZERO,
        (None, TransactionKind::Entry) => {
            return Err(InventoryError::parse(format!(
                "Entry {owner} requires a unit_cost"
            )))
        }
    };

    let date = parse_datetime(&record.date)?;

    Ok(NewTransaction {
        id,
        product_id: record.product.trim().to_string(),
        kind,
        quantity,
        unit_cost,
        date,
        notes: record.notes.unwrap_or_default(),
    })
}

/// Convert a catalog row into a product request
///
/// Blank `min_stock` and `price` default to zero.
///
/// # Errors
///
/// Returns a `ParseError` for an unparsable number.
pub fn convert_product_record(record: CsvProductRecord) -> Result<NewProduct, InventoryError> {
    let id = non_empty(record.id);
    let sku = non_empty(record.sku).unwrap_or_default();
    let owner = format!(
        "product {}",
        id.as_deref().unwrap_or(if sku.is_empty() { "<unnamed>" } else { &sku })
    );

    let min_stock = match non_empty(record.min_stock) {
        Some(value) => parse_decimal("min_stock", &value, &owner)?,
        None => Decimal::ZERO,
    };
    let price = match non_empty(record.price) {
        Some(value) => parse_decimal("price", &value, &owner)?,
        None => Decimal::ZERO,
    };

    Ok(NewProduct {
        id,
        name: non_empty(record.name).unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        category_id: non_empty(record.category).unwrap_or_default(),
        sku,
        min_stock,
        price,
        barcode: non_empty(record.barcode),
    })
}

/// Four fractional digits, rounded half to even
fn fixed4(value: Decimal) -> String {
    format!("{:.4}", value.round_dp(4))
}

/// Write the valuation report
///
/// One row per entry in `rows`, in the given order. Quantities and money are
/// written with four decimal places.
///
/// # Errors
///
/// Returns an error if writing to `output` fails.
pub fn write_valuation_csv(
    rows: &[ProductValuation],
    output: &mut dyn Write,
) -> Result<(), InventoryError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(REPORT_HEADER)?;

    for row in rows {
        let valuation = &row.valuation;
        writer.write_record(&[
            row.product_id.clone(),
            row.method.tag().to_string(),
            valuation.entries.len().to_string(),
            valuation.exits.len().to_string(),
            fixed4(valuation.remaining_stock),
            fixed4(valuation.total_cost),
            fixed4(valuation.average_cost),
            fixed4(row.current_stock),
            row.low_stock.to_string(),
            fixed4(valuation.unsatisfied_quantity),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
