//! Valuation-related types
//!
//! Costing methods, reporting windows and the summary produced by a valuation
//! run.

use super::error::InventoryError;
use super::transaction::{ProductId, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Costing convention used to value remaining stock
///
/// Serialized with exactly the tags `FIFO`, `LIFO` and `weighted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CostingMethod {
    /// First in, first out. Exits consume the oldest lots.
    #[serde(rename = "FIFO")]
    Fifo,

    /// Last in, first out. Exits consume the newest lots.
    #[serde(rename = "LIFO")]
    Lifo,

    /// Running weighted-average cost
    #[default]
    #[serde(rename = "weighted")]
    Weighted,
}

impl CostingMethod {
    /// All recognised methods, in tag order
    pub const ALL: [CostingMethod; 3] = [
        CostingMethod::Fifo,
        CostingMethod::Lifo,
        CostingMethod::Weighted,
    ];

    /// The stable external tag for this method
    pub fn tag(&self) -> &'static str {
        match self {
            CostingMethod::Fifo => "FIFO",
            CostingMethod::Lifo => "LIFO",
            CostingMethod::Weighted => "weighted",
        }
    }
}

impl FromStr for CostingMethod {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(CostingMethod::Fifo),
            "lifo" => Ok(CostingMethod::Lifo),
            "weighted" => Ok(CostingMethod::Weighted),
            _ => Err(InventoryError::invalid_method(s)),
        }
    }
}

impl fmt::Display for CostingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Inclusive calendar window `[start, end]`
///
/// Comparison is by date only; the time of day of a transaction never
/// affects whether it falls inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InventoryError> {
        if start > end {
            return Err(InventoryError::invalid_window(start, end));
        }
        Ok(DateWindow { start, end })
    }

    /// A window covering every representable date
    pub fn unbounded() -> Self {
        DateWindow {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `day` falls inside the window (both ends inclusive)
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Summary of one valuation run for one product
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationResult {
    /// Entries inside the window, in input order
    pub entries: Vec<Transaction>,

    /// Exits inside the window, in input order
    pub exits: Vec<Transaction>,

    /// Units left after all exits were applied
    pub remaining_stock: Decimal,

    /// Cost of the remaining units
    pub total_cost: Decimal,

    /// `total_cost / remaining_stock`, or zero when no stock remains
    pub average_cost: Decimal,

    /// Exit quantity that could not be matched against available stock
    ///
    /// Zero for a consistent transaction log. A non-zero value means the
    /// numeric fields understate historical consumption.
    pub unsatisfied_quantity: Decimal,
}

impl ValuationResult {
    /// Whether every exit in the window was fully matched
    pub fn is_fully_satisfied(&self) -> bool {
        self.unsatisfied_quantity.is_zero()
    }

    /// Whether the window contained no transactions at all
    ///
    /// Distinguishes "no data" from "fully consumed", which both report
    /// zero stock.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.exits.is_empty()
    }
}

/// One report line: the valuation of a product together with its live stock
#[derive(Debug, Clone, PartialEq)]
pub struct ProductValuation {
    pub product_id: ProductId,
    pub method: CostingMethod,
    pub valuation: ValuationResult,

    /// Stock over the full history, independent of the window
    pub current_stock: Decimal,

    /// Whether `current_stock` is at or below the product's minimum
    pub low_stock: bool,
}
