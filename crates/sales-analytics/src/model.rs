//! Domain Models
//!
//! One row of the sales table plus the column vocabulary the tools accept.
//! Quantities, prices and service levels are `Decimal` throughout.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Label used when a row carries no promotion type
pub const NO_PROMOTION: &str = "sem_promocao";

/// One sales observation: a product at a location on a day
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,

    pub product_id: String,

    /// Store / location identifier
    pub local: String,

    /// Forecast volume
    pub planned_quantity: Decimal,

    /// Volume actually sold
    pub actual_quantity: Decimal,

    /// Unit price actually charged
    pub actual_price: Decimal,

    /// Promotion in effect, `None` when the cell was blank
    pub promotion_type: Option<String>,

    /// Fraction of demand served (0..=1)
    pub service_level: Decimal,
}

impl SalesRecord {
    /// `actual_quantity * actual_price`
    pub fn revenue(&self) -> crate::Result<Decimal> {
        self.actual_quantity
            .checked_mul(self.actual_price)
            .ok_or(AnalyticsError::Overflow("revenue"))
    }

    /// `actual_quantity - planned_quantity`; positive means demand was underestimated
    pub fn gap(&self) -> crate::Result<Decimal> {
        self.actual_quantity
            .checked_sub(self.planned_quantity)
            .ok_or(AnalyticsError::Overflow("gap"))
    }

    /// Gap as a percentage of the plan, `None` when nothing was planned
    pub fn pct_deviation(&self) -> crate::Result<Option<Decimal>> {
        if self.planned_quantity.is_zero() {
            return Ok(None);
        }
        self.gap()?
            .checked_div(self.planned_quantity)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(Some)
            .ok_or(AnalyticsError::Overflow("percentage deviation"))
    }

    /// `actual / planned`, `None` when nothing was planned
    pub fn plan_ratio(&self) -> crate::Result<Option<Decimal>> {
        if self.planned_quantity.is_zero() {
            return Ok(None);
        }
        self.actual_quantity
            .checked_div(self.planned_quantity)
            .map(Some)
            .ok_or(AnalyticsError::Overflow("plan ratio"))
    }

    /// Promotion type for grouping, blank rows folded into [`NO_PROMOTION`]
    pub fn promotion_label(&self) -> &str {
        self.promotion_type.as_deref().unwrap_or(NO_PROMOTION)
    }

    /// Whether a real promotion was running
    pub fn has_promotion(&self) -> bool {
        self.promotion_type.as_deref().is_some_and(|p| {
            let p = p.trim().to_lowercase();
            !matches!(
                p.as_str(),
                "" | "none" | "nan" | "0" | "nenhuma" | "sem promoção" | "sem promocao" | NO_PROMOTION
            )
        })
    }
}

/// Column a tool may group by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Product,
    Location,
    Promotion,
}

impl Dimension {
    pub fn key<'a>(&self, record: &'a SalesRecord) -> &'a str {
        match self {
            Self::Product => &record.product_id,
            Self::Location => &record.local,
            Self::Promotion => record.promotion_label(),
        }
    }
}

impl FromStr for Dimension {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product_id" | "product" | "produto" => Ok(Self::Product),
            "local" | "location" | "loja" => Ok(Self::Location),
            "promotion_type" | "promotion" | "promocao" | "promoção" => Ok(Self::Promotion),
            other => Err(AnalyticsError::UnknownColumn(other.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product_id",
            Self::Location => "local",
            Self::Promotion => "promotion_type",
        })
    }
}

/// Numeric column (or derived value) a tool may aggregate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    PlannedQuantity,
    ActualQuantity,
    ActualPrice,
    Revenue,
    ServiceLevel,
}

impl Metric {
    pub fn value(&self, record: &SalesRecord) -> crate::Result<Decimal> {
        match self {
            Self::PlannedQuantity => Ok(record.planned_quantity),
            Self::ActualQuantity => Ok(record.actual_quantity),
            Self::ActualPrice => Ok(record.actual_price),
            Self::Revenue => record.revenue(),
            Self::ServiceLevel => Ok(record.service_level),
        }
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned_quantity" => Ok(Self::PlannedQuantity),
            "actual_quantity" | "volume" | "quantidade" => Ok(Self::ActualQuantity),
            "actual_price" | "price" | "preco" | "preço" => Ok(Self::ActualPrice),
            "revenue" | "receita" | "receita_real" => Ok(Self::Revenue),
            "service_level" => Ok(Self::ServiceLevel),
            other => Err(AnalyticsError::UnknownColumn(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlannedQuantity => "planned_quantity",
            Self::ActualQuantity => "actual_quantity",
            Self::ActualPrice => "actual_price",
            Self::Revenue => "receita",
            Self::ServiceLevel => "service_level",
        })
    }
}
