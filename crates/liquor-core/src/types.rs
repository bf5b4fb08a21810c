//! # Domain Types
//!
//! Core domain types used throughout the liquor store backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──┼─────────────────┼───│  liquor_id      │       │
//! │  │  category       │   │  id             │◄──│  sale_id        │       │
//! │  │  price_cents    │   │  status         │   │  quantity       │       │
//! │  │  stock          │   │  total_cents    │   │  subtotal_cents │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ LiquorCategory  │   │   SaleStatus    │   │  StockPolicy    │       │
//! │  │  whiskey, rum,  │   │  pending        │   │  AllowNegative  │       │
//! │  │  vodka, ...     │   │  completed      │   │  RejectOversell │       │
//! │  └─────────────────┘   │  cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input vs Stored Shapes
//! Every entity has an input shape (`NewProduct`, `ProductUpdate`, `NewSale`)
//! that carries no generated fields, and a stored shape (`Product`, `Sale`)
//! that echoes ids and timestamps back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{self, ValidationResult};
use crate::{DEFAULT_MINIMUM_STOCK, DEFAULT_PAGE_LIMIT, MAX_STOCK};

// =============================================================================
// Liquor Category
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquorCategory {
    Whiskey,
    Vodka,
    Rum,
    Tequila,
    Gin,
    Wine,
    Beer,
    Other,
}

impl LiquorCategory {
    pub const ALL: [LiquorCategory; 8] = [
        LiquorCategory::Whiskey,
        LiquorCategory::Vodka,
        LiquorCategory::Rum,
        LiquorCategory::Tequila,
        LiquorCategory::Gin,
        LiquorCategory::Wine,
        LiquorCategory::Beer,
        LiquorCategory::Other,
    ];

    /// Wire and storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LiquorCategory::Whiskey => "whiskey",
            LiquorCategory::Vodka => "vodka",
            LiquorCategory::Rum => "rum",
            LiquorCategory::Tequila => "tequila",
            LiquorCategory::Gin => "gin",
            LiquorCategory::Wine => "wine",
            LiquorCategory::Beer => "beer",
            LiquorCategory::Other => "other",
        }
    }
}

impl fmt::Display for LiquorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiquorCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LiquorCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: LiquorCategory::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A liquor carried by the store.
///
/// `is_available` is derived from `stock` and is recomputed on every
/// stock-affecting mutation; it is never accepted as input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub category: LiquorCategory,
    /// Shelf price in cents.
    #[serde(rename = "price")]
    pub price_cents: i64,
    /// Alcohol by volume, in percent.
    pub alcohol_content: f64,
    pub volume_ml: i64,
    /// Units on hand. Can be negative after an oversell under
    /// [`StockPolicy::AllowNegative`].
    pub stock: i64,
    pub is_available: bool,
    pub supplier: String,
    /// Reorder threshold for the low-stock advisory.
    pub minimum_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when stock has fallen to or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.minimum_stock
    }

    /// Re-derives `is_available` from the current stock.
    #[inline]
    pub fn refresh_availability(&mut self) {
        self.is_available = is_available_for(self.stock);
    }
}

/// Availability rule shared by the domain and the SQL layer.
#[inline]
pub const fn is_available_for(stock: i64) -> bool {
    stock > 0
}

fn default_minimum_stock() -> i64 {
    DEFAULT_MINIMUM_STOCK
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub category: LiquorCategory,
    #[serde(rename = "price")]
    pub price_cents: i64,
    pub alcohol_content: f64,
    pub volume_ml: i64,
    pub stock: i64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default = "default_minimum_stock")]
    pub minimum_stock: i64,
}

impl NewProduct {
    /// Checks every field rule; price must be positive and stock
    /// non-negative.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_product_name(&self.name)?;
        validation::validate_brand(&self.brand)?;
        validation::validate_price_cents(self.price_cents)?;
        validation::validate_alcohol_content(self.alcohol_content)?;
        validation::validate_volume_ml(self.volume_ml)?;
        validation::validate_stock(self.stock)?;
        validation::validate_minimum_stock(self.minimum_stock)?;
        Ok(())
    }

    /// Builds the stored shape once the storage id is known.
    pub fn into_product(self, id: i64, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            description: self.description,
            category: self.category,
            price_cents: self.price_cents,
            alcohol_content: self.alcohol_content,
            volume_ml: self.volume_ml,
            stock: self.stock,
            is_available: is_available_for(self.stock),
            supplier: self.supplier,
            minimum_stock: self.minimum_stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial product update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<LiquorCategory>,
    #[serde(rename = "price", skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alcohol_content: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ml: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<i64>,
}

impl ProductUpdate {
    /// Validates only the supplied fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(brand) = &self.brand {
            validation::validate_brand(brand)?;
        }
        if let Some(price) = self.price_cents {
            validation::validate_price_cents(price)?;
        }
        if let Some(abv) = self.alcohol_content {
            validation::validate_alcohol_content(abv)?;
        }
        if let Some(volume) = self.volume_ml {
            validation::validate_volume_ml(volume)?;
        }
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        if let Some(minimum) = self.minimum_stock {
            validation::validate_minimum_stock(minimum)?;
        }
        Ok(())
    }

    /// Applies the supplied fields, re-derives availability and touches
    /// `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(brand) = &self.brand {
            product.brand = brand.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(abv) = self.alcohol_content {
            product.alcohol_content = abv;
        }
        if let Some(volume) = self.volume_ml {
            product.volume_ml = volume;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = supplier.clone();
        }
        if let Some(minimum) = self.minimum_stock {
            product.minimum_stock = minimum;
        }
        product.refresh_availability();
        product.updated_at = now;
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Status of a recorded sale.
///
/// Any status may be set from any other; no transition table is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Recorded but awaiting payment or pickup.
    Pending,
    /// Paid and handed over.
    #[default]
    Completed,
    /// Called off after recording. Stock is not restored.
    Cancelled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 3] = [SaleStatus::Pending, SaleStatus::Completed, SaleStatus::Cancelled];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SaleStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: SaleStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub customer_name: String,
    /// Customer identity document, when given.
    pub customer_id: Option<String>,
    /// Total declared by the point of sale, in cents.
    #[serde(rename = "total")]
    pub total_cents: i64,
    pub payment_method: String,
    pub sale_date: DateTime<Utc>,
    pub status: SaleStatus,
    pub sale_lines: Vec<SaleLine>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of the line subtotals as recorded.
    pub fn lines_total(&self) -> Money {
        self.sale_lines.iter().map(SaleLine::subtotal).sum()
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One product-and-quantity entry of a sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub liquor_id: i64,
    pub quantity: i64,
    #[serde(rename = "unit_price")]
    pub unit_price_cents: i64,
    #[serde(rename = "subtotal")]
    pub subtotal_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// Input for recording a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_name: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub payment_method: String,
    #[serde(rename = "total")]
    pub total_cents: i64,
    pub sale_lines: Vec<NewSaleLine>,
}

/// Input for one line of a new sale. Prices are taken as declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub liquor_id: i64,
    pub quantity: i64,
    #[serde(rename = "unit_price")]
    pub unit_price_cents: i64,
    #[serde(rename = "subtotal")]
    pub subtotal_cents: i64,
}

impl NewSale {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_customer_name(&self.customer_name)?;
        if let Some(customer_id) = &self.customer_id {
            validation::validate_customer_id(customer_id)?;
        }
        validation::validate_payment_method(&self.payment_method)?;
        validation::validate_amount_cents("total", self.total_cents)?;
        validation::validate_sale_line_count(self.sale_lines.len())?;
        for line in &self.sale_lines {
            line.validate()?;
        }
        Ok(())
    }

    #[inline]
    pub fn declared_total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of the declared line subtotals.
    pub fn lines_total(&self) -> Money {
        self.sale_lines
            .iter()
            .map(NewSaleLine::subtotal)
            .sum()
    }
}

impl NewSaleLine {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_quantity(self.quantity)?;
        validation::validate_amount_cents("unit_price", self.unit_price_cents)?;
        validation::validate_amount_cents("subtotal", self.subtotal_cents)?;
        Ok(())
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Unit price times quantity; what the declared subtotal should be.
    #[inline]
    pub fn expected_subtotal(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// What to do when a decrement would take stock below zero.
///
/// ## Behaviour
/// ```text
/// stock = 2, decrement 5
///
///   AllowNegative   ──► stock = -3, is_available = false
///   RejectOversell  ──► InsufficientStock, nothing written
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockPolicy {
    /// Overselling is recorded and reconciled later.
    #[default]
    AllowNegative,
    /// A decrement below zero fails the whole unit of work.
    RejectOversell,
}

impl StockPolicy {
    pub const fn from_allow_oversell(allow: bool) -> Self {
        if allow {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::RejectOversell
        }
    }

    /// Checks removing `quantity` units from a product holding `available`.
    pub fn check_decrement(&self, product_id: i64, available: i64, quantity: i64) -> CoreResult<()> {
        let oversold = available.checked_sub(quantity).map_or(true, |left| left < 0);

        match self {
            StockPolicy::RejectOversell if oversold => Err(CoreError::InsufficientStock {
                product_id,
                available,
                requested: quantity,
            }),
            _ => Ok(()),
        }
    }

    /// Checks a signed adjustment and returns the resulting stock.
    ///
    /// The delta is bounded by [`MAX_STOCK_ADJUSTMENT`](crate::MAX_STOCK_ADJUSTMENT)
    /// and the result by [`MAX_STOCK`] in either direction; increments
    /// always pass the policy.
    pub fn check_adjustment(&self, product_id: i64, available: i64, delta: i64) -> CoreResult<i64> {
        validation::validate_stock_adjustment(delta)?;

        let resulting = available
            .checked_add(delta)
            .filter(|stock| (-MAX_STOCK..=MAX_STOCK).contains(stock))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: -MAX_STOCK,
                max: MAX_STOCK,
            })?;

        if delta < 0 {
            self.check_decrement(product_id, available, -delta)?;
        }
        Ok(resulting)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset pagination for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    /// Builds a page from optional query values, applying defaults.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> ValidationResult<Self> {
        let page = Pagination {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        };
        validation::validate_pagination(page.skip, page.limit)?;
        Ok(page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
