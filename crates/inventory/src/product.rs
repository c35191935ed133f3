use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{CategoryId, DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Stock-keeping unit: the business key of a product.
///
/// Non-empty, unique across the store, immutable once assigned. The read
/// store keys its documents by sku, so sku immutability is what makes the
/// projector's upsert idempotent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Sku {}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit price in minor currency units (e.g. cents).
///
/// Fixed-point by construction: an unsigned integer count of minor units, so
/// the non-negativity invariant holds at the type level. The read projection
/// carries the floating-decimal rendering via [`UnitPrice::as_major_units`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitPrice(u64);

impl UnitPrice {
    pub fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Floating-decimal value in major units (e.g. 1999 minor units → 19.99).
    pub fn as_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl ValueObject for UnitPrice {}

/// Fields required to create a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub unit_price: UnitPrice,
    pub initial_stock: i64,
    pub min_stock_level: i64,
    pub supplier: String,
}

/// Administrative edit of a product's mutable fields.
///
/// The sku and `created_at` are immutable; stock moves only through the
/// ledger (`apply_stock_change`), never through an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<UnitPrice>,
    pub min_stock_level: Option<i64>,
    pub supplier: Option<String>,
}

/// Product in the authoritative write model.
///
/// The read-store copy is a derived, disposable projection keyed by sku;
/// this struct is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: Sku,
    name: String,
    description: String,
    category_id: CategoryId,
    unit_price: UnitPrice,
    stock_quantity: i64,
    min_stock_level: i64,
    supplier: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(fields: NewProduct) -> DomainResult<Self> {
        if fields.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if fields.initial_stock < 0 {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }
        if fields.min_stock_level < 0 {
            return Err(DomainError::validation("minimum stock level cannot be negative"));
        }

        let now = Utc::now();
        Ok(Self {
            id: ProductId::new(),
            sku: fields.sku,
            name: fields.name,
            description: fields.description,
            category_id: fields.category_id,
            unit_price: fields.unit_price,
            stock_quantity: fields.initial_stock,
            min_stock_level: fields.min_stock_level,
            supplier: fields.supplier,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn min_stock_level(&self) -> i64 {
        self.min_stock_level
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the stock level has fallen below the configured minimum.
    pub fn is_below_min_stock(&self) -> bool {
        self.stock_quantity < self.min_stock_level
    }

    /// Record the stock value computed by a ledgered stock change.
    ///
    /// Called by the write store inside the same unit of work that appends
    /// the ledger entry; the pair must commit or fail together.
    pub fn record_stock(&mut self, new_stock: i64) {
        self.stock_quantity = new_stock;
        self.updated_at = Utc::now();
    }

    /// Apply an administrative edit, bumping `updated_at`.
    pub fn apply_update(&mut self, update: ProductUpdate) -> DomainResult<()> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty"));
            }
        }
        if let Some(min) = update.min_stock_level {
            if min < 0 {
                return Err(DomainError::validation("minimum stock level cannot be negative"));
            }
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(unit_price) = update.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(min) = update.min_stock_level {
            self.min_stock_level = min;
        }
        if let Some(supplier) = update.supplier {
            self.supplier = supplier;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(initial_stock: i64, min_stock_level: i64) -> NewProduct {
        NewProduct {
            sku: Sku::new("GS-001").unwrap(),
            name: "Guantes Nitrilo".to_string(),
            description: "Guantes de nitrilo talla M".to_string(),
            category_id: CategoryId::new(),
            unit_price: UnitPrice::from_minor_units(1250),
            initial_stock,
            min_stock_level,
            supplier: "Proveedora Andina".to_string(),
        }
    }

    #[test]
    fn sku_rejects_blank_values() {
        assert!(Sku::new("").is_err());
        assert!(Sku::new("   ").is_err());
        assert!(Sku::new("GS-001").is_ok());
    }

    #[test]
    fn unit_price_converts_to_major_units() {
        assert_eq!(UnitPrice::from_minor_units(1999).as_major_units(), 19.99);
        assert_eq!(UnitPrice::from_minor_units(0).as_major_units(), 0.0);
    }

    #[test]
    fn new_product_sets_equal_created_and_updated_timestamps() {
        let product = Product::new(new_product(100, 10)).unwrap();
        assert_eq!(product.created_at(), product.updated_at());
        assert_eq!(product.stock_quantity(), 100);
    }

    #[test]
    fn new_product_rejects_negative_stock_and_min_level() {
        assert!(matches!(
            Product::new(new_product(-1, 10)).unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            Product::new(new_product(0, -5)).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn new_product_rejects_blank_name() {
        let mut fields = new_product(10, 5);
        fields.name = "  ".to_string();
        assert!(matches!(
            Product::new(fields).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn below_min_stock_is_a_strict_comparison() {
        let mut product = Product::new(new_product(10, 10)).unwrap();
        assert!(!product.is_below_min_stock());
        product.record_stock(9);
        assert!(product.is_below_min_stock());
    }

    #[test]
    fn record_stock_bumps_updated_at() {
        let mut product = Product::new(new_product(100, 10)).unwrap();
        let before = product.updated_at();
        product.record_stock(70);
        assert_eq!(product.stock_quantity(), 70);
        assert!(product.updated_at() >= before);
    }

    #[test]
    fn apply_update_edits_mutable_fields_only() {
        let mut product = Product::new(new_product(100, 10)).unwrap();
        let sku_before = product.sku().clone();
        let created_before = product.created_at();

        product
            .apply_update(ProductUpdate {
                name: Some("Guantes Nitrilo XL".to_string()),
                unit_price: Some(UnitPrice::from_minor_units(1500)),
                min_stock_level: Some(20),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.name(), "Guantes Nitrilo XL");
        assert_eq!(product.unit_price().minor_units(), 1500);
        assert_eq!(product.min_stock_level(), 20);
        assert_eq!(product.sku(), &sku_before);
        assert_eq!(product.created_at(), created_before);
        assert_eq!(product.stock_quantity(), 100);
    }

    #[test]
    fn apply_update_rejects_blank_name_without_partial_write() {
        let mut product = Product::new(new_product(100, 10)).unwrap();
        let err = product
            .apply_update(ProductUpdate {
                name: Some(" ".to_string()),
                supplier: Some("Nuevo Proveedor".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(product.supplier(), "Proveedora Andina");
    }
}
