use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, LedgerEntryId, ProductId};

/// Kind of stock mutation recorded in the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Goods received; stock increases.
    In,
    /// Goods shipped; stock decreases, clamped at zero.
    Out,
    /// Manual correction; signed delta, unclamped.
    Adj,
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
            TransactionType::Adj => "ADJ",
        })
    }
}

/// A requested stock mutation, before it is applied and ledgered.
///
/// The arithmetic per type:
/// - `Inbound`:    `new = previous + quantity`, quantity strictly positive
/// - `Outbound`:   `new = max(0, previous - quantity)`, quantity strictly positive
/// - `Adjustment`: `new = previous + delta`, delta signed and non-zero
///
/// Outbound clamps at zero; adjustments do not and may drive stock negative.
/// The asymmetry is deliberate and preserved: an adjustment records whatever
/// a physical count or correction says, even when that exposes more outflow
/// than the ledger had captured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum StockChange {
    In { quantity: i64 },
    Out { quantity: i64 },
    Adj { delta: i64 },
}

impl StockChange {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            StockChange::In { .. } => TransactionType::In,
            StockChange::Out { .. } => TransactionType::Out,
            StockChange::Adj { .. } => TransactionType::Adj,
        }
    }

    /// Reject malformed requests before any store mutation.
    pub fn validate(&self) -> DomainResult<()> {
        match *self {
            StockChange::In { quantity } | StockChange::Out { quantity } => {
                if quantity <= 0 {
                    return Err(DomainError::validation(
                        "quantity must be strictly positive",
                    ));
                }
            }
            StockChange::Adj { delta } => {
                if delta == 0 {
                    return Err(DomainError::validation("adjustment delta cannot be zero"));
                }
            }
        }
        Ok(())
    }

    /// Compute the resulting stock level from `previous`.
    pub fn apply_to(&self, previous: i64) -> i64 {
        match *self {
            StockChange::In { quantity } => previous + quantity,
            StockChange::Out { quantity } => (previous - quantity).max(0),
            StockChange::Adj { delta } => previous + delta,
        }
    }

    /// The value recorded in the ledger's `quantity` column: the positive
    /// magnitude for in/out, the signed delta for adjustments.
    pub fn recorded_quantity(&self) -> i64 {
        match *self {
            StockChange::In { quantity } | StockChange::Out { quantity } => quantity,
            StockChange::Adj { delta } => delta,
        }
    }
}

/// One row of the append-only audit ledger.
///
/// Never updated or deleted after creation; the referenced product cannot be
/// deleted while entries exist. `new_stock` is derived from `previous_stock`
/// by the [`StockChange`] arithmetic at construction, so the ledger invariant
/// holds for every row by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub product_id: ProductId,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build the ledger row for applying `change` on top of `previous_stock`.
    pub fn record(
        product_id: ProductId,
        change: &StockChange,
        previous_stock: i64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            product_id,
            transaction_type: change.transaction_type(),
            quantity: change.recorded_quantity(),
            previous_stock,
            new_stock: change.apply_to(previous_stock),
            notes: notes.into(),
            created_at: Utc::now(),
        }
    }
}
