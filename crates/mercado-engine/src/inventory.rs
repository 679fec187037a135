//! # Inventory Accountant
//!
//! Availability reads, manual adjustments, deductions and the atomic
//! checkout commit.
//!
//! ## Floor Clamp
//! Quantity on hand never goes below zero. When an adjustment or deduction
//! would push it negative, the result is clamped and the event is counted
//! in [`InventoryDiagnostics`] and logged at `warn`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mercado_core::error::CoreError;
use mercado_core::inventory::{check_availability, Availability, ClampOutcome, StockDemand};
use mercado_core::types::InventoryRecord;
use mercado_core::validation::validate_sku;
use mercado_core::ValidationError;

use crate::error::CommerceResult;
use crate::ports::{CommitOutcome, InventoryRepository};

// =============================================================================
// Diagnostics
// =============================================================================

/// Counts floor-clamp events so over-deduction does not go unnoticed.
#[derive(Debug, Default)]
pub struct InventoryDiagnostics {
    clamp_events: AtomicU64,
    clamped_units: AtomicU64,
}

/// Point-in-time copy of [`InventoryDiagnostics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClampStats {
    pub clamp_events: u64,
    pub clamped_units: u64,
}

impl InventoryDiagnostics {
    fn record(&self, outcome: &ClampOutcome) {
        if outcome.was_clamped() {
            self.clamp_events.fetch_add(1, Ordering::Relaxed);
            self.clamped_units
                .fetch_add(outcome.clamped_units.unsigned_abs(), Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ClampStats {
        ClampStats {
            clamp_events: self.clamp_events.load(Ordering::Relaxed),
            clamped_units: self.clamped_units.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Manual stock correction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustInventory {
    pub sku: String,
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
    diagnostics: Arc<InventoryDiagnostics>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        InventoryService {
            repo,
            diagnostics: Arc::new(InventoryDiagnostics::default()),
        }
    }

    pub fn diagnostics(&self) -> ClampStats {
        self.diagnostics.snapshot()
    }

    /// Availability of a SKU. A SKU with no record is all zeros.
    pub async fn get_availability(&self, sku: &str, tenant_id: &str) -> CommerceResult<Availability> {
        let availability = match self.repo.find(sku, tenant_id).await? {
            Some(record) => record.availability(),
            None => Availability::none(sku),
        };
        debug!(sku = %sku, tenant_id = %tenant_id, available = availability.available, "Availability read");
        Ok(availability)
    }

    /// Applies a manual correction, creating the record if absent.
    pub async fn adjust(&self, input: AdjustInventory, tenant_id: &str) -> CommerceResult<InventoryRecord> {
        validate_sku(&input.sku)?;
        let record = self.apply(&input.sku, tenant_id, input.delta).await?;
        info!(
            sku = %input.sku,
            tenant_id = %tenant_id,
            delta = input.delta,
            reason = input.reason.as_deref().unwrap_or(""),
            quantity_on_hand = record.quantity_on_hand,
            "Inventory adjusted"
        );
        Ok(record)
    }

    /// Removes `qty` units, clamping at zero.
    pub async fn deduct(&self, sku: &str, tenant_id: &str, qty: i64) -> CommerceResult<InventoryRecord> {
        if qty <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        self.apply(sku, tenant_id, -qty).await
    }

    async fn apply(&self, sku: &str, tenant_id: &str, delta: i64) -> CommerceResult<InventoryRecord> {
        let (record, outcome) = self.repo.apply_delta(sku, tenant_id, delta).await?;
        if outcome.was_clamped() {
            self.diagnostics.record(&outcome);
            warn!(
                sku = %sku,
                tenant_id = %tenant_id,
                delta,
                clamped_units = outcome.clamped_units,
                "Stock clamped at zero"
            );
        }
        Ok(record)
    }

    // =========================================================================
    // Checkout Support
    // =========================================================================

    /// Read-only check that every demand is currently covered.
    pub async fn check(&self, demands: &[StockDemand], tenant_id: &str) -> CommerceResult<()> {
        for demand in demands {
            let availability = self.get_availability(&demand.sku, tenant_id).await?;
            check_availability(true, &availability, demand.quantity)?;
        }
        Ok(())
    }

    /// Deducts every demand in one atomic step, or nothing at all.
    pub async fn commit(&self, demands: &[StockDemand], tenant_id: &str) -> CommerceResult<()> {
        if demands.is_empty() {
            return Ok(());
        }
        match self.repo.commit_demands(tenant_id, demands).await? {
            CommitOutcome::Committed => {
                debug!(tenant_id = %tenant_id, skus = demands.len(), "Stock committed");
                Ok(())
            }
            CommitOutcome::Shortfall {
                sku,
                available,
                requested,
            } => Err(CoreError::InsufficientStock {
                sku,
                available,
                requested,
            }
            .into()),
        }
    }

    /// Puts committed demands back. Used when an order cannot be recorded
    /// after its stock was taken.
    pub async fn restock(&self, demands: &[StockDemand], tenant_id: &str) -> CommerceResult<()> {
        for demand in demands {
            self.repo
                .apply_delta(&demand.sku, tenant_id, demand.quantity)
                .await?;
        }
        warn!(tenant_id = %tenant_id, skus = demands.len(), "Committed stock returned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_only_count_clamps() {
        let diagnostics = InventoryDiagnostics::default();
        diagnostics.record(&ClampOutcome {
            quantity_on_hand: 4,
            clamped_units: 0,
        });
        diagnostics.record(&ClampOutcome {
            quantity_on_hand: 0,
            clamped_units: 3,
        });
        diagnostics.record(&ClampOutcome {
            quantity_on_hand: 0,
            clamped_units: 2,
        });

        assert_eq!(
            diagnostics.snapshot(),
            ClampStats {
                clamp_events: 2,
                clamped_units: 5
            }
        );
    }
}
