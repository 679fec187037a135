//! # Checkout Orchestrator
//!
//! Turns a cart into a paid order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. load cart ────────────────────────────── empty → CART_EMPTY        │
//! │  2. plan: resolve every line once ────────── PRODUCT_NOT_FOUND         │
//! │           tracked demands, merged per SKU                               │
//! │  3. validate: read availability ─────────── INSUFFICIENT_STOCK         │
//! │  4. commit: check-and-deduct all SKUs atomically                        │
//! │           (a concurrent checkout that drained stock since step 3       │
//! │            fails here with INSUFFICIENT_STOCK, nothing deducted)        │
//! │  5. insert order (PAID / PAID, lines frozen from the cart)              │
//! │           insert failed → stock from step 4 is returned                 │
//! │  6. clear cart                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use mercado_core::error::CoreError;
use mercado_core::inventory::{aggregate_demands, StockDemand};
use mercado_core::policy::{assert_admin, require_user, UserContext};
use mercado_core::types::{Order, OrderStatus, PaymentStatus};
use mercado_core::Cart;

use crate::catalog::CatalogService;
use crate::error::CommerceResult;
use crate::inventory::InventoryService;
use crate::ports::{CartRepository, OrderRepository};

/// Status patch applied by order-management collaborators.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPatch {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Clone)]
pub struct CheckoutService {
    catalog: CatalogService,
    inventory: InventoryService,
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl CheckoutService {
    pub fn new(
        catalog: CatalogService,
        inventory: InventoryService,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        CheckoutService {
            catalog,
            inventory,
            carts,
            orders,
        }
    }

    /// Settles the user's cart into a paid order.
    pub async fn checkout_cart(&self, user_id: &str, tenant_id: &str) -> CommerceResult<Order> {
        let mut cart = match self.carts.find(user_id, tenant_id).await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => return Err(CoreError::CartEmpty.into()),
        };

        let demands = self.plan(&cart, tenant_id).await?;
        self.inventory.check(&demands, tenant_id).await?;
        self.inventory.commit(&demands, tenant_id).await?;

        let order = Order::settle(&cart);
        if let Err(err) = self.orders.insert(&order).await {
            error!(
                order_id = %order.id,
                tenant_id = %tenant_id,
                error = %err,
                "Order insert failed after stock commit; returning stock"
            );
            self.inventory.restock(&demands, tenant_id).await?;
            return Err(err.into());
        }

        cart.clear();
        if let Err(err) = self.carts.save(&cart).await {
            // Order is already recorded and stays valid.
            error!(
                order_id = %order.id,
                user_id = %user_id,
                error = %err,
                "Cart could not be cleared after checkout"
            );
        }

        info!(
            order_id = %order.id,
            user_id = %user_id,
            tenant_id = %tenant_id,
            lines = order.items.len(),
            total = %order.total(),
            "Checkout completed"
        );
        Ok(order)
    }

    /// Resolves every line once and merges the tracked demands per SKU.
    async fn plan(&self, cart: &Cart, tenant_id: &str) -> CommerceResult<Vec<StockDemand>> {
        let mut demands = Vec::new();
        for line in &cart.items {
            let resolved = self.catalog.resolve_variant(&line.sku, tenant_id).await?;
            demands.extend(
                self.catalog
                    .stock_demands(&resolved, line.qty, tenant_id)
                    .await?,
            );
        }
        Ok(aggregate_demands(demands))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// An order visible to its buyer and to admins.
    pub async fn get_order(
        &self,
        order_id: &str,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Order> {
        let user = require_user(user)?;
        let order = self
            .orders
            .find_by_id(order_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        if order.user_id != user.id && !user.is_admin() {
            return Err(CoreError::forbidden(format!("view order {order_id}")).into());
        }
        Ok(order)
    }

    pub async fn list_orders(&self, user_id: &str, tenant_id: &str) -> CommerceResult<Vec<Order>> {
        Ok(self.orders.list_by_user(user_id, tenant_id).await?)
    }

    /// Patches status fields of an order. Items never change. Admin only.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        patch: OrderStatusPatch,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Order> {
        assert_admin(user, "update order status")?;
        let mut order = self
            .orders
            .find_by_id(order_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        self.orders.update_status(&order).await?;

        info!(
            order_id = %order.id,
            status = ?order.status,
            payment_status = ?order.payment_status,
            "Order status updated"
        );
        Ok(order)
    }
}
