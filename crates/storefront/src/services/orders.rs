//! Checkout, order history, cancellation and payment confirmation.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use maison_core::coupon::CouponCode;
use maison_core::signature::verify_payment_signature;
use maison_core::{AddressId, OrderId, UserId};

use crate::cache::ShopCache;
use crate::db::orders::NewOrder;
use crate::db::{AddressRepository, CartRepository, CouponRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::order::{ensure_pending, generate_reference, plan_checkout};
use crate::models::{AddressSnapshot, CartItem, Order};

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub address_id: AddressId,
    pub coupon_code: Option<String>,
}

/// Body of `POST /api/orders/{id}/payment`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: String,
    pub signature: String,
}

pub struct OrderService<'a> {
    pool: &'a PgPool,
    cache: &'a ShopCache,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ShopCache) -> Self {
        Self {
            pool,
            cache,
            orders: OrderRepository::new(pool),
        }
    }

    /// Turn the active cart lines into a pending order.
    ///
    /// The cart is read from the database rather than the cache so totals
    /// are computed from committed rows.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown address or coupon; `BAD_REQUEST` for an
    /// empty cart, unavailable product or inapplicable coupon; `CONFLICT`
    /// if the coupon ran out or the cart changed concurrently.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Order> {
        let user_id = request.user_id;
        let address = AddressRepository::new(self.pool)
            .get(user_id, request.address_id)
            .await?
            .ok_or_else(|| AppError::NotFound("address not found".to_string()))?;

        let cart = CartRepository::new(self.pool).load(user_id).await?;
        let items: Vec<CartItem> = cart.active_items().cloned().collect();

        let coupon = match request.coupon_code.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let code =
                    CouponCode::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?;
                let stored = CouponRepository::new(self.pool)
                    .get_by_code(&code)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("coupon '{code}' not found")))?;
                Some(stored)
            }
        };

        let now = Utc::now();
        let totals = plan_checkout(&items, coupon.as_ref().map(|c| &c.rules), now)?;
        let reference = generate_reference(now);
        let shipping_address = AddressSnapshot::from(&address);

        let order_id = self
            .orders
            .create_from_cart(&NewOrder {
                user_id,
                reference: &reference,
                shipping_address: &shipping_address,
                totals,
                coupon_id: coupon.as_ref().map(|c| c.id),
                items: &items,
            })
            .await?;
        self.cache.invalidate_cart(user_id).await;

        info!(%order_id, %reference, total = %totals.total, "Order placed");
        self.get(user_id, order_id).await
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// One of the user's orders.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if it does not exist or belongs to someone else.
    pub async fn get(&self, user_id: UserId, id: OrderId) -> Result<Order> {
        self.orders
            .get(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown order; `CONFLICT` once payment left
    /// `pending`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: UserId, id: OrderId) -> Result<Order> {
        let order = self.get(user_id, id).await?;
        ensure_pending(order.payment_status)?;
        self.orders.cancel(user_id, id).await?;
        info!(reference = %order.reference, "Order cancelled by shopper");
        self.get(user_id, id).await
    }

    /// Record a gateway payment after checking its signature.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown order; `BAD_REQUEST` for a bad signature;
    /// `CONFLICT` if the order is no longer pending.
    #[instrument(skip(self, confirmation, gateway_secret), fields(payment_id = %confirmation.payment_id))]
    pub async fn confirm_payment(
        &self,
        user_id: UserId,
        id: OrderId,
        confirmation: &PaymentConfirmation,
        gateway_secret: &SecretString,
    ) -> Result<Order> {
        let order = self.get(user_id, id).await?;
        let valid = verify_payment_signature(
            gateway_secret.expose_secret().as_bytes(),
            &order.reference,
            &confirmation.payment_id,
            &confirmation.signature,
        );
        if !valid {
            warn!(reference = %order.reference, "Payment signature mismatch");
            return Err(AppError::BadRequest("invalid payment signature".to_string()));
        }
        ensure_pending(order.payment_status)?;

        self.orders
            .confirm_payment(user_id, id, &confirmation.payment_id)
            .await?;
        info!(reference = %order.reference, "Payment confirmed");
        self.get(user_id, id).await
    }
}
