//! In-flight backend request tracking (drives the global spinner)
//!
//! Every outgoing backend call holds an [`ActivityGuard`] for its duration.
//! The counter is published on the bus whenever it changes so open pages can
//! show or hide the spinner.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::backend::{Backend, BackendResult};
use crate::bus::{BusEvent, SharedBus};
use crate::domain::{
    AnalyticsQuery, AnalyticsReport, DeliveryStatus, DeliveryUpdate, NewOrder, NewPriceList,
    NewUser, Order, OrderQuery, PriceList, PriceListItem, Product, ProductionUpdate, Role,
    Session, User,
};

#[derive(Clone)]
pub struct ActivityTracker {
    in_flight: Arc<AtomicUsize>,
    bus: SharedBus,
}

impl ActivityTracker {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            bus,
        }
    }

    /// Number of backend requests currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Mark a request as started; it ends when the guard drops
    pub fn start(&self) -> ActivityGuard {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        trace!("Backend activity: {} in flight", now);
        self.bus.publish(BusEvent::ActivityChanged { in_flight: now });
        ActivityGuard {
            tracker: self.clone(),
        }
    }

    fn finish(&self) {
        // Never wraps below zero, even if guards are mismatched
        let previous = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            })
            .unwrap_or(0);
        let now = previous.saturating_sub(1);
        trace!("Backend activity: {} in flight", now);
        self.bus.publish(BusEvent::ActivityChanged { in_flight: now });
    }
}

/// Decrements the counter on drop (early return, error, cancellation)
#[must_use = "activity ends as soon as the guard is dropped"]
pub struct ActivityGuard {
    tracker: ActivityTracker,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}

/// Backend wrapper that counts every call as activity
pub struct TrackedBackend<B> {
    inner: B,
    activity: ActivityTracker,
}

impl<B: Backend> TrackedBackend<B> {
    pub fn new(inner: B, activity: ActivityTracker) -> Self {
        Self { inner, activity }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: Backend> Backend for TrackedBackend<B> {
    async fn login(&self, email: &str, password: &str) -> BackendResult<Session> {
        let _busy = self.activity.start();
        self.inner.login(email, password).await
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        let _busy = self.activity.start();
        self.inner.current_user(token).await
    }

    async fn list_orders(&self, token: &str, query: &OrderQuery) -> BackendResult<Vec<Order>> {
        let _busy = self.activity.start();
        self.inner.list_orders(token, query).await
    }

    async fn get_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner.get_order(token, order_id).await
    }

    async fn create_order(&self, token: &str, order: &NewOrder) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner.create_order(token, order).await
    }

    async fn cancel_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner.cancel_order(token, order_id).await
    }

    async fn update_item_production(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        update: &ProductionUpdate,
    ) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner
            .update_item_production(token, order_id, item_id, update)
            .await
    }

    async fn update_item_delivery(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        status: DeliveryStatus,
    ) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner
            .update_item_delivery(token, order_id, item_id, status)
            .await
    }

    async fn update_order_delivery(
        &self,
        token: &str,
        order_id: &str,
        update: &DeliveryUpdate,
    ) -> BackendResult<Order> {
        let _busy = self.activity.start();
        self.inner.update_order_delivery(token, order_id, update).await
    }

    async fn list_products(&self, token: &str) -> BackendResult<Vec<Product>> {
        let _busy = self.activity.start();
        self.inner.list_products(token).await
    }

    async fn set_product_active(
        &self,
        token: &str,
        product_id: &str,
        active: bool,
    ) -> BackendResult<Product> {
        let _busy = self.activity.start();
        self.inner.set_product_active(token, product_id, active).await
    }

    async fn list_price_lists(&self, token: &str) -> BackendResult<Vec<PriceList>> {
        let _busy = self.activity.start();
        self.inner.list_price_lists(token).await
    }

    async fn get_price_list(&self, token: &str, price_list_id: &str) -> BackendResult<PriceList> {
        let _busy = self.activity.start();
        self.inner.get_price_list(token, price_list_id).await
    }

    async fn create_price_list(
        &self,
        token: &str,
        list: &NewPriceList,
    ) -> BackendResult<PriceList> {
        let _busy = self.activity.start();
        self.inner.create_price_list(token, list).await
    }

    async fn upsert_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        item: &PriceListItem,
    ) -> BackendResult<PriceList> {
        let _busy = self.activity.start();
        self.inner
            .upsert_price_list_item(token, price_list_id, item)
            .await
    }

    async fn remove_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        option_item_id: &str,
    ) -> BackendResult<PriceList> {
        let _busy = self.activity.start();
        self.inner
            .remove_price_list_item(token, price_list_id, option_item_id)
            .await
    }

    async fn assign_price_list(
        &self,
        token: &str,
        price_list_id: &str,
        user_id: &str,
    ) -> BackendResult<PriceList> {
        let _busy = self.activity.start();
        self.inner
            .assign_price_list(token, price_list_id, user_id)
            .await
    }

    async fn list_users(&self, token: &str, role: Option<Role>) -> BackendResult<Vec<User>> {
        let _busy = self.activity.start();
        self.inner.list_users(token, role).await
    }

    async fn create_user(&self, token: &str, user: &NewUser) -> BackendResult<User> {
        let _busy = self.activity.start();
        self.inner.create_user(token, user).await
    }

    async fn set_user_active(
        &self,
        token: &str,
        user_id: &str,
        active: bool,
    ) -> BackendResult<User> {
        let _busy = self.activity.start();
        self.inner.set_user_active(token, user_id, active).await
    }

    async fn analytics(
        &self,
        token: &str,
        query: &AnalyticsQuery,
    ) -> BackendResult<AnalyticsReport> {
        let _busy = self.activity.start();
        self.inner.analytics(token, query).await
    }
}
