//! REST client for the catering backend.
//!
//! Thin wrapper over reqwest: one method per endpoint, bearer token auth,
//! JSON in and out. Error bodies (`{"message": ...}` or `{"error": ...}`)
//! are passed through verbatim.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{Backend, BackendError, BackendResult};
use crate::domain::{
    AnalyticsQuery, AnalyticsReport, DeliveryStatus, DeliveryUpdate, NewOrder, NewPriceList,
    NewUser, Order, OrderQuery, PriceList, PriceListItem, Product, ProductionUpdate, Role,
    Session, User,
};

/// Default request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveRequest {
    active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryItemRequest {
    status: DeliveryStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest<'a> {
    user_id: &'a str,
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// `base_url` is the API root, e.g. `https://api.example.com/v1/`
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catering-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Transport(format!("invalid URL {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> BackendResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BackendResult<T> {
        self.send_with(builder, error_for_status).await
    }

    /// `to_error` maps a failed status and the body's message, if any
    async fn send_with<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        to_error: fn(StatusCode, Option<String>) -> BackendError,
    ) -> BackendResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| BackendError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty());
        warn!(
            "Backend returned {}: {}",
            status,
            message.as_deref().unwrap_or("(no message)")
        );
        Err(to_error(status, message))
    }
}

fn error_for_status(status: StatusCode, message: Option<String>) -> BackendError {
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::FORBIDDEN => BackendError::Forbidden(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT => BackendError::InvalidTransition(message),
        _ => BackendError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

/// A 401 on login is a credential check, not an expired session: keep the
/// backend's wording for the sign-in form
fn login_error(status: StatusCode, message: Option<String>) -> BackendError {
    match (status, message) {
        (StatusCode::UNAUTHORIZED, Some(message)) => BackendError::Rejected {
            status: 401,
            message,
        },
        (status, message) => error_for_status(status, message),
    }
}

fn seg(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> BackendResult<Session> {
        let req = self
            .request(Method::POST, "auth/login", None)?
            .json(&LoginRequest { email, password });
        self.send_with(req, login_error).await
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        let req = self.request(Method::GET, "auth/me", Some(token))?;
        self.send(req).await
    }

    async fn list_orders(&self, token: &str, query: &OrderQuery) -> BackendResult<Vec<Order>> {
        let req = self.request(Method::GET, "orders", Some(token))?.query(query);
        self.send(req).await
    }

    async fn get_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let path = format!("orders/{}", seg(order_id));
        let req = self.request(Method::GET, &path, Some(token))?;
        self.send(req).await
    }

    async fn create_order(&self, token: &str, order: &NewOrder) -> BackendResult<Order> {
        let req = self.request(Method::POST, "orders", Some(token))?.json(order);
        self.send(req).await
    }

    async fn cancel_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let path = format!("orders/{}/cancel", seg(order_id));
        let req = self.request(Method::POST, &path, Some(token))?;
        self.send(req).await
    }

    async fn update_item_production(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        update: &ProductionUpdate,
    ) -> BackendResult<Order> {
        let path = format!("orders/{}/items/{}/production", seg(order_id), seg(item_id));
        let req = self.request(Method::PATCH, &path, Some(token))?.json(update);
        self.send(req).await
    }

    async fn update_item_delivery(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        status: DeliveryStatus,
    ) -> BackendResult<Order> {
        let path = format!("orders/{}/items/{}/delivery", seg(order_id), seg(item_id));
        let req = self
            .request(Method::PATCH, &path, Some(token))?
            .json(&DeliveryItemRequest { status });
        self.send(req).await
    }

    async fn update_order_delivery(
        &self,
        token: &str,
        order_id: &str,
        update: &DeliveryUpdate,
    ) -> BackendResult<Order> {
        let path = format!("orders/{}/delivery", seg(order_id));
        let req = self.request(Method::PATCH, &path, Some(token))?.json(update);
        self.send(req).await
    }

    async fn list_products(&self, token: &str) -> BackendResult<Vec<Product>> {
        let req = self.request(Method::GET, "products", Some(token))?;
        self.send(req).await
    }

    async fn set_product_active(
        &self,
        token: &str,
        product_id: &str,
        active: bool,
    ) -> BackendResult<Product> {
        let path = format!("products/{}", seg(product_id));
        let req = self
            .request(Method::PATCH, &path, Some(token))?
            .json(&ActiveRequest { active });
        self.send(req).await
    }

    async fn list_price_lists(&self, token: &str) -> BackendResult<Vec<PriceList>> {
        let req = self.request(Method::GET, "price-lists", Some(token))?;
        self.send(req).await
    }

    async fn get_price_list(&self, token: &str, price_list_id: &str) -> BackendResult<PriceList> {
        let path = format!("price-lists/{}", seg(price_list_id));
        let req = self.request(Method::GET, &path, Some(token))?;
        self.send(req).await
    }

    async fn create_price_list(
        &self,
        token: &str,
        list: &NewPriceList,
    ) -> BackendResult<PriceList> {
        let req = self.request(Method::POST, "price-lists", Some(token))?.json(list);
        self.send(req).await
    }

    async fn upsert_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        item: &PriceListItem,
    ) -> BackendResult<PriceList> {
        let path = format!(
            "price-lists/{}/items/{}",
            seg(price_list_id),
            seg(&item.option_item_id)
        );
        let req = self.request(Method::PUT, &path, Some(token))?.json(item);
        self.send(req).await
    }

    async fn remove_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        option_item_id: &str,
    ) -> BackendResult<PriceList> {
        let path = format!(
            "price-lists/{}/items/{}",
            seg(price_list_id),
            seg(option_item_id)
        );
        let req = self.request(Method::DELETE, &path, Some(token))?;
        self.send(req).await
    }

    async fn assign_price_list(
        &self,
        token: &str,
        price_list_id: &str,
        user_id: &str,
    ) -> BackendResult<PriceList> {
        let path = format!("price-lists/{}/assign", seg(price_list_id));
        let req = self
            .request(Method::POST, &path, Some(token))?
            .json(&AssignRequest { user_id });
        self.send(req).await
    }

    async fn list_users(&self, token: &str, role: Option<Role>) -> BackendResult<Vec<User>> {
        let mut req = self.request(Method::GET, "users", Some(token))?;
        if let Some(role) = role {
            req = req.query(&[("role", role.as_str())]);
        }
        self.send(req).await
    }

    async fn create_user(&self, token: &str, user: &NewUser) -> BackendResult<User> {
        let req = self.request(Method::POST, "users", Some(token))?.json(user);
        self.send(req).await
    }

    async fn set_user_active(
        &self,
        token: &str,
        user_id: &str,
        active: bool,
    ) -> BackendResult<User> {
        let path = format!("users/{}", seg(user_id));
        let req = self
            .request(Method::PATCH, &path, Some(token))?
            .json(&ActiveRequest { active });
        self.send(req).await
    }

    async fn analytics(
        &self,
        token: &str,
        query: &AnalyticsQuery,
    ) -> BackendResult<AnalyticsReport> {
        let req = self.request(Method::GET, "analytics", Some(token))?.query(query);
        self.send(req).await
    }
}
