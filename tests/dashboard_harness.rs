//! Dashboard Test Harness
//!
//! Drives the full router against the demo backend the way a browser and a
//! script would: form logins, role dashboards, form actions with redirects
//! and the JSON API.
//!
//! Run with: cargo test --test dashboard_harness

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use catering_dashboard::api::AppState;
use catering_dashboard::backend::demo::DEMO_PASSWORD;
use catering_dashboard::backend::DemoBackend;
use catering_dashboard::bus::create_bus;
use catering_dashboard::domain::{DeliveryStatus, Order, ProductionStatus, Role};
use catering_dashboard::format::DisplayFormat;
use catering_dashboard::routes::build_router;

// =============================================================================
// Test utilities
// =============================================================================

async fn app() -> Router {
    let demo = DemoBackend::new();
    let accounts = demo.demo_accounts().await;
    let state = AppState::new(demo, create_bus(), DisplayFormat::default(), true)
        .with_demo_accounts(accounts);
    build_router(state)
}

fn email_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin@demo.local",
        Role::Chef => "hot@demo.local",
        Role::Driver => "driver@demo.local",
        Role::Distributor => "distributor@demo.local",
        Role::Client => "harbor@demo.local",
    }
}

fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign in through the login form and return the session cookie pair
async fn login(app: &Router, role: Role) -> String {
    login_as(app, email_for(role), role).await
}

async fn login_as(app: &Router, email: &str, role: Role) -> String {
    let body = format!(
        "email={}&password={}",
        urlencoding::encode(email),
        DEMO_PASSWORD
    );
    let response = app
        .clone()
        .oneshot(form_request("/login", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), role.home_path());
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    cookie.split(';').next().unwrap().to_string()
}

// =============================================================================
// Session
// =============================================================================

mod session {
    use super::*;

    #[tokio::test]
    async fn status_reports_demo_mode() {
        let app = app().await;
        let response = app.oneshot(get_request("/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let status: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(status["service"], "catering-dashboard");
        assert_eq!(status["demo"], true);
        assert!(!status["version"].as_str().unwrap().is_empty());
        let sha = status["git_sha"].as_str().unwrap();
        assert!(sha == "unknown" || sha.len() <= 7, "{sha}");
    }

    #[tokio::test]
    async fn anonymous_root_goes_to_login() {
        let app = app().await;
        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn login_page_lists_demo_accounts() {
        let app = app().await;
        let response = app.oneshot(get_request("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("hot@demo.local"));
    }

    #[tokio::test]
    async fn wrong_password_returns_to_login_with_error() {
        let app = app().await;
        let response = app
            .oneshot(form_request(
                "/login",
                None,
                "email=admin%40demo.local&password=wrong",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/login?error="), "{target}");
        assert!(target.contains("email=admin%40demo.local"));
    }

    #[tokio::test]
    async fn every_role_lands_on_its_dashboard() {
        let app = app().await;
        for role in Role::ALL {
            let cookie = login(&app, role).await;
            let response = app
                .clone()
                .oneshot(get_request(role.home_path(), Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{role}");
            let html = body_text(response).await;
            assert!(html.contains("data-live"), "{role}");
        }
    }

    #[tokio::test]
    async fn chef_cannot_open_admin_pages() {
        let app = app().await;
        let cookie = login(&app, Role::Chef).await;
        for path in ["/admin", "/users", "/price-lists", "/analytics"] {
            let response = app
                .clone()
                .oneshot(get_request(path, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
        }
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = app().await;
        let cookie = login(&app, Role::Driver).await;
        let response = app
            .oneshot(form_request("/logout", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}

// =============================================================================
// Form actions
// =============================================================================

mod actions {
    use super::*;

    /// Admin places an order for Harbor Bistro; returns its id
    async fn place_curry_order(app: &Router) -> String {
        let cookie = login(app, Role::Admin).await;
        let date = (Utc::now().date_naive() + Duration::days(3))
            .format("%Y-%m-%d")
            .to_string();
        let body = format!(
            "client_id=u-client-harbor&delivery_date={date}&line_0=p-curry&qty_0=2&line_1=&qty_1="
        );
        let response = app
            .clone()
            .oneshot(form_request("/orders", Some(&cookie), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/orders/"), "{target}");
        assert!(target.contains("level=success"), "{target}");
        target
            .trim_start_matches("/orders/")
            .split('?')
            .next()
            .unwrap()
            .to_string()
    }

    async fn fetch_order(app: &Router, cookie: &str, order_id: &str) -> Order {
        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/orders/{order_id}"), Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn chef_completes_item_then_repeat_is_a_toast() {
        let app = app().await;
        let order_id = place_curry_order(&app).await;
        let cookie = login(&app, Role::Chef).await;
        let order = fetch_order(&app, &cookie, &order_id).await;
        let item_id = order.items[0].id.clone();
        let uri = format!("/orders/{order_id}/items/{item_id}/production");

        let response = app
            .clone()
            .oneshot(form_request(
                &uri,
                Some(&cookie),
                "status=COMPLETED&return_to=%2Fchef",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/chef?notice="), "{target}");
        assert!(target.ends_with("level=success"), "{target}");

        let order = fetch_order(&app, &cookie, &order_id).await;
        assert_eq!(order.items[0].production_status, ProductionStatus::Completed);

        let response = app
            .clone()
            .oneshot(form_request(
                &uri,
                Some(&cookie),
                "status=COMPLETED&return_to=%2Fchef",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("level=error"));
    }

    #[tokio::test]
    async fn foreign_return_path_is_ignored() {
        let app = app().await;
        let order_id = place_curry_order(&app).await;
        let cookie = login(&app, Role::Admin).await;
        let response = app
            .oneshot(form_request(
                &format!("/orders/{order_id}/cancel"),
                Some(&cookie),
                "return_to=%2F%2Fevil.example",
            ))
            .await
            .unwrap();
        assert!(location(&response).starts_with("/admin?notice="));
    }

    #[tokio::test]
    async fn empty_order_form_is_rejected_before_backend() {
        let app = app().await;
        let cookie = login(&app, Role::Client).await;
        let response = app
            .oneshot(form_request(
                "/orders",
                Some(&cookie),
                "delivery_date=2030-01-01&line_0=&qty_0=",
            ))
            .await
            .unwrap();
        let target = location(&response);
        assert!(target.starts_with("/orders/new?notice=Add"), "{target}");
    }

    #[tokio::test]
    async fn actions_without_session_go_to_login() {
        let app = app().await;
        let response = app
            .oneshot(form_request("/orders/o-1/cancel", None, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    /// Chef cooks every item of the order so it is handed to dispatch
    async fn cook(app: &Router, order_id: &str) {
        let cookie = login(app, Role::Chef).await;
        let order = fetch_order(app, &cookie, order_id).await;
        for item in &order.items {
            let response = app
                .clone()
                .oneshot(form_request(
                    &format!("/orders/{order_id}/items/{}/production", item.id),
                    Some(&cookie),
                    "status=COMPLETED&return_to=%2Fchef",
                ))
                .await
                .unwrap();
            assert!(location(&response).ends_with("level=success"));
        }
    }

    async fn post_delivery(app: &Router, cookie: &str, order_id: &str, body: &str) -> String {
        let response = app
            .clone()
            .oneshot(form_request(
                &format!("/orders/{order_id}/delivery"),
                Some(cookie),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        location(&response)
    }

    #[tokio::test]
    async fn driver_fails_redispatches_and_delivers() {
        let app = app().await;
        let order_id = place_curry_order(&app).await;
        cook(&app, &order_id).await;
        let driver = login(&app, Role::Driver).await;

        let target = post_delivery(
            &app,
            &driver,
            &order_id,
            "status=FAILED&note=Gate+locked&return_to=%2Fdriver",
        )
        .await;
        assert!(target.starts_with("/driver?notice="), "{target}");
        assert!(target.ends_with("level=success"), "{target}");
        let order = fetch_order(&app, &driver, &order_id).await;
        assert_eq!(order.delivery_status, DeliveryStatus::Failed);
        assert_eq!(order.notes.as_deref(), Some("Gate locked"));

        let target = post_delivery(
            &app,
            &driver,
            &order_id,
            "status=READY_FOR_DELIVERY&return_to=%2Fdriver",
        )
        .await;
        assert!(target.ends_with("level=success"), "{target}");

        let target =
            post_delivery(&app, &driver, &order_id, "status=DELIVERED&return_to=%2Fdriver").await;
        assert!(target.ends_with("level=success"), "{target}");
        let order = fetch_order(&app, &driver, &order_id).await;
        assert_eq!(order.delivery_status, DeliveryStatus::Delivered);
        assert_eq!(order.items[0].delivery_status, DeliveryStatus::Delivered);

        let target =
            post_delivery(&app, &driver, &order_id, "status=FAILED&return_to=%2Fdriver").await;
        assert!(target.ends_with("level=error"), "{target}");
    }

    #[tokio::test]
    async fn item_delivery_settles_single_item_order() {
        let app = app().await;
        let order_id = place_curry_order(&app).await;
        cook(&app, &order_id).await;
        let driver = login(&app, Role::Driver).await;
        let order = fetch_order(&app, &driver, &order_id).await;

        let response = app
            .clone()
            .oneshot(form_request(
                &format!("/orders/{order_id}/items/{}/delivery", order.items[0].id),
                Some(&driver),
                "status=DELIVERED&return_to=%2Fdriver",
            ))
            .await
            .unwrap();
        assert!(location(&response).ends_with("level=success"));
        let order = fetch_order(&app, &driver, &order_id).await;
        assert_eq!(order.delivery_status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn admin_cannot_cancel_cooked_order() {
        let app = app().await;
        let order_id = place_curry_order(&app).await;
        cook(&app, &order_id).await;
        let admin = login(&app, Role::Admin).await;

        let response = app
            .clone()
            .oneshot(form_request(
                &format!("/orders/{order_id}/cancel"),
                Some(&admin),
                "return_to=%2Forders",
            ))
            .await
            .unwrap();
        assert!(location(&response).ends_with("level=error"));
        let order = fetch_order(&app, &admin, &order_id).await;
        assert_eq!(order.items[0].production_status, ProductionStatus::Completed);
    }
}

// =============================================================================
// JSON API
// =============================================================================

mod api {
    use super::*;

    #[tokio::test]
    async fn api_requires_session() {
        let app = app().await;
        let response = app.oneshot(get_request("/api/orders", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bearer_login_and_me() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "driver@demo.local", "password": DEMO_PASSWORD }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let token = session["token"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri("/api/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(me["role"], "DRIVER");
    }

    #[tokio::test]
    async fn chef_sees_no_price_lists() {
        let app = app().await;
        let cookie = login(&app, Role::Chef).await;
        let response = app
            .oneshot(get_request("/api/price-lists", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let lists: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(lists, json!([]));
    }
}

// =============================================================================
// Event stream
// =============================================================================

mod events {
    use super::*;
    use std::time::Duration as StdDuration;

    /// Place a one-line order through the JSON API; returns its number
    async fn place_order(app: &Router, cookie: &str) -> String {
        let date = Utc::now().date_naive() + Duration::days(3);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, cookie)
            .body(Body::from(
                json!({
                    "deliveryDate": date.format("%Y-%m-%d").to_string(),
                    "lines": [{ "productId": "p-curry", "quantity": 1 }],
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let order: Order = serde_json::from_str(&body_text(response).await).unwrap();
        order.order_number
    }

    #[tokio::test]
    async fn signed_out_stream_is_rejected() {
        let app = app().await;
        let response = app.oneshot(get_request("/events", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn client_stream_skips_other_clients_orders() {
        let app = app().await;
        let harbor = login(&app, Role::Client).await;
        let greenfield = login_as(&app, "greenfield@demo.local", Role::Client).await;

        let response = app
            .clone()
            .oneshot(get_request("/events", Some(&harbor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut body = response.into_body();

        let theirs = place_order(&app, &greenfield).await;
        let ours = place_order(&app, &harbor).await;

        let toast = format!("New order {ours} placed");
        let mut seen = String::new();
        let read = tokio::time::timeout(StdDuration::from_secs(5), async {
            while !seen.contains(&toast) {
                let Some(frame) = body.frame().await else { break };
                if let Ok(data) = frame.unwrap().into_data() {
                    seen.push_str(&String::from_utf8_lossy(&data));
                }
            }
        })
        .await;
        assert!(read.is_ok(), "no event for own order: {seen}");
        assert!(seen.contains("OrderCreated"));
        assert!(!seen.contains(&theirs), "{seen}");
        assert!(!seen.contains("Greenfield"), "{seen}");
    }
}
