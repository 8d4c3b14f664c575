//! Demo backend - generated catering data served from memory.
//!
//! Stands in for the REST API when demo mode is on. It applies the same
//! role scoping and business rules the real backend enforces (status
//! transitions, produced quantities, price list invariants) so every
//! dashboard behaves the same against it.
//!
//! All demo accounts use the password `demo`.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{Backend, BackendError, BackendResult};
use crate::domain::analytics::build_report;
use crate::domain::pricing::unit_price;
use crate::domain::{
    AnalyticsQuery, AnalyticsReport, ClientRef, DeliveryStatus, DeliveryUpdate, NewOrder,
    NewPriceList, NewUser, OptionItem, Order, OrderItem, OrderQuery, PriceList, PriceListItem,
    PriceRule, Product, ProductOption, ProductionStatus, ProductionUpdate, Role, Session, User,
};

/// Password shared by all demo accounts
pub const DEMO_PASSWORD: &str = "demo";

/// Default seed so every demo run shows the same data
pub const DEFAULT_SEED: u64 = 0xCA7E;

const GENERATED_ORDERS: usize = 28;

struct DemoState {
    users: Vec<User>,
    passwords: HashMap<String, String>,
    /// token -> user id
    sessions: HashMap<String, String>,
    products: Vec<Product>,
    price_lists: Vec<PriceList>,
    /// price list id -> creating user id
    price_list_owners: HashMap<String, String>,
    orders: Vec<Order>,
    next_id: u64,
}

impl DemoState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn viewer(&self, token: &str) -> BackendResult<User> {
        let user_id = self.sessions.get(token).ok_or(BackendError::Unauthorized)?;
        let user = self.user(user_id).ok_or(BackendError::Unauthorized)?;
        if !user.active {
            return Err(BackendError::Unauthorized);
        }
        Ok(user.clone())
    }

    fn is_own_client(&self, distributor: &User, client_id: &str) -> bool {
        self.user(client_id)
            .map(|c| c.role == Role::Client && c.distributor_id.as_deref() == Some(&distributor.id))
            .unwrap_or(false)
    }

    fn can_see_order(&self, viewer: &User, order: &Order) -> bool {
        match viewer.role {
            Role::Admin => true,
            Role::Client => order.client.id == viewer.id,
            Role::Distributor => self.is_own_client(viewer, &order.client.id),
            Role::Chef => viewer
                .product_group
                .as_deref()
                .map(|group| order.has_group(group))
                .unwrap_or(false),
            Role::Driver => !matches!(
                order.delivery_status,
                DeliveryStatus::Pending | DeliveryStatus::Cancelled
            ),
        }
    }

    fn order_mut(&mut self, viewer: &User, order_id: &str) -> BackendResult<&mut Order> {
        let visible = self
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| self.can_see_order(viewer, o));
        match visible {
            Some(true) => self
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| BackendError::NotFound(format!("Order {order_id} not found"))),
            _ => Err(BackendError::NotFound(format!("Order {order_id} not found"))),
        }
    }

    fn can_see_price_list(&self, viewer: &User, list: &PriceList) -> bool {
        match viewer.role {
            Role::Admin => true,
            Role::Distributor => {
                self.price_list_owners.get(&list.id) == Some(&viewer.id)
                    || list.assigned_user_ids.contains(&viewer.id)
            }
            Role::Client => viewer.price_list_id.as_deref() == Some(&list.id),
            Role::Chef | Role::Driver => false,
        }
    }

    fn price_list_mut(&mut self, viewer: &User, list_id: &str) -> BackendResult<&mut PriceList> {
        if !viewer.role.manages_pricing() {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let editable = self.price_lists.iter().find(|l| l.id == list_id).map(|l| {
            viewer.role == Role::Admin || self.price_list_owners.get(&l.id) == Some(&viewer.id)
        });
        match editable {
            Some(true) => self
                .price_lists
                .iter_mut()
                .find(|l| l.id == list_id)
                .ok_or_else(|| BackendError::NotFound(format!("Price list {list_id} not found"))),
            Some(false) => Err(BackendError::Forbidden(
                "You can only edit your own price lists".to_string(),
            )),
            None => Err(BackendError::NotFound(format!(
                "Price list {list_id} not found"
            ))),
        }
    }

    fn price_list_for(&self, client_id: &str) -> Option<&PriceList> {
        let list_id = self.user(client_id)?.price_list_id.as_deref()?;
        self.price_lists.iter().find(|l| l.id == list_id)
    }
}

/// Once every live item is finished, the order is handed to dispatch
fn settle_order(order: &mut Order) {
    order.production_status = order.derived_production_status();
    order.total = order.recompute_total();
    if order.production_status == ProductionStatus::Cancelled {
        order.delivery_status = DeliveryStatus::Cancelled;
        return;
    }
    let all_finished = order
        .items
        .iter()
        .all(|item| item.production_status.is_terminal());
    if all_finished && order.delivery_status == DeliveryStatus::Pending {
        order.delivery_status = DeliveryStatus::ReadyForDelivery;
        for item in order.items.iter_mut().filter(|i| !i.is_cancelled()) {
            item.delivery_status = DeliveryStatus::ReadyForDelivery;
        }
    }
}

/// Rolls item outcomes up to the order once no live item is still out
fn settle_delivery(order: &mut Order) {
    if order.delivery_status != DeliveryStatus::ReadyForDelivery {
        return;
    }
    let outcomes: Vec<DeliveryStatus> = order
        .items
        .iter()
        .filter(|i| !i.is_cancelled())
        .map(|i| i.delivery_status)
        .collect();
    let settled = !outcomes.is_empty()
        && outcomes.iter().all(|s| {
            matches!(
                s,
                DeliveryStatus::Delivered
                    | DeliveryStatus::PartiallyDelivered
                    | DeliveryStatus::Failed
            )
        });
    if !settled {
        return;
    }
    order.delivery_status = if outcomes.iter().all(|s| *s == DeliveryStatus::Delivered) {
        DeliveryStatus::Delivered
    } else if outcomes.iter().all(|s| *s == DeliveryStatus::Failed) {
        DeliveryStatus::Failed
    } else {
        DeliveryStatus::PartiallyDelivered
    };
}

pub struct DemoBackend {
    state: RwLock<DemoState>,
}

impl DemoBackend {
    /// Demo data generated relative to today's date
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED, Utc::now().date_naive())
    }

    /// Deterministic demo data for a given seed and reference date
    pub fn with_seed(seed: u64, today: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let users = demo_users();
        let products = demo_products();
        let (price_lists, price_list_owners) = demo_price_lists();
        let passwords = users
            .iter()
            .map(|u| (u.email.clone(), DEMO_PASSWORD.to_string()))
            .collect();

        let mut state = DemoState {
            users,
            passwords,
            sessions: HashMap::new(),
            products,
            price_lists,
            price_list_owners,
            orders: Vec::new(),
            next_id: 1000,
        };
        for n in 0..GENERATED_ORDERS {
            let order = generate_order(&mut state, &mut rng, today, n);
            state.orders.push(order);
        }
        state.orders.sort_by(|a, b| a.delivery_date.cmp(&b.delivery_date));
        info!(
            "Demo backend ready: {} users, {} products, {} orders",
            state.users.len(),
            state.products.len(),
            state.orders.len()
        );
        Self {
            state: RwLock::new(state),
        }
    }

    /// Emails of the seeded accounts, for the login page hint
    pub async fn demo_accounts(&self) -> Vec<(String, Role)> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .filter(|u| u.active)
            .map(|u| (u.email.clone(), u.role))
            .collect()
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        active: true,
        product_group: None,
        price_list_id: None,
        distributor_id: None,
    }
}

fn demo_users() -> Vec<User> {
    let chef = |id: &str, name: &str, email: &str, group: &str| User {
        product_group: Some(group.to_string()),
        ..user(id, name, email, Role::Chef)
    };
    let client = |id: &str, name: &str, email: &str, list: Option<&str>, dist: Option<&str>| User {
        price_list_id: list.map(str::to_string),
        distributor_id: dist.map(str::to_string),
        ..user(id, name, email, Role::Client)
    };
    vec![
        user("u-admin", "Morgan Reyes", "admin@demo.local", Role::Admin),
        chef("u-chef-hot", "Sam Okafor", "hot@demo.local", "Hot"),
        chef("u-chef-cold", "Lena Varga", "cold@demo.local", "Cold"),
        chef("u-chef-pastry", "Noor Haddad", "pastry@demo.local", "Pastry"),
        user("u-driver", "Jonas Berg", "driver@demo.local", Role::Driver),
        User {
            price_list_id: Some("pl-northside".to_string()),
            ..user(
                "u-dist",
                "Northside Foods",
                "distributor@demo.local",
                Role::Distributor,
            )
        },
        client(
            "u-client-harbor",
            "Harbor Bistro",
            "harbor@demo.local",
            Some("pl-wholesale"),
            None,
        ),
        client(
            "u-client-greenfield",
            "Greenfield School",
            "greenfield@demo.local",
            Some("pl-northside"),
            Some("u-dist"),
        ),
        client(
            "u-client-atlas",
            "Atlas Offices",
            "atlas@demo.local",
            None,
            Some("u-dist"),
        ),
        client(
            "u-client-riverside",
            "Riverside Hotel",
            "riverside@demo.local",
            None,
            None,
        ),
    ]
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn product(
    id: &str,
    name: &str,
    group: &str,
    cents: i64,
    unit: &str,
    options: Vec<ProductOption>,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        group: group.to_string(),
        base_price: money(cents),
        unit: Some(unit.to_string()),
        active: true,
        options,
    }
}

fn option(id: &str, name: &str, items: &[(&str, &str, i64)]) -> Vec<ProductOption> {
    vec![ProductOption {
        id: id.to_string(),
        name: name.to_string(),
        items: items
            .iter()
            .map(|(id, label, cents)| OptionItem {
                id: id.to_string(),
                label: label.to_string(),
                base_price: money(*cents),
            })
            .collect(),
    }]
}

fn demo_products() -> Vec<Product> {
    vec![
        product(
            "p-bourguignon",
            "Beef bourguignon",
            "Hot",
            850,
            "portion",
            option(
                "o-portion",
                "Portion",
                &[("opt-regular", "Regular", 850), ("opt-large", "Large", 1100)],
            ),
        ),
        product("p-curry", "Vegetable curry", "Hot", 690, "portion", vec![]),
        product(
            "p-chicken",
            "Roast chicken tray",
            "Hot",
            4200,
            "tray",
            option(
                "o-tray",
                "Tray",
                &[("opt-half", "Half tray", 2400), ("opt-full", "Full tray", 4200)],
            ),
        ),
        product(
            "p-platter",
            "Canapé platter",
            "Cold",
            3500,
            "platter",
            option(
                "o-pieces",
                "Pieces",
                &[("opt-24", "24 pieces", 3500), ("opt-48", "48 pieces", 6400)],
            ),
        ),
        product("p-caesar", "Caesar salad bowl", "Cold", 1800, "bowl", vec![]),
        product("p-cheese", "Cheese board", "Cold", 2950, "board", vec![]),
        product("p-croissant", "Butter croissant", "Pastry", 160, "piece", vec![]),
        product(
            "p-tart",
            "Lemon tart",
            "Pastry",
            2400,
            "tart",
            option(
                "o-size",
                "Size",
                &[("opt-tart-6", "6 inch", 1800), ("opt-tart-10", "10 inch", 3200)],
            ),
        ),
        Product {
            active: false,
            ..product("p-macaron", "Macaron box", "Pastry", 1500, "box", vec![])
        },
    ]
}

fn demo_price_lists() -> (Vec<PriceList>, HashMap<String, String>) {
    let item = |id: &str, rule: PriceRule| PriceListItem {
        option_item_id: id.to_string(),
        rule,
    };
    let lists = vec![
        PriceList {
            id: "pl-wholesale".to_string(),
            name: "Wholesale".to_string(),
            description: Some("Restaurants ordering weekly".to_string()),
            items: vec![
                item("opt-48", PriceRule::Multiplier(Decimal::new(90, 2))),
                item("opt-tart-10", PriceRule::Fixed(money(2900))),
            ],
            assigned_user_ids: vec!["u-client-harbor".to_string()],
        },
        PriceList {
            id: "pl-northside".to_string(),
            name: "Northside schools".to_string(),
            description: None,
            items: vec![item("opt-full", PriceRule::Multiplier(Decimal::new(95, 2)))],
            assigned_user_ids: vec!["u-dist".to_string(), "u-client-greenfield".to_string()],
        },
    ];
    let owners = HashMap::from([
        ("pl-wholesale".to_string(), "u-admin".to_string()),
        ("pl-northside".to_string(), "u-dist".to_string()),
    ]);
    (lists, owners)
}

fn generate_order(state: &mut DemoState, rng: &mut StdRng, today: NaiveDate, n: usize) -> Order {
    let clients: Vec<User> = state
        .users
        .iter()
        .filter(|u| u.role == Role::Client)
        .cloned()
        .collect();
    let client = clients
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| user("u-walkin", "Walk-in", "walkin@demo.local", Role::Client));
    let offset: i64 = rng.gen_range(-7..=4);
    let delivery_date = if offset < 0 {
        today.checked_sub_days(Days::new(offset.unsigned_abs()))
    } else {
        today.checked_add_days(Days::new(offset as u64))
    }
    .unwrap_or(today);

    let price_list = state.price_list_for(&client.id).cloned();
    let active: Vec<Product> = state.products.iter().filter(|p| p.active).cloned().collect();
    let line_count = rng.gen_range(1..=4);
    let mut items = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        let Some(product) = active.choose(rng) else {
            break;
        };
        let option_item = product
            .option_items()
            .collect::<Vec<_>>()
            .choose(rng)
            .map(|item| (*item).clone());
        let option_id = option_item.as_ref().map(|i| i.id.as_str());
        let price = unit_price(product, option_id, price_list.as_ref()).unwrap_or(product.base_price);
        let item_id = state.next_id("item");
        items.push(OrderItem {
            id: item_id,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            option_item_id: option_item.as_ref().map(|i| i.id.clone()),
            option_label: option_item.as_ref().map(|i| i.label.clone()),
            product_group: product.group.clone(),
            quantity: rng.gen_range(1..=20),
            produced_quantity: 0,
            unit_price: price,
            production_status: ProductionStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
        });
    }

    let mut order = Order {
        id: state.next_id("ord"),
        order_number: format!("ORD-{:04}", n + 1),
        client: ClientRef {
            id: client.id.clone(),
            name: client.name.clone(),
        },
        delivery_date,
        delivery_address: Some(format!("{} Market Street", 10 + n * 7)),
        notes: None,
        production_status: ProductionStatus::Pending,
        delivery_status: DeliveryStatus::Pending,
        items,
        total: Decimal::ZERO,
        created_at: delivery_date
            .checked_sub_days(Days::new(3))
            .unwrap_or(delivery_date)
            .and_hms_opt(9, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now),
    };

    let roll: u8 = rng.gen_range(0..8);
    if delivery_date < today {
        if roll == 0 {
            for item in &mut order.items {
                item.production_status = ProductionStatus::Cancelled;
            }
        } else {
            for item in &mut order.items {
                item.production_status = ProductionStatus::Completed;
                item.produced_quantity = item.quantity;
            }
        }
        settle_order(&mut order);
        if order.delivery_status == DeliveryStatus::ReadyForDelivery {
            let outcome = if roll == 1 {
                DeliveryStatus::PartiallyDelivered
            } else {
                DeliveryStatus::Delivered
            };
            order.delivery_status = outcome;
            for item in order.items.iter_mut().filter(|i| !i.is_cancelled()) {
                item.delivery_status = DeliveryStatus::Delivered;
            }
        }
    } else if delivery_date == today {
        for item in &mut order.items {
            match rng.gen_range(0..4) {
                0 => {}
                1 => {
                    item.production_status = ProductionStatus::PartiallyCompleted;
                    item.produced_quantity = item.quantity / 2;
                    if item.produced_quantity == 0 {
                        item.production_status = ProductionStatus::Pending;
                    }
                }
                _ => {
                    item.production_status = ProductionStatus::Completed;
                    item.produced_quantity = item.quantity;
                }
            }
        }
        settle_order(&mut order);
    } else {
        settle_order(&mut order);
    }
    order
}

#[async_trait]
impl Backend for DemoBackend {
    async fn login(&self, email: &str, password: &str) -> BackendResult<Session> {
        let mut state = self.state.write().await;
        let email = email.trim().to_lowercase();
        let known = state.passwords.get(&email).map(|p| p == password);
        if known != Some(true) {
            return Err(BackendError::Rejected {
                status: 401,
                message: "Invalid email or password".to_string(),
            });
        }
        let user = state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(BackendError::Unauthorized)?;
        if !user.active {
            return Err(BackendError::Forbidden(
                "This account has been deactivated".to_string(),
            ));
        }
        let token = format!("demo-{}-{:016x}", user.id, rand::random::<u64>());
        state.sessions.insert(token.clone(), user.id.clone());
        debug!("Demo login for {} ({})", user.email, user.role);
        Ok(Session { token, user })
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        self.state.read().await.viewer(token)
    }

    async fn list_orders(&self, token: &str, query: &OrderQuery) -> BackendResult<Vec<Order>> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        Ok(state
            .orders
            .iter()
            .filter(|o| state.can_see_order(&viewer, o) && query.matches(o))
            .cloned()
            .collect())
    }

    async fn get_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        state
            .orders
            .iter()
            .find(|o| o.id == order_id && state.can_see_order(&viewer, o))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("Order {order_id} not found")))
    }

    async fn create_order(&self, token: &str, new_order: &NewOrder) -> BackendResult<Order> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let client_id = match viewer.role {
            Role::Client => viewer.id.clone(),
            Role::Admin | Role::Distributor => {
                let id = new_order.client_id.clone().ok_or_else(|| BackendError::Rejected {
                    status: 422,
                    message: "Choose a client for this order".to_string(),
                })?;
                if viewer.role == Role::Distributor && !state.is_own_client(&viewer, &id) {
                    return Err(BackendError::Forbidden(
                        "You can only order for your own clients".to_string(),
                    ));
                }
                id
            }
            Role::Chef | Role::Driver => return Err(BackendError::forbidden_for(viewer.role)),
        };
        let client = state
            .user(&client_id)
            .filter(|u| u.role == Role::Client)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("Client {client_id} not found")))?;

        if new_order.lines.is_empty() {
            return Err(BackendError::Rejected {
                status: 422,
                message: "An order needs at least one line".to_string(),
            });
        }
        if new_order.delivery_date < Utc::now().date_naive() {
            return Err(BackendError::Rejected {
                status: 422,
                message: "Delivery date cannot be in the past".to_string(),
            });
        }

        let price_list = state.price_list_for(&client.id).cloned();
        let mut items = Vec::with_capacity(new_order.lines.len());
        for line in &new_order.lines {
            if line.quantity == 0 {
                return Err(BackendError::Rejected {
                    status: 422,
                    message: "Quantities must be at least 1".to_string(),
                });
            }
            let product = state
                .products
                .iter()
                .find(|p| p.id == line.product_id && p.active)
                .cloned()
                .ok_or_else(|| BackendError::Rejected {
                    status: 422,
                    message: format!("Product {} is not available", line.product_id),
                })?;
            let option_id = line.option_item_id.as_deref().filter(|s| !s.is_empty());
            let price = unit_price(&product, option_id, price_list.as_ref()).ok_or_else(|| {
                BackendError::Rejected {
                    status: 422,
                    message: format!("Unknown option for {}", product.name),
                }
            })?;
            let option_label = option_id
                .and_then(|id| product.find_option_item(id))
                .map(|i| i.label.clone());
            let item_id = state.next_id("item");
            items.push(OrderItem {
                id: item_id,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                option_item_id: option_id.map(str::to_string),
                option_label,
                product_group: product.group.clone(),
                quantity: line.quantity,
                produced_quantity: 0,
                unit_price: price,
                production_status: ProductionStatus::Pending,
                delivery_status: DeliveryStatus::Pending,
            });
        }

        let number = state.orders.len() + 1;
        let mut order = Order {
            id: state.next_id("ord"),
            order_number: format!("ORD-{number:04}"),
            client: ClientRef {
                id: client.id.clone(),
                name: client.name.clone(),
            },
            delivery_date: new_order.delivery_date,
            delivery_address: new_order.delivery_address.clone(),
            notes: new_order.notes.clone(),
            production_status: ProductionStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            items,
            total: Decimal::ZERO,
            created_at: Utc::now(),
        };
        order.total = order.recompute_total();
        state.orders.push(order.clone());
        info!("Demo order {} created for {}", order.order_number, client.name);
        Ok(order)
    }

    async fn cancel_order(&self, token: &str, order_id: &str) -> BackendResult<Order> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if !matches!(viewer.role, Role::Admin | Role::Client) {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let order = state.order_mut(&viewer, order_id)?;
        if !order.can_be_cancelled_by(viewer.role) {
            return Err(BackendError::InvalidTransition(format!(
                "Order {} can no longer be cancelled",
                order.order_number
            )));
        }
        for item in &mut order.items {
            item.production_status = ProductionStatus::Cancelled;
            item.delivery_status = DeliveryStatus::Cancelled;
        }
        order.production_status = ProductionStatus::Cancelled;
        order.delivery_status = DeliveryStatus::Cancelled;
        order.total = Decimal::ZERO;
        Ok(order.clone())
    }

    async fn update_item_production(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        update: &ProductionUpdate,
    ) -> BackendResult<Order> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if !matches!(viewer.role, Role::Admin | Role::Chef) {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let order = state.order_mut(&viewer, order_id)?;
        let item = order
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| BackendError::NotFound(format!("Item {item_id} not found")))?;
        if viewer.role == Role::Chef
            && !viewer
                .product_group
                .as_deref()
                .is_some_and(|g| g.eq_ignore_ascii_case(&item.product_group))
        {
            return Err(BackendError::Forbidden(format!(
                "{} belongs to the {} station",
                item.product_name, item.product_group
            )));
        }
        if !item.production_status.can_transition_to(update.status) {
            return Err(BackendError::InvalidTransition(format!(
                "{} is {} and cannot become {}",
                item.product_name,
                item.production_status.badge().label.to_lowercase(),
                update.status.badge().label.to_lowercase()
            )));
        }
        match update.status {
            ProductionStatus::Completed => item.produced_quantity = item.quantity,
            ProductionStatus::PartiallyCompleted => {
                let produced = update.produced_quantity.unwrap_or(0);
                if produced == 0 || produced >= item.quantity {
                    return Err(BackendError::Rejected {
                        status: 422,
                        message: format!(
                            "Produced quantity for a partial item must be between 1 and {}",
                            item.quantity.saturating_sub(1)
                        ),
                    });
                }
                item.produced_quantity = produced;
            }
            ProductionStatus::Cancelled => item.delivery_status = DeliveryStatus::Cancelled,
            ProductionStatus::Pending => {}
        }
        item.production_status = update.status;
        settle_order(order);
        Ok(order.clone())
    }

    async fn update_item_delivery(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        status: DeliveryStatus,
    ) -> BackendResult<Order> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if !matches!(viewer.role, Role::Admin | Role::Driver) {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let order = state.order_mut(&viewer, order_id)?;
        let item = order
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| BackendError::NotFound(format!("Item {item_id} not found")))?;
        if !item.delivery_status.can_transition_to(status) {
            return Err(BackendError::InvalidTransition(format!(
                "{} is {} and cannot become {}",
                item.product_name,
                item.delivery_status.badge().label.to_lowercase(),
                status.badge().label.to_lowercase()
            )));
        }
        item.delivery_status = status;
        settle_delivery(order);
        Ok(order.clone())
    }

    async fn update_order_delivery(
        &self,
        token: &str,
        order_id: &str,
        update: &DeliveryUpdate,
    ) -> BackendResult<Order> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if !matches!(viewer.role, Role::Admin | Role::Driver) {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let order = state.order_mut(&viewer, order_id)?;
        if !order.delivery_status.can_transition_to(update.status) {
            return Err(BackendError::InvalidTransition(format!(
                "Order {} is {} and cannot become {}",
                order.order_number,
                order.delivery_status.badge().label.to_lowercase(),
                update.status.badge().label.to_lowercase()
            )));
        }
        order.delivery_status = update.status;
        // Per-item outcomes of a partial delivery are recorded separately
        if update.status != DeliveryStatus::PartiallyDelivered {
            for item in order
                .items
                .iter_mut()
                .filter(|i| !i.is_cancelled() && i.delivery_status.can_transition_to(update.status))
            {
                item.delivery_status = update.status;
            }
        }
        if let Some(note) = update.note.as_deref().filter(|n| !n.trim().is_empty()) {
            let existing = order.notes.take().unwrap_or_default();
            order.notes = Some(if existing.is_empty() {
                note.trim().to_string()
            } else {
                format!("{existing}\n{}", note.trim())
            });
        }
        Ok(order.clone())
    }

    async fn list_products(&self, token: &str) -> BackendResult<Vec<Product>> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        Ok(state
            .products
            .iter()
            .filter(|p| p.active || viewer.role == Role::Admin)
            .cloned()
            .collect())
    }

    async fn set_product_active(
        &self,
        token: &str,
        product_id: &str,
        active: bool,
    ) -> BackendResult<Product> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if viewer.role != Role::Admin {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| BackendError::NotFound(format!("Product {product_id} not found")))?;
        product.active = active;
        Ok(product.clone())
    }

    async fn list_price_lists(&self, token: &str) -> BackendResult<Vec<PriceList>> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        Ok(state
            .price_lists
            .iter()
            .filter(|l| state.can_see_price_list(&viewer, l))
            .cloned()
            .collect())
    }

    async fn get_price_list(&self, token: &str, price_list_id: &str) -> BackendResult<PriceList> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        state
            .price_lists
            .iter()
            .find(|l| l.id == price_list_id && state.can_see_price_list(&viewer, l))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("Price list {price_list_id} not found")))
    }

    async fn create_price_list(
        &self,
        token: &str,
        list: &NewPriceList,
    ) -> BackendResult<PriceList> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        if !viewer.role.manages_pricing() {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let name = list.name.trim();
        if name.is_empty() {
            return Err(BackendError::Rejected {
                status: 422,
                message: "Price list name is required".to_string(),
            });
        }
        if state
            .price_lists
            .iter()
            .any(|l| l.name.eq_ignore_ascii_case(name))
        {
            return Err(BackendError::Rejected {
                status: 422,
                message: format!("A price list named {name} already exists"),
            });
        }
        let created = PriceList {
            id: state.next_id("pl"),
            name: name.to_string(),
            description: list.description.clone().filter(|d| !d.trim().is_empty()),
            items: Vec::new(),
            assigned_user_ids: Vec::new(),
        };
        state
            .price_list_owners
            .insert(created.id.clone(), viewer.id.clone());
        state.price_lists.push(created.clone());
        Ok(created)
    }

    async fn upsert_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        item: &PriceListItem,
    ) -> BackendResult<PriceList> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let known = state
            .products
            .iter()
            .any(|p| p.find_option_item(&item.option_item_id).is_some());
        if !known {
            return Err(BackendError::NotFound(format!(
                "Option item {} not found",
                item.option_item_id
            )));
        }
        let list = state.price_list_mut(&viewer, price_list_id)?;
        list.upsert(item.clone());
        Ok(list.clone())
    }

    async fn remove_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        option_item_id: &str,
    ) -> BackendResult<PriceList> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let list = state.price_list_mut(&viewer, price_list_id)?;
        if !list.remove(option_item_id) {
            return Err(BackendError::NotFound(format!(
                "{option_item_id} has no override in {}",
                list.name
            )));
        }
        Ok(list.clone())
    }

    async fn assign_price_list(
        &self,
        token: &str,
        price_list_id: &str,
        user_id: &str,
    ) -> BackendResult<PriceList> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let target = state
            .user(user_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("User {user_id} not found")))?;
        let assignable = match viewer.role {
            Role::Admin => matches!(target.role, Role::Client | Role::Distributor),
            Role::Distributor => state.is_own_client(&viewer, &target.id),
            _ => false,
        };
        if !assignable {
            return Err(BackendError::Forbidden(format!(
                "Price lists cannot be assigned to {}",
                target.name
            )));
        }
        // Validates access before touching anything
        state.price_list_mut(&viewer, price_list_id)?;
        for list in &mut state.price_lists {
            list.assigned_user_ids.retain(|id| id != user_id);
        }
        if let Some(u) = state.users.iter_mut().find(|u| u.id == user_id) {
            u.price_list_id = Some(price_list_id.to_string());
        }
        let list = state.price_list_mut(&viewer, price_list_id)?;
        list.assigned_user_ids.push(user_id.to_string());
        Ok(list.clone())
    }

    async fn list_users(&self, token: &str, role: Option<Role>) -> BackendResult<Vec<User>> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        let scoped: Vec<User> = match viewer.role {
            Role::Admin => state.users.clone(),
            Role::Distributor => state
                .users
                .iter()
                .filter(|u| state.is_own_client(&viewer, &u.id))
                .cloned()
                .collect(),
            _ => return Err(BackendError::forbidden_for(viewer.role)),
        };
        Ok(scoped
            .into_iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .collect())
    }

    async fn create_user(&self, token: &str, new_user: &NewUser) -> BackendResult<User> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let distributor_id = match viewer.role {
            Role::Admin => new_user.distributor_id.clone().filter(|d| !d.is_empty()),
            Role::Distributor if new_user.role == Role::Client => Some(viewer.id.clone()),
            Role::Distributor => {
                return Err(BackendError::Forbidden(
                    "Distributors can only create client accounts".to_string(),
                ))
            }
            _ => return Err(BackendError::forbidden_for(viewer.role)),
        };
        new_user.validate().map_err(|message| BackendError::Rejected {
            status: 422,
            message,
        })?;
        let email = new_user.email.trim().to_lowercase();
        if state.users.iter().any(|u| u.email == email) {
            return Err(BackendError::Rejected {
                status: 422,
                message: format!("{email} is already registered"),
            });
        }
        let created = User {
            id: state.next_id("u"),
            name: new_user.name.trim().to_string(),
            email: email.clone(),
            role: new_user.role,
            active: true,
            product_group: new_user
                .product_group
                .clone()
                .filter(|_| new_user.role == Role::Chef),
            price_list_id: None,
            distributor_id: distributor_id.filter(|_| new_user.role == Role::Client),
        };
        let password = new_user
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEMO_PASSWORD.to_string());
        state.passwords.insert(email, password);
        state.users.push(created.clone());
        Ok(created)
    }

    async fn set_user_active(
        &self,
        token: &str,
        user_id: &str,
        active: bool,
    ) -> BackendResult<User> {
        let mut state = self.state.write().await;
        let viewer = state.viewer(token)?;
        let allowed = match viewer.role {
            Role::Admin => viewer.id != user_id,
            Role::Distributor => state.is_own_client(&viewer, user_id),
            _ => false,
        };
        if !allowed {
            return Err(BackendError::Forbidden(
                "You cannot change this account".to_string(),
            ));
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| BackendError::NotFound(format!("User {user_id} not found")))?;
        user.active = active;
        let updated = user.clone();
        if !active {
            state.sessions.retain(|_, id| id != user_id);
        }
        Ok(updated)
    }

    async fn analytics(
        &self,
        token: &str,
        query: &AnalyticsQuery,
    ) -> BackendResult<AnalyticsReport> {
        let state = self.state.read().await;
        let viewer = state.viewer(token)?;
        if !matches!(viewer.role, Role::Admin | Role::Distributor) {
            return Err(BackendError::forbidden_for(viewer.role));
        }
        let orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| state.can_see_order(&viewer, o))
            .cloned()
            .collect();
        Ok(build_report(&orders, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewOrderLine;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    async fn login(backend: &DemoBackend, email: &str) -> String {
        backend.login(email, DEMO_PASSWORD).await.unwrap().token
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_message() {
        let backend = DemoBackend::with_seed(1, today());
        let err = backend.login("admin@demo.local", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn generation_is_deterministic() {
        let a = DemoBackend::with_seed(7, today());
        let b = DemoBackend::with_seed(7, today());
        let ta = login(&a, "admin@demo.local").await;
        let tb = login(&b, "admin@demo.local").await;
        let oa = a.list_orders(&ta, &OrderQuery::default()).await.unwrap();
        let ob = b.list_orders(&tb, &OrderQuery::default()).await.unwrap();
        assert_eq!(oa.len(), GENERATED_ORDERS);
        assert_eq!(oa, ob);
    }

    #[tokio::test]
    async fn chef_sees_only_orders_with_their_group() {
        let backend = DemoBackend::with_seed(3, today());
        let token = login(&backend, "pastry@demo.local").await;
        let orders = backend
            .list_orders(&token, &OrderQuery::default())
            .await
            .unwrap();
        assert!(orders.iter().all(|o| o.has_group("Pastry")));
    }

    #[tokio::test]
    async fn chef_cannot_touch_another_station() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let order = backend
            .create_order(
                &admin,
                &NewOrder {
                    client_id: Some("u-client-riverside".into()),
                    delivery_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                    delivery_address: None,
                    notes: None,
                    lines: vec![
                        NewOrderLine {
                            product_id: "p-curry".into(),
                            option_item_id: None,
                            quantity: 4,
                        },
                        NewOrderLine {
                            product_id: "p-croissant".into(),
                            option_item_id: None,
                            quantity: 30,
                        },
                    ],
                },
            )
            .await
            .unwrap();
        let croissant = order.items.iter().find(|i| i.product_group == "Pastry").unwrap();
        let hot_chef = login(&backend, "hot@demo.local").await;
        let err = backend
            .update_item_production(
                &hot_chef,
                &order.id,
                &croissant.id,
                &ProductionUpdate {
                    status: ProductionStatus::Completed,
                    produced_quantity: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Forbidden(_)));
    }

    #[tokio::test]
    async fn completing_every_item_hands_order_to_dispatch() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let order = backend
            .create_order(
                &admin,
                &NewOrder {
                    client_id: Some("u-client-atlas".into()),
                    delivery_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                    delivery_address: Some("1 Atlas Way".into()),
                    notes: None,
                    lines: vec![NewOrderLine {
                        product_id: "p-caesar".into(),
                        option_item_id: None,
                        quantity: 12,
                    }],
                },
            )
            .await
            .unwrap();
        let item_id = order.items[0].id.clone();

        let partial = backend
            .update_item_production(
                &admin,
                &order.id,
                &item_id,
                &ProductionUpdate {
                    status: ProductionStatus::PartiallyCompleted,
                    produced_quantity: Some(5),
                },
            )
            .await
            .unwrap();
        assert_eq!(partial.production_status, ProductionStatus::PartiallyCompleted);
        assert_eq!(partial.delivery_status, DeliveryStatus::Pending);

        let done = backend
            .update_item_production(
                &admin,
                &order.id,
                &item_id,
                &ProductionUpdate {
                    status: ProductionStatus::Completed,
                    produced_quantity: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.items[0].produced_quantity, 12);
        assert_eq!(done.delivery_status, DeliveryStatus::ReadyForDelivery);

        let again = backend
            .update_item_production(
                &admin,
                &order.id,
                &item_id,
                &ProductionUpdate {
                    status: ProductionStatus::Cancelled,
                    produced_quantity: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(again, BackendError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn partial_requires_quantity_below_ordered() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let orders = backend
            .list_orders(
                &admin,
                &OrderQuery {
                    production_status: Some(ProductionStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let order = orders.first().expect("seed has pending orders");
        let item = &order.items[0];
        let err = backend
            .update_item_production(
                &admin,
                &order.id,
                &item.id,
                &ProductionUpdate {
                    status: ProductionStatus::PartiallyCompleted,
                    produced_quantity: Some(item.quantity),
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Produced quantity"));
    }

    #[tokio::test]
    async fn client_orders_are_priced_through_their_list() {
        let backend = DemoBackend::with_seed(3, today());
        let harbor = login(&backend, "harbor@demo.local").await;
        let order = backend
            .create_order(
                &harbor,
                &NewOrder {
                    client_id: None,
                    delivery_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                    delivery_address: None,
                    notes: None,
                    lines: vec![NewOrderLine {
                        product_id: "p-platter".into(),
                        option_item_id: Some("opt-48".into()),
                        quantity: 2,
                    }],
                },
            )
            .await
            .unwrap();
        // 64.00 * 0.90
        assert_eq!(order.items[0].unit_price, Decimal::new(5760, 2));
        assert_eq!(order.total, Decimal::new(11520, 2));
        assert_eq!(order.client.id, "u-client-harbor");

        let cancelled = backend.cancel_order(&harbor, &order.id).await.unwrap();
        assert!(cancelled.is_cancelled());
    }

    #[tokio::test]
    async fn distributor_only_sees_own_clients() {
        let backend = DemoBackend::with_seed(3, today());
        let token = login(&backend, "distributor@demo.local").await;
        let users = backend.list_users(&token, None).await.unwrap();
        let mut ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, ["u-client-atlas", "u-client-greenfield"]);
        let orders = backend
            .list_orders(&token, &OrderQuery::default())
            .await
            .unwrap();
        assert!(orders
            .iter()
            .all(|o| o.client.id == "u-client-atlas" || o.client.id == "u-client-greenfield"));
        let lists = backend.list_price_lists(&token).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, "pl-northside");
    }

    #[tokio::test]
    async fn assigning_moves_user_between_lists() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let list = backend
            .assign_price_list(&admin, "pl-northside", "u-client-harbor")
            .await
            .unwrap();
        assert!(list.assigned_user_ids.contains(&"u-client-harbor".to_string()));
        let old = backend.get_price_list(&admin, "pl-wholesale").await.unwrap();
        assert!(old.assigned_user_ids.is_empty());
    }

    #[tokio::test]
    async fn deactivated_users_lose_their_session() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let driver = login(&backend, "driver@demo.local").await;
        backend
            .set_user_active(&admin, "u-driver", false)
            .await
            .unwrap();
        assert_eq!(
            backend.current_user(&driver).await.unwrap_err(),
            BackendError::Unauthorized
        );
    }

    #[tokio::test]
    async fn analytics_is_forbidden_for_kitchen_roles() {
        let backend = DemoBackend::with_seed(3, today());
        let chef = login(&backend, "hot@demo.local").await;
        let err = backend
            .analytics(&chef, &AnalyticsQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Forbidden(_)));
    }

    /// Admin order for Atlas with every line cooked, handed to dispatch
    async fn ready_order(backend: &DemoBackend, admin: &str, lines: &[(&str, u32)]) -> Order {
        let order = backend
            .create_order(
                admin,
                &NewOrder {
                    client_id: Some("u-client-atlas".into()),
                    delivery_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                    delivery_address: None,
                    notes: Some("Ring at the side door".into()),
                    lines: lines
                        .iter()
                        .map(|(product_id, quantity)| NewOrderLine {
                            product_id: product_id.to_string(),
                            option_item_id: None,
                            quantity: *quantity,
                        })
                        .collect(),
                },
            )
            .await
            .unwrap();
        let mut latest = order.clone();
        for item in &order.items {
            latest = backend
                .update_item_production(
                    admin,
                    &order.id,
                    &item.id,
                    &ProductionUpdate {
                        status: ProductionStatus::Completed,
                        produced_quantity: None,
                    },
                )
                .await
                .unwrap();
        }
        assert_eq!(latest.delivery_status, DeliveryStatus::ReadyForDelivery);
        latest
    }

    fn delivery(status: DeliveryStatus, note: Option<&str>) -> DeliveryUpdate {
        DeliveryUpdate {
            status,
            note: note.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn admin_cancel_is_refused_once_an_item_is_completed() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let order = ready_order(&backend, &admin, &[("p-curry", 4)]).await;

        let err = backend.cancel_order(&admin, &order.id).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidTransition(_)));
        let unchanged = backend.get_order(&admin, &order.id).await.unwrap();
        assert_eq!(unchanged.items[0].production_status, ProductionStatus::Completed);
        assert_eq!(unchanged.delivery_status, DeliveryStatus::ReadyForDelivery);
    }

    #[tokio::test]
    async fn admin_cancel_is_refused_after_failed_delivery() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let order = ready_order(&backend, &admin, &[("p-curry", 4)]).await;
        backend
            .update_order_delivery(&admin, &order.id, &delivery(DeliveryStatus::Failed, None))
            .await
            .unwrap();

        let err = backend.cancel_order(&admin, &order.id).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidTransition(_)));
        let unchanged = backend.get_order(&admin, &order.id).await.unwrap();
        assert_eq!(unchanged.delivery_status, DeliveryStatus::Failed);
        assert_eq!(unchanged.items[0].delivery_status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn admin_may_cancel_partially_cooked_order() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let order = backend
            .create_order(
                &admin,
                &NewOrder {
                    client_id: Some("u-client-atlas".into()),
                    delivery_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
                    delivery_address: None,
                    notes: None,
                    lines: vec![NewOrderLine {
                        product_id: "p-curry".into(),
                        option_item_id: None,
                        quantity: 8,
                    }],
                },
            )
            .await
            .unwrap();
        backend
            .update_item_production(
                &admin,
                &order.id,
                &order.items[0].id,
                &ProductionUpdate {
                    status: ProductionStatus::PartiallyCompleted,
                    produced_quantity: Some(3),
                },
            )
            .await
            .unwrap();

        let cancelled = backend.cancel_order(&admin, &order.id).await.unwrap();
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn driver_delivers_ready_order_and_note_is_appended() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let driver = login(&backend, "driver@demo.local").await;
        let order = ready_order(&backend, &admin, &[("p-curry", 4), ("p-caesar", 6)]).await;

        let delivered = backend
            .update_order_delivery(
                &driver,
                &order.id,
                &delivery(DeliveryStatus::Delivered, Some("  Left with reception ")),
            )
            .await
            .unwrap();
        assert_eq!(delivered.delivery_status, DeliveryStatus::Delivered);
        assert!(delivered
            .items
            .iter()
            .all(|i| i.delivery_status == DeliveryStatus::Delivered));
        assert_eq!(
            delivered.notes.as_deref(),
            Some("Ring at the side door\nLeft with reception")
        );

        let err = backend
            .update_order_delivery(&driver, &order.id, &delivery(DeliveryStatus::Failed, None))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn failed_delivery_is_redispatched() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let driver = login(&backend, "driver@demo.local").await;
        let order = ready_order(&backend, &admin, &[("p-curry", 4)]).await;

        let failed = backend
            .update_order_delivery(
                &driver,
                &order.id,
                &delivery(DeliveryStatus::Failed, Some("Nobody on site")),
            )
            .await
            .unwrap();
        assert_eq!(failed.delivery_status, DeliveryStatus::Failed);
        assert_eq!(failed.items[0].delivery_status, DeliveryStatus::Failed);

        let ready = backend
            .update_order_delivery(
                &driver,
                &order.id,
                &delivery(DeliveryStatus::ReadyForDelivery, None),
            )
            .await
            .unwrap();
        assert_eq!(ready.delivery_status, DeliveryStatus::ReadyForDelivery);
        assert_eq!(ready.items[0].delivery_status, DeliveryStatus::ReadyForDelivery);

        let partial = backend
            .update_order_delivery(
                &driver,
                &order.id,
                &delivery(DeliveryStatus::PartiallyDelivered, None),
            )
            .await
            .unwrap();
        assert_eq!(partial.delivery_status, DeliveryStatus::PartiallyDelivered);
        assert_eq!(partial.items[0].delivery_status, DeliveryStatus::ReadyForDelivery);
    }

    #[tokio::test]
    async fn item_deliveries_roll_up_to_the_order() {
        let backend = DemoBackend::with_seed(3, today());
        let admin = login(&backend, "admin@demo.local").await;
        let driver = login(&backend, "driver@demo.local").await;
        let order = ready_order(&backend, &admin, &[("p-curry", 4), ("p-caesar", 6)]).await;
        let (first, second) = (order.items[0].id.clone(), order.items[1].id.clone());

        let halfway = backend
            .update_item_delivery(&driver, &order.id, &first, DeliveryStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(halfway.delivery_status, DeliveryStatus::ReadyForDelivery);

        let done = backend
            .update_item_delivery(&driver, &order.id, &second, DeliveryStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(done.delivery_status, DeliveryStatus::Delivered);

        let err = backend
            .update_item_delivery(&driver, &order.id, &second, DeliveryStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidTransition(_)));

        let mixed = ready_order(&backend, &admin, &[("p-curry", 2), ("p-caesar", 2)]).await;
        backend
            .update_item_delivery(&driver, &mixed.id, &mixed.items[0].id, DeliveryStatus::Delivered)
            .await
            .unwrap();
        let settled = backend
            .update_item_delivery(&driver, &mixed.id, &mixed.items[1].id, DeliveryStatus::Failed)
            .await
            .unwrap();
        assert_eq!(settled.delivery_status, DeliveryStatus::PartiallyDelivered);
    }
}
