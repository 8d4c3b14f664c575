//! Order pages: filterable table, detail view and order intake.

use chrono::NaiveDate;
use dioxus::prelude::*;
use serde::Deserialize;

use super::admin::{OrderRow, OrderTable};
use crate::domain::pricing::unit_price;
use crate::domain::{
    DeliveryStatus, Order, OrderQuery, PriceList, Product, ProductionStatus, Role, User,
};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout, OrderCard};

/// Number of line rows on the order form
pub const ORDER_LINES: usize = 6;

/// Filter form as submitted by the browser; blank fields mean "any"
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderFilters {
    #[serde(default)]
    pub production_status: String,
    #[serde(default)]
    pub delivery_status: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub product_group: String,
    #[serde(default)]
    pub search: String,
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl OrderFilters {
    /// Unparseable values are dropped rather than rejected
    pub fn to_query(&self) -> OrderQuery {
        OrderQuery {
            production_status: self.production_status.parse().ok(),
            delivery_status: self.delivery_status.parse().ok(),
            delivery_date: NaiveDate::parse_from_str(self.delivery_date.trim(), "%Y-%m-%d").ok(),
            client_id: non_blank(&self.client_id),
            product_group: non_blank(&self.product_group),
            search: non_blank(&self.search),
        }
    }

    /// Query string reproducing these filters (without the leading `?`)
    pub fn query_string(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("production_status", &self.production_status),
            ("delivery_status", &self.delivery_status),
            ("delivery_date", &self.delivery_date),
            ("client_id", &self.client_id),
            ("product_group", &self.product_group),
            ("search", &self.search),
        ] {
            if !value.trim().is_empty() {
                out.append_pair(key, value.trim());
            }
        }
        out.finish()
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct OrdersPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub display: DisplayFormat,
    pub orders: Vec<Order>,
    pub filters: OrderFilters,
    /// Product groups offered in the filter
    #[props(default)]
    pub groups: Vec<String>,
    /// Clients offered in the filter
    #[props(default)]
    pub clients: Vec<User>,
}

#[component]
pub fn OrdersPage(props: OrdersPageProps) -> Element {
    let role = props.user.role;
    let query = props.filters.query_string();
    let return_to = if query.is_empty() {
        "/orders".to_string()
    } else {
        format!("/orders?{query}")
    };
    let rows: Vec<(OrderRow, bool)> = props
        .orders
        .iter()
        .map(|o| {
            let cancellable = role == Role::Admin && o.can_be_cancelled_by(role);
            (OrderRow::new(o, &props.display, role.sees_prices()), cancellable)
        })
        .collect();
    let count = rows.len();
    let filters = props.filters.clone();
    let clients: Vec<(String, String)> = props
        .clients
        .iter()
        .map(|c| (c.id.clone(), c.name.clone()))
        .collect();
    let production_options: Vec<(&'static str, &'static str, bool)> = ProductionStatus::ALL
        .iter()
        .map(|s| (s.as_str(), s.badge().label, filters.production_status == s.as_str()))
        .collect();
    let delivery_options: Vec<(&'static str, &'static str, bool)> = DeliveryStatus::ALL
        .iter()
        .map(|s| (s.as_str(), s.badge().label, filters.delivery_status == s.as_str()))
        .collect();
    let table_rows: Vec<OrderRow> = rows.iter().map(|(r, _)| r.clone()).collect();
    let cancellable: Vec<OrderRow> = rows
        .iter()
        .filter(|(_, c)| *c)
        .map(|(r, _)| r.clone())
        .collect();

    rsx! {
        Layout {
            title: "Orders".to_string(),
            nav_active: "orders".to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),
            live: Some("orders".to_string()),

            hgroup {
                h1 { "Orders" }
                p { "{count} matching orders" }
            }

            form { method: "get", action: "/orders", class: "filters",
                label {
                    "Search"
                    input { r#type: "search", name: "search", value: "{filters.search}", placeholder: "Order or client" }
                }
                label {
                    "Production"
                    select { name: "production_status",
                        option { value: "", "Any" }
                        for (code, label, selected) in production_options {
                            option { value: code, selected, "{label}" }
                        }
                    }
                }
                label {
                    "Delivery"
                    select { name: "delivery_status",
                        option { value: "", "Any" }
                        for (code, label, selected) in delivery_options {
                            option { value: code, selected, "{label}" }
                        }
                    }
                }
                label {
                    "Date"
                    input { r#type: "date", name: "delivery_date", value: "{filters.delivery_date}" }
                }
                if !props.groups.is_empty() {
                    label {
                        "Group"
                        select { name: "product_group",
                            option { value: "", "Any" }
                            for group in props.groups.iter() {
                                option {
                                    value: "{group}",
                                    selected: filters.product_group == *group,
                                    "{group}"
                                }
                            }
                        }
                    }
                }
                if !clients.is_empty() {
                    label {
                        "Client"
                        select { name: "client_id",
                            option { value: "", "Any" }
                            for (id, name) in clients {
                                option { value: "{id}", selected: filters.client_id == id, "{name}" }
                            }
                        }
                    }
                }
                button { r#type: "submit", "Filter" }
                a { href: "/orders", role: "button", class: "secondary outline", "Reset" }
            }

            if table_rows.is_empty() {
                p { small { "No orders match these filters." } }
            } else {
                OrderTable { rows: table_rows }
                if !cancellable.is_empty() {
                    details {
                        summary { "Cancel an order" }
                        div { class: "controls",
                            for row in cancellable {
                                form {
                                    key: "{row.id}",
                                    method: "post",
                                    action: "/orders/{row.id}/cancel",
                                    class: "inline",
                                    input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                    button { r#type: "submit", class: "secondary outline", "Cancel {row.number}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn OrderDetailPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    order: Order,
) -> Element {
    let role = user.role;
    let back = role.home_path();
    let title = format!("Order {}", order.order_number);
    let created = display.timestamp(order.created_at);
    let return_to = format!("/orders/{}", order.id);

    rsx! {
        Layout {
            title: title.clone(),
            nav_active: "orders".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("orders".to_string()),

            nav { "aria-label": "breadcrumb",
                ul {
                    li { a { href: "{back}", "Dashboard" } }
                    li { "{title}" }
                }
            }
            p { small { "Placed {created}" } }
            OrderCard { order, role, display, return_to }
        }
    }
}

/// One selectable product/option line on the order form
#[derive(Debug, Clone, PartialEq)]
pub struct OrderChoice {
    /// `product_id` or `product_id:option_item_id`
    pub value: String,
    pub label: String,
}

/// Choices for every active product, priced through `price_list`
pub fn order_choices(
    products: &[Product],
    price_list: Option<&PriceList>,
    display: &DisplayFormat,
    with_prices: bool,
) -> Vec<OrderChoice> {
    let mut choices = Vec::new();
    for product in products.iter().filter(|p| p.active) {
        let price = |option: Option<&str>| {
            unit_price(product, option, price_list)
                .filter(|_| with_prices)
                .map(|p| format!(" · {}", display.money(p)))
                .unwrap_or_default()
        };
        let mut items = product.option_items().peekable();
        if items.peek().is_none() {
            choices.push(OrderChoice {
                value: product.id.clone(),
                label: format!("{} ({}){}", product.name, product.group, price(None)),
            });
            continue;
        }
        for item in items {
            choices.push(OrderChoice {
                value: format!("{}:{}", product.id, item.id),
                label: format!(
                    "{}, {} ({}){}",
                    product.name,
                    item.label,
                    product.group,
                    price(Some(&item.id))
                ),
            });
        }
    }
    choices
}

#[derive(Props, Clone, PartialEq)]
pub struct NewOrderPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub display: DisplayFormat,
    pub products: Vec<Product>,
    /// Price list applied to the shown prices
    #[props(default)]
    pub price_list: Option<PriceList>,
    /// Clients to order for (admin and distributor)
    #[props(default)]
    pub clients: Vec<User>,
    /// Earliest delivery date
    pub today: NaiveDate,
}

#[component]
pub fn NewOrderPage(props: NewOrderPageProps) -> Element {
    let choices = order_choices(
        &props.products,
        props.price_list.as_ref(),
        &props.display,
        props.user.role.sees_prices(),
    );
    let min_date = props.today.format("%Y-%m-%d").to_string();
    let price_note = props
        .price_list
        .as_ref()
        .map(|l| format!("Prices from price list \"{}\"", l.name));
    let clients: Vec<(String, String)> = props
        .clients
        .iter()
        .filter(|c| c.active)
        .map(|c| (c.id.clone(), c.name.clone()))
        .collect();
    let needs_client = props.user.role != Role::Client;
    let lines: Vec<(&'static str, String, String)> = (0..ORDER_LINES)
        .map(|i| {
            let hint = if i == 0 { "Choose a product" } else { "(none)" };
            (hint, format!("line_{i}"), format!("qty_{i}"))
        })
        .collect();

    rsx! {
        Layout {
            title: "New order".to_string(),
            nav_active: "new-order".to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),

            hgroup {
                h1 { "New order" }
                if let Some(note) = price_note {
                    p { "{note}" }
                } else {
                    p { "Choose products, quantities and a delivery date" }
                }
            }

            form { method: "post", action: "/orders",
                if needs_client {
                    label {
                        "Client"
                        select { name: "client_id", required: true,
                            option { value: "", "Choose a client" }
                            for (id, name) in clients {
                                option { value: "{id}", "{name}" }
                            }
                        }
                    }
                }
                div { class: "grid",
                    label {
                        "Delivery date"
                        input { r#type: "date", name: "delivery_date", min: "{min_date}", required: true }
                    }
                    label {
                        "Delivery address"
                        input { r#type: "text", name: "delivery_address", placeholder: "Street, city" }
                    }
                }
                fieldset {
                    legend { "Items" }
                    for (hint, line, qty) in lines {
                        div { class: "grid", key: "{line}",
                            select { name: "{line}", "aria-label": "Product",
                                option { value: "", "{hint}" }
                                for choice in choices.iter() {
                                    option { value: "{choice.value}", "{choice.label}" }
                                }
                            }
                            input {
                                r#type: "number",
                                name: "{qty}",
                                min: "1",
                                placeholder: "Quantity",
                                "aria-label": "Quantity",
                            }
                        }
                    }
                }
                label {
                    "Notes"
                    textarea { name: "notes", rows: "2", placeholder: "Allergies, access instructions" }
                }
                button { r#type: "submit", "Place order" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptionItem, PriceListItem, PriceRule, ProductOption};
    use rust_decimal::Decimal;

    fn tray() -> Product {
        Product {
            id: "p-tray".into(),
            name: "Tray".into(),
            group: "Cold".into(),
            base_price: Decimal::new(2000, 2),
            unit: None,
            active: true,
            options: vec![ProductOption {
                id: "size".into(),
                name: "Size".into(),
                items: vec![OptionItem {
                    id: "opt-24".into(),
                    label: "24 pieces".into(),
                    base_price: Decimal::new(6400, 2),
                }],
            }],
        }
    }

    #[test]
    fn blank_filters_build_an_empty_query() {
        let filters = OrderFilters {
            production_status: "".into(),
            delivery_status: "bogus".into(),
            search: "  ".into(),
            ..Default::default()
        };
        assert_eq!(filters.to_query(), OrderQuery::default());
        assert_eq!(filters.query_string(), "");
    }

    #[test]
    fn filters_parse_statuses_and_dates() {
        let filters = OrderFilters {
            production_status: "COMPLETED".into(),
            delivery_date: "2026-03-14".into(),
            search: "harbor".into(),
            ..Default::default()
        };
        let query = filters.to_query();
        assert_eq!(query.production_status, Some(ProductionStatus::Completed));
        assert_eq!(query.delivery_date, NaiveDate::from_ymd_opt(2026, 3, 14));
        assert_eq!(query.search.as_deref(), Some("harbor"));
        assert_eq!(
            filters.query_string(),
            "production_status=COMPLETED&delivery_date=2026-03-14&search=harbor"
        );
    }

    #[test]
    fn choices_apply_price_list() {
        let list = PriceList {
            id: "pl".into(),
            name: "Wholesale".into(),
            description: None,
            items: vec![PriceListItem {
                option_item_id: "opt-24".into(),
                rule: PriceRule::Multiplier(Decimal::new(90, 2)),
            }],
            assigned_user_ids: vec![],
        };
        let choices = order_choices(&[tray()], Some(&list), &DisplayFormat::default(), true);
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].value, "p-tray:opt-24");
        assert!(choices[0].label.ends_with("€57.60"), "{}", choices[0].label);
    }

    #[test]
    fn choices_hide_prices_when_not_allowed() {
        let choices = order_choices(&[tray()], None, &DisplayFormat::default(), false);
        assert!(!choices[0].label.contains('€'));
    }
}
