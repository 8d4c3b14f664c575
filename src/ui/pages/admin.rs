//! Admin overview: status counts and the day's orders.

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::domain::{DeliveryStatus, Order, ProductionStatus, User};
use crate::format::DisplayFormat;
use crate::ui::components::{DeliveryBadge, Flash, Layout, ProductionBadge};

/// Orders per production and delivery status
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusCounts {
    pub production: Vec<(ProductionStatus, usize)>,
    pub delivery: Vec<(DeliveryStatus, usize)>,
}

impl StatusCounts {
    pub fn from_orders(orders: &[Order]) -> Self {
        let production = ProductionStatus::ALL
            .iter()
            .map(|s| {
                (
                    *s,
                    orders
                        .iter()
                        .filter(|o| o.display_production_status() == *s)
                        .count(),
                )
            })
            .collect();
        let delivery = DeliveryStatus::ALL
            .iter()
            .map(|s| (*s, orders.iter().filter(|o| o.delivery_status == *s).count()))
            .collect();
        Self {
            production,
            delivery,
        }
    }
}

#[component]
pub fn StatusCountGrid(counts: StatusCounts) -> Element {
    rsx! {
        section {
            h3 { "Production" }
            div { class: "stat-grid",
                for (status, count) in counts.production.iter().copied() {
                    article { key: "{status}",
                        strong { "{count}" }
                        ProductionBadge { status }
                    }
                }
            }
            h3 { "Delivery" }
            div { class: "stat-grid",
                for (status, count) in counts.delivery.iter().copied() {
                    article { key: "{status}",
                        strong { "{count}" }
                        DeliveryBadge { status }
                    }
                }
            }
        }
    }
}

/// Compact order table row data
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub id: String,
    pub number: String,
    pub client: String,
    pub date: String,
    pub items: usize,
    pub total: Option<String>,
    pub production: ProductionStatus,
    pub delivery: DeliveryStatus,
}

impl OrderRow {
    pub fn new(order: &Order, display: &DisplayFormat, with_total: bool) -> Self {
        Self {
            id: order.id.clone(),
            number: order.order_number.clone(),
            client: order.client.name.clone(),
            date: display.date(order.delivery_date),
            items: order.items.len(),
            total: with_total.then(|| display.money(order.total)),
            production: if order.is_cancelled() {
                ProductionStatus::Cancelled
            } else {
                order.display_production_status()
            },
            delivery: order.delivery_status,
        }
    }
}

#[component]
pub fn AdminOverviewPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    orders: Vec<Order>,
    today: NaiveDate,
) -> Element {
    let counts = StatusCounts::from_orders(&orders);
    let todays: Vec<OrderRow> = orders
        .iter()
        .filter(|o| o.delivery_date == today)
        .map(|o| OrderRow::new(o, &display, true))
        .collect();
    let total_orders = orders.len();
    let today_text = display.date(today);

    rsx! {
        Layout {
            title: "Overview".to_string(),
            nav_active: "overview".to_string(),
            user: Some(user),
            flash,
            live: Some("orders".to_string()),

            hgroup {
                h1 { "Overview" }
                p { "{total_orders} orders across all clients" }
            }
            StatusCountGrid { counts }

            section {
                h2 { "Deliveries for {today_text}" }
                if todays.is_empty() {
                    p { small { "No orders are due today." } }
                } else {
                    OrderTable { rows: todays }
                }
            }
        }
    }
}

#[component]
pub fn OrderTable(rows: Vec<OrderRow>) -> Element {
    let with_total = rows.iter().any(|r| r.total.is_some());
    rsx! {
        figure {
            table {
                thead {
                    tr {
                        th { "Order" }
                        th { "Client" }
                        th { "Delivery" }
                        th { "Items" }
                        if with_total {
                            th { "Total" }
                        }
                        th { "Production" }
                        th { "Dispatch" }
                    }
                }
                tbody {
                    for row in rows {
                        tr { key: "{row.id}",
                            td { a { href: "/orders/{row.id}", "{row.number}" } }
                            td { "{row.client}" }
                            td { "{row.date}" }
                            td { "{row.items}" }
                            if let Some(total) = row.total.clone() {
                                td { "{total}" }
                            }
                            td { ProductionBadge { status: row.production } }
                            td { DeliveryBadge { status: row.delivery } }
                        }
                    }
                }
            }
        }
    }
}
