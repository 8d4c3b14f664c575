//! Distributor overview: own clients and their orders.

use dioxus::prelude::*;
use rust_decimal::Decimal;

use super::admin::{OrderRow, OrderTable, StatusCountGrid, StatusCounts};
use crate::domain::{Order, PriceList, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout};

#[derive(Debug, Clone, PartialEq)]
struct ClientSummary {
    id: String,
    name: String,
    email: String,
    orders: usize,
    revenue: String,
    price_list: String,
}

#[component]
pub fn DistributorPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    orders: Vec<Order>,
    clients: Vec<User>,
    price_lists: Vec<PriceList>,
) -> Element {
    let counts = StatusCounts::from_orders(&orders);
    let summaries: Vec<ClientSummary> = clients
        .iter()
        .map(|c| {
            let own: Vec<&Order> = orders.iter().filter(|o| o.client.id == c.id).collect();
            let revenue = own
                .iter()
                .filter(|o| !o.is_cancelled())
                .map(|o| o.total)
                .sum::<Decimal>();
            ClientSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                email: c.email.clone(),
                orders: own.len(),
                revenue: display.money(revenue),
                price_list: c
                    .price_list_id
                    .as_deref()
                    .and_then(|id| price_lists.iter().find(|l| l.id == id))
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "Base prices".to_string()),
            }
        })
        .collect();
    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let rows: Vec<OrderRow> = recent
        .into_iter()
        .take(20)
        .map(|o| OrderRow::new(o, &display, true))
        .collect();
    let client_count = summaries.len();

    rsx! {
        Layout {
            title: "Overview".to_string(),
            nav_active: "overview".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("orders".to_string()),

            hgroup {
                h1 { "Overview" }
                p { "{client_count} clients" }
            }
            StatusCountGrid { counts }

            section {
                h2 { "Clients" }
                if summaries.is_empty() {
                    p { small { "No clients yet." } }
                } else {
                    figure {
                        table {
                            thead {
                                tr {
                                    th { "Client" }
                                    th { "Orders" }
                                    th { "Revenue" }
                                    th { "Price list" }
                                }
                            }
                            tbody {
                                for client in summaries {
                                    tr { key: "{client.id}",
                                        td { "{client.name}" br {} small { "{client.email}" } }
                                        td { "{client.orders}" }
                                        td { "{client.revenue}" }
                                        td { "{client.price_list}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            section {
                h2 { "Recent orders" }
                if rows.is_empty() {
                    p { small { "No orders yet." } }
                } else {
                    OrderTable { rows }
                }
            }
        }
    }
}
