//! Production board for one kitchen station (product group).

use dioxus::prelude::*;

use crate::domain::{Order, Progress, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout, OrderCard, ProgressSummary};

/// Orders with at least one item of `group`, open work first
pub fn board_orders(orders: &[Order], group: &str) -> Vec<Order> {
    let mut board: Vec<Order> = orders
        .iter()
        .filter(|o| o.has_group(group))
        .cloned()
        .collect();
    board.sort_by_key(|o| {
        let done = Progress::from_items(o.items_for_group(group)).is_done();
        (done, o.delivery_date)
    });
    board
}

/// Item counts across the whole board
pub fn board_progress(orders: &[Order], group: &str) -> Progress {
    Progress::from_items(orders.iter().flat_map(|o| o.items_for_group(group)))
}

#[derive(Props, Clone, PartialEq)]
pub struct ChefBoardPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub display: DisplayFormat,
    pub orders: Vec<Order>,
    /// Station shown
    pub group: String,
    /// Stations an admin can switch between; empty for chefs
    #[props(default)]
    pub groups: Vec<String>,
    /// Delivery date filter as entered
    #[props(default)]
    pub date: String,
}

#[component]
pub fn ChefBoardPage(props: ChefBoardPageProps) -> Element {
    let group = props.group.clone();
    let board = board_orders(&props.orders, &group);
    let progress = board_progress(&board, &group);
    let role = props.user.role;
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    if !props.groups.is_empty() {
        params.append_pair("group", &group);
    }
    if !props.date.is_empty() {
        params.append_pair("date", &props.date);
    }
    let query = params.finish();
    let return_to = if query.is_empty() {
        "/chef".to_string()
    } else {
        format!("/chef?{query}")
    };
    let stations: Vec<(String, bool)> = props
        .groups
        .iter()
        .map(|g| (g.clone(), g.eq_ignore_ascii_case(&group)))
        .collect();
    let count = board.len();

    rsx! {
        Layout {
            title: format!("{group} station"),
            nav_active: "production".to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),
            live: Some("orders".to_string()),

            hgroup {
                h1 { "{group} station" }
                p { "{count} orders with {group} items" }
            }
            form { method: "get", action: "/chef", class: "filters",
                if !stations.is_empty() {
                    label {
                        "Station"
                        select { name: "group",
                            for (name, selected) in stations {
                                option { value: "{name}", selected, "{name}" }
                            }
                        }
                    }
                }
                label {
                    "Delivery date"
                    input { r#type: "date", name: "date", value: "{props.date}" }
                }
                button { r#type: "submit", "Show" }
            }
            ProgressSummary { progress }

            if board.is_empty() {
                p { small { "Nothing to prepare." } }
            } else {
                div { class: "order-grid",
                    for order in board {
                        OrderCard {
                            key: "{order.id}",
                            order: order.clone(),
                            role,
                            display: props.display.clone(),
                            group: Some(group.clone()),
                            return_to: return_to.clone(),
                        }
                    }
                }
            }
        }
    }
}
