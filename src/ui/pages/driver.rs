//! Delivery run for one date.

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::domain::{DeliveryStatus, Order, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout, OrderCard};

/// Orders due on `date`, open runs first
pub fn run_orders(orders: &[Order], date: NaiveDate) -> Vec<Order> {
    let mut run: Vec<Order> = orders
        .iter()
        .filter(|o| o.delivery_date == date && !o.is_cancelled())
        .cloned()
        .collect();
    run.sort_by_key(|o| (o.delivery_status.is_terminal(), o.order_number.clone()));
    run
}

#[component]
pub fn DriverPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    orders: Vec<Order>,
    date: NaiveDate,
) -> Element {
    let run = run_orders(&orders, date);
    let open = run
        .iter()
        .filter(|o| {
            matches!(
                o.delivery_status,
                DeliveryStatus::ReadyForDelivery | DeliveryStatus::Failed
            )
        })
        .count();
    let done = run.len() - open;
    let day = display.date(date);
    let date_value = date.format("%Y-%m-%d").to_string();
    let return_to = format!("/driver?date={date_value}");
    let role = user.role;

    rsx! {
        Layout {
            title: "Deliveries".to_string(),
            nav_active: "deliveries".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("orders".to_string()),

            hgroup {
                h1 { "Deliveries for {day}" }
                p { "{open} to deliver · {done} done" }
            }
            form { method: "get", action: "/driver", class: "filters",
                label {
                    "Date"
                    input { r#type: "date", name: "date", value: "{date_value}" }
                }
                button { r#type: "submit", "Show" }
            }

            if run.is_empty() {
                p { small { "No deliveries scheduled." } }
            } else {
                div { class: "order-grid",
                    for order in run {
                        OrderCard {
                            key: "{order.id}",
                            order: order.clone(),
                            role,
                            display: display.clone(),
                            return_to: return_to.clone(),
                        }
                    }
                }
            }
        }
    }
}
