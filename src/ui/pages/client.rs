//! Client's own orders.

use dioxus::prelude::*;

use crate::domain::{Order, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout, OrderCard};

#[component]
pub fn ClientOrdersPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    orders: Vec<Order>,
) -> Element {
    let role = user.role;
    let (mut open, mut past): (Vec<Order>, Vec<Order>) = orders
        .into_iter()
        .partition(|o| !o.is_cancelled() && !o.delivery_status.is_terminal());
    open.sort_by_key(|o| o.delivery_date);
    past.sort_by(|a, b| b.delivery_date.cmp(&a.delivery_date));
    let name = user.name.clone();

    rsx! {
        Layout {
            title: "My orders".to_string(),
            nav_active: "my-orders".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("orders".to_string()),

            hgroup {
                h1 { "My orders" }
                p { "{name}" }
            }
            p { a { href: "/orders/new", role: "button", "New order" } }

            section {
                h2 { "Upcoming" }
                if open.is_empty() {
                    p { small { "No upcoming orders." } }
                } else {
                    div { class: "order-grid",
                        for order in open {
                            OrderCard {
                                key: "{order.id}",
                                order: order.clone(),
                                role,
                                display: display.clone(),
                                return_to: "/client".to_string(),
                            }
                        }
                    }
                }
            }
            if !past.is_empty() {
                section {
                    h2 { "History" }
                    div { class: "order-grid",
                        for order in past {
                            OrderCard {
                                key: "{order.id}",
                                order: order.clone(),
                                role,
                                display: display.clone(),
                                return_to: "/client".to_string(),
                            }
                        }
                    }
                }
            }
        }
    }
}
