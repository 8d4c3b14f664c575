//! Analytics: revenue summary, revenue per product group, customer KPIs.

use dioxus::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::{AnalyticsReport, User};
use crate::format::{percent, DisplayFormat};
use crate::ui::components::{Flash, Layout};

#[derive(Props, Clone, PartialEq)]
pub struct AnalyticsPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub display: DisplayFormat,
    pub report: AnalyticsReport,
    /// Range as entered (`YYYY-MM-DD`, may be blank)
    #[props(default)]
    pub from: String,
    #[props(default)]
    pub to: String,
}

#[component]
pub fn AnalyticsPage(props: AnalyticsPageProps) -> Element {
    let display = &props.display;
    let summary = &props.report.summary;
    let revenue = display.money(summary.total_revenue);
    let orders = summary.order_count;
    let average = display.money(summary.average_order_value);
    let delivered = percent(summary.delivered_ratio);

    let top = props
        .report
        .revenue_by_group
        .first()
        .map(|g| g.revenue)
        .unwrap_or_default();
    let groups: Vec<(String, String, u64, u32, String)> = props
        .report
        .revenue_by_group
        .iter()
        .map(|g| {
            let share = if top.is_zero() {
                0
            } else {
                (g.revenue * Decimal::ONE_HUNDRED / top)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            };
            (
                g.group.clone(),
                display.money(g.revenue),
                g.quantity,
                g.orders,
                share.to_string(),
            )
        })
        .collect();
    let customers: Vec<(String, String, u32, String, String, String)> = props
        .report
        .customers
        .iter()
        .map(|c| {
            (
                c.client_id.clone(),
                c.client_name.clone(),
                c.order_count,
                display.money(c.revenue),
                display.money(c.average_order_value),
                c.last_order_date
                    .map(|d| display.date(d))
                    .unwrap_or_else(|| "-".to_string()),
            )
        })
        .collect();

    rsx! {
        Layout {
            title: "Analytics".to_string(),
            nav_active: "analytics".to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),

            h1 { "Analytics" }
            form { method: "get", action: "/analytics", class: "filters",
                label {
                    "From"
                    input { r#type: "date", name: "from", value: "{props.from}" }
                }
                label {
                    "To"
                    input { r#type: "date", name: "to", value: "{props.to}" }
                }
                button { r#type: "submit", "Apply" }
            }

            div { class: "stat-grid",
                article { strong { "{revenue}" } small { "Revenue" } }
                article { strong { "{orders}" } small { "Orders" } }
                article { strong { "{average}" } small { "Average order" } }
                article { strong { "{delivered}" } small { "Delivered" } }
            }

            section {
                h2 { "Revenue by product group" }
                if groups.is_empty() {
                    p { small { "No revenue in this range." } }
                } else {
                    figure {
                        table {
                            thead {
                                tr {
                                    th { "Group" }
                                    th { "Revenue" }
                                    th { "Units" }
                                    th { "Orders" }
                                    th { "" }
                                }
                            }
                            tbody {
                                for (group, revenue, quantity, orders, share) in groups {
                                    tr { key: "{group}",
                                        td { "{group}" }
                                        td { "{revenue}" }
                                        td { "{quantity}" }
                                        td { "{orders}" }
                                        td { progress { value: "{share}", max: "100" } }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            section {
                h2 { "Customers" }
                if customers.is_empty() {
                    p { small { "No orders in this range." } }
                } else {
                    figure {
                        table {
                            thead {
                                tr {
                                    th { "Client" }
                                    th { "Orders" }
                                    th { "Revenue" }
                                    th { "Average order" }
                                    th { "Last delivery" }
                                }
                            }
                            tbody {
                                for (id, name, count, revenue, average, last) in customers {
                                    tr { key: "{id}",
                                        td { "{name}" }
                                        td { "{count}" }
                                        td { "{revenue}" }
                                        td { "{average}" }
                                        td { "{last}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
