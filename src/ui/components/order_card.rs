//! Order card: header badges, item table and the role's action buttons.
//!
//! An order whose items are all cancelled shows a single Cancelled badge
//! and no actions at all.

use dioxus::prelude::*;

use super::status::{DeliveryBadge, ProductionBadge, ProgressSummary};
use crate::domain::{DeliveryStatus, Order, ProductionStatus, Progress, Role};
use crate::format::DisplayFormat;

pub fn production_action_label(status: ProductionStatus) -> &'static str {
    match status {
        ProductionStatus::Completed => "Completed",
        ProductionStatus::PartiallyCompleted => "Partial",
        ProductionStatus::Cancelled => "Failed",
        ProductionStatus::Pending => "Reset",
    }
}

pub fn delivery_action_label(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::ReadyForDelivery => "Ready again",
        DeliveryStatus::Delivered => "Delivered",
        DeliveryStatus::PartiallyDelivered => "Partial",
        DeliveryStatus::Failed => "Failed",
        DeliveryStatus::Cancelled => "Cancel delivery",
        DeliveryStatus::Pending => "Pending",
    }
}

fn button_class(label: &str) -> &'static str {
    match label {
        "Failed" | "Cancel delivery" => "secondary",
        "Partial" => "contrast outline",
        _ => "",
    }
}

#[derive(Clone, PartialEq)]
struct ItemRow {
    id: String,
    name: String,
    quantity: String,
    price: Option<String>,
    production: ProductionStatus,
    delivery: DeliveryStatus,
    /// (wire value, label, css class)
    production_actions: Vec<(&'static str, &'static str, &'static str)>,
    /// Upper bound for a partial produced quantity
    partial_max: Option<u32>,
    delivery_actions: Vec<(&'static str, &'static str, &'static str)>,
}

#[derive(Props, Clone, PartialEq)]
pub struct OrderCardProps {
    pub order: Order,
    /// Role of the viewer; decides which actions are offered
    pub role: Role,
    pub display: DisplayFormat,
    /// Only show items of this product group (chef board)
    #[props(default)]
    pub group: Option<String>,
    /// Path action forms redirect back to
    pub return_to: String,
}

fn item_rows(props: &OrderCardProps, cancelled: bool) -> Vec<ItemRow> {
    let order = &props.order;
    let kitchen = matches!(props.role, Role::Chef | Role::Admin) && !cancelled;
    let dispatch = props.role == Role::Driver && !cancelled;

    order
        .items
        .iter()
        .filter(|item| {
            props
                .group
                .as_deref()
                .is_none_or(|g| item.product_group.eq_ignore_ascii_case(g))
        })
        .map(|item| {
            let name = match item.option_label.as_deref() {
                Some(option) => format!("{} ({option})", item.product_name),
                None => item.product_name.clone(),
            };
            let quantity = match item.production_status {
                ProductionStatus::PartiallyCompleted => {
                    format!("{} / {}", item.produced_quantity, item.quantity)
                }
                _ => item.quantity.to_string(),
            };
            let production_actions = if kitchen {
                item.production_actions()
                    .into_iter()
                    .filter(|s| *s != ProductionStatus::PartiallyCompleted || item.quantity > 1)
                    .map(|s| {
                        let label = production_action_label(s);
                        (s.as_str(), label, button_class(label))
                    })
                    .collect()
            } else {
                Vec::new()
            };
            let delivery_actions = if dispatch && !item.is_cancelled() {
                [DeliveryStatus::Delivered, DeliveryStatus::Failed]
                    .into_iter()
                    .filter(|s| item.delivery_status.can_transition_to(*s))
                    .map(|s| {
                        let label = delivery_action_label(s);
                        (s.as_str(), label, button_class(label))
                    })
                    .collect()
            } else {
                Vec::new()
            };
            ItemRow {
                id: item.id.clone(),
                name,
                quantity,
                price: props
                    .role
                    .sees_prices()
                    .then(|| props.display.money(item.line_total())),
                production: item.production_status,
                delivery: item.delivery_status,
                production_actions,
                partial_max: (item.quantity > 1).then(|| item.quantity - 1),
                delivery_actions,
            }
        })
        .collect()
}

/// Order card component.
#[component]
pub fn OrderCard(props: OrderCardProps) -> Element {
    let order = &props.order;
    let cancelled = order.is_cancelled();
    let rows = item_rows(&props, cancelled);
    let progress = Progress::from_items(order.items.iter().filter(|item| {
        props
            .group
            .as_deref()
            .is_none_or(|g| item.product_group.eq_ignore_ascii_case(g))
    }));

    let order_id = order.id.clone();
    let number = order.order_number.clone();
    let client = order.client.name.clone();
    let date = props.display.date(order.delivery_date);
    let address = order.delivery_address.clone();
    let notes = order.notes.clone();
    let return_to = props.return_to.clone();
    let shows_prices = props.role.sees_prices();
    let total = shows_prices.then(|| props.display.money(order.total));
    let production_status = order.display_production_status();
    let delivery_status = order.delivery_status;

    let order_actions: Vec<(&'static str, &'static str, &'static str)> =
        if !cancelled && matches!(props.role, Role::Driver | Role::Admin) {
            order
                .delivery_actions()
                .into_iter()
                .map(|s| {
                    let label = delivery_action_label(s);
                    (s.as_str(), label, button_class(label))
                })
                .collect()
        } else {
            Vec::new()
        };
    let can_cancel = !cancelled && order.can_be_cancelled_by(props.role);
    let has_item_actions = rows
        .iter()
        .any(|r| !r.production_actions.is_empty() || !r.delivery_actions.is_empty());

    rsx! {
        article {
            class: if cancelled { "order-card cancelled" } else { "order-card" },
            id: "order-{order_id}",
            "data-order-id": "{order_id}",
            header { class: "order-head",
                div {
                    a { href: "/orders/{order_id}", strong { "{number}" } }
                    span { " · {client} · {date}" }
                }
                div { class: "badges",
                    if cancelled {
                        ProductionBadge { status: ProductionStatus::Cancelled }
                    } else {
                        ProductionBadge { status: production_status }
                        DeliveryBadge { status: delivery_status }
                    }
                }
            }
            if let Some(address) = address {
                p { small { "Deliver to {address}" } }
            }
            if let Some(notes) = notes {
                p { small { class: "notes", "{notes}" } }
            }
            if !cancelled {
                ProgressSummary { progress }
            }
            table { class: "items",
                thead {
                    tr {
                        th { "Item" }
                        th { "Qty" }
                        if shows_prices {
                            th { "Amount" }
                        }
                        th { "Production" }
                        th { "Delivery" }
                        if has_item_actions {
                            th { "" }
                        }
                    }
                }
                tbody {
                    for row in rows {
                        tr { key: "{row.id}", "data-item-id": "{row.id}",
                            td { "{row.name}" }
                            td { "{row.quantity}" }
                            if let Some(price) = row.price.clone() {
                                td { "{price}" }
                            }
                            td { ProductionBadge { status: row.production } }
                            td { DeliveryBadge { status: row.delivery } }
                            if has_item_actions {
                                td { class: "actions",
                                    for (code, label, class) in row.production_actions.iter().copied() {
                                        form {
                                            method: "post",
                                            action: "/orders/{order_id}/items/{row.id}/production",
                                            class: "inline",
                                            input { r#type: "hidden", name: "status", value: code }
                                            input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                            if code == "PARTIALLY_COMPLETED" {
                                                if let Some(max) = row.partial_max {
                                                    input {
                                                        r#type: "number",
                                                        name: "produced_quantity",
                                                        min: "1",
                                                        max: "{max}",
                                                        required: true,
                                                        placeholder: "Made",
                                                        "aria-label": "Produced quantity",
                                                    }
                                                }
                                            }
                                            button { r#type: "submit", class: class, "{label}" }
                                        }
                                    }
                                    for (code, label, class) in row.delivery_actions.iter().copied() {
                                        form {
                                            method: "post",
                                            action: "/orders/{order_id}/items/{row.id}/delivery",
                                            class: "inline",
                                            input { r#type: "hidden", name: "status", value: code }
                                            input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                            button { r#type: "submit", class: class, "{label}" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if !order_actions.is_empty() || can_cancel || total.is_some() {
                footer { class: "order-foot",
                    if let Some(total) = total {
                        span { class: "total", "Total " strong { "{total}" } }
                    }
                    div { class: "controls",
                        for (code, label, class) in order_actions.iter().copied() {
                            form {
                                method: "post",
                                action: "/orders/{order_id}/delivery",
                                class: "inline",
                                input { r#type: "hidden", name: "status", value: code }
                                input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                if code == "PARTIALLY_DELIVERED" || code == "FAILED" {
                                    input {
                                        r#type: "text",
                                        name: "note",
                                        placeholder: "Note",
                                        "aria-label": "Delivery note",
                                    }
                                }
                                button { r#type: "submit", class: class, "{label}" }
                            }
                        }
                        if can_cancel {
                            form {
                                method: "post",
                                action: "/orders/{order_id}/cancel",
                                class: "inline",
                                input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                button { r#type: "submit", class: "secondary outline", "Cancel order" }
                            }
                        }
                    }
                }
            }
        }
    }
}
