//! Product catalogue with activation toggles.

use dioxus::prelude::*;

use crate::domain::{Product, Role, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout};

#[derive(Debug, Clone, PartialEq)]
struct ProductRow {
    id: String,
    name: String,
    group: String,
    price: String,
    options: Vec<String>,
    active: bool,
    /// Value posted by the toggle
    toggle_to: &'static str,
    toggle_label: &'static str,
}

fn product_rows(products: &[Product], display: &DisplayFormat) -> Vec<ProductRow> {
    let mut rows: Vec<ProductRow> = products
        .iter()
        .map(|p| {
            let unit = p.unit.as_deref().map(|u| format!(" / {u}")).unwrap_or_default();
            ProductRow {
                id: p.id.clone(),
                name: p.name.clone(),
                group: p.group.clone(),
                price: format!("{}{unit}", display.money(p.base_price)),
                options: p
                    .option_items()
                    .map(|item| format!("{} {}", item.label, display.money(item.base_price)))
                    .collect(),
                active: p.active,
                toggle_to: if p.active { "false" } else { "true" },
                toggle_label: if p.active { "Deactivate" } else { "Activate" },
            }
        })
        .collect();
    rows.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[component]
pub fn ProductsPage(
    user: User,
    flash: Option<Flash>,
    display: DisplayFormat,
    products: Vec<Product>,
) -> Element {
    let editable = user.role == Role::Admin;
    let rows = product_rows(&products, &display);
    let active = rows.iter().filter(|r| r.active).count();
    let total = rows.len();

    rsx! {
        Layout {
            title: "Products".to_string(),
            nav_active: "products".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("catalog".to_string()),

            hgroup {
                h1 { "Products" }
                p { "{active} of {total} active" }
            }
            figure {
                table {
                    thead {
                        tr {
                            th { "Product" }
                            th { "Group" }
                            th { "Base price" }
                            th { "Options" }
                            th { "Status" }
                            if editable {
                                th { "" }
                            }
                        }
                    }
                    tbody {
                        for row in rows {
                            tr { key: "{row.id}",
                                td { "{row.name}" }
                                td { "{row.group}" }
                                td { "{row.price}" }
                                td {
                                    for option in row.options.iter() {
                                        div { small { "{option}" } }
                                    }
                                }
                                td {
                                    if row.active {
                                        mark { class: "badge-success", "Active" }
                                    } else {
                                        mark { class: "badge-neutral", "Inactive" }
                                    }
                                }
                                if editable {
                                    td {
                                        form {
                                            method: "post",
                                            action: "/products/{row.id}/active",
                                            class: "inline",
                                            input { r#type: "hidden", name: "active", value: row.toggle_to }
                                            input { r#type: "hidden", name: "return_to", value: "/products" }
                                            button { r#type: "submit", class: "secondary outline", "{row.toggle_label}" }
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
}
