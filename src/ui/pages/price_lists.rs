//! Price lists: overview, item editor and assignment.

use dioxus::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{PriceList, PriceRule, Product, User};
use crate::format::DisplayFormat;
use crate::ui::components::{Flash, Layout};

#[component]
pub fn PriceListsPage(user: User, flash: Option<Flash>, price_lists: Vec<PriceList>) -> Element {
    let rows: Vec<(String, String, String, usize, usize)> = price_lists
        .iter()
        .map(|l| {
            (
                l.id.clone(),
                l.name.clone(),
                l.description.clone().unwrap_or_default(),
                l.items.len(),
                l.assigned_user_ids.len(),
            )
        })
        .collect();

    rsx! {
        Layout {
            title: "Price lists".to_string(),
            nav_active: "price-lists".to_string(),
            user: Some(user.clone()),
            flash,
            live: Some("catalog".to_string()),

            h1 { "Price lists" }
            if rows.is_empty() {
                p { small { "No price lists yet." } }
            } else {
                figure {
                    table {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Description" }
                                th { "Overrides" }
                                th { "Assigned" }
                            }
                        }
                        tbody {
                            for (id, name, description, items, assigned) in rows {
                                tr { key: "{id}",
                                    td { a { href: "/price-lists/{id}", "{name}" } }
                                    td { small { "{description}" } }
                                    td { "{items}" }
                                    td { "{assigned}" }
                                }
                            }
                        }
                    }
                }
            }

            article {
                header { strong { "New price list" } }
                form { method: "post", action: "/price-lists",
                    div { class: "grid",
                        label {
                            "Name"
                            input { r#type: "text", name: "name", required: true }
                        }
                        label {
                            "Description"
                            input { r#type: "text", name: "description" }
                        }
                    }
                    button { r#type: "submit", "Create" }
                }
            }
        }
    }
}

/// One option item of the catalogue as seen through a price list
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOption {
    pub option_item_id: String,
    pub label: String,
    pub base: String,
    /// "Fixed €29.00" / "× 0.90"; empty without override
    pub rule: String,
    pub effective: String,
    pub overridden: bool,
}

/// Every option item of every product, priced through `list`
pub fn priced_options(
    products: &[Product],
    list: &PriceList,
    display: &DisplayFormat,
) -> Vec<PricedOption> {
    products
        .iter()
        .flat_map(|product| {
            product.option_items().map(move |item| {
                let rule = list.rule_for(&item.id);
                PricedOption {
                    option_item_id: item.id.clone(),
                    label: format!("{}, {}", product.name, item.label),
                    base: display.money(item.base_price),
                    rule: match rule {
                        Some(PriceRule::Fixed(price)) => format!("Fixed {}", display.money(price)),
                        Some(PriceRule::Multiplier(factor)) => format!("× {}", factor.normalize()),
                        None => String::new(),
                    },
                    effective: display.money(list.effective_price(&item.id, item.base_price)),
                    overridden: rule.is_some(),
                }
            })
        })
        .collect()
}

#[derive(Props, Clone, PartialEq)]
pub struct PriceListPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub display: DisplayFormat,
    pub price_list: PriceList,
    pub products: Vec<Product>,
    /// Clients and distributors the list can be assigned to
    #[props(default)]
    pub assignable: Vec<User>,
}

#[component]
pub fn PriceListPage(props: PriceListPageProps) -> Element {
    let list = &props.price_list;
    let list_id = list.id.clone();
    let name = list.name.clone();
    let description = list.description.clone();
    let options = priced_options(&props.products, list, &props.display);
    let overridden: Vec<PricedOption> = options.iter().filter(|o| o.overridden).cloned().collect();
    let choices: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.option_item_id.clone(), format!("{} ({})", o.label, o.base)))
        .collect();
    let assigned: Vec<String> = props
        .assignable
        .iter()
        .filter(|u| list.assigned_user_ids.contains(&u.id))
        .map(|u| format!("{} ({})", u.name, u.role.label()))
        .collect();
    let candidates: Vec<(String, String)> = props
        .assignable
        .iter()
        .filter(|u| !list.assigned_user_ids.contains(&u.id))
        .map(|u| (u.id.clone(), format!("{} ({})", u.name, u.role.label())))
        .collect();
    let return_to = format!("/price-lists/{list_id}");
    let example = Decimal::new(90, 2).to_string();

    rsx! {
        Layout {
            title: name.clone(),
            nav_active: "price-lists".to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),
            live: Some("catalog".to_string()),

            nav { "aria-label": "breadcrumb",
                ul {
                    li { a { href: "/price-lists", "Price lists" } }
                    li { "{name}" }
                }
            }
            hgroup {
                h1 { "{name}" }
                if let Some(description) = description {
                    p { "{description}" }
                }
            }

            section {
                h2 { "Overrides" }
                if overridden.is_empty() {
                    p { small { "Every option item is sold at its base price." } }
                } else {
                    figure {
                        table {
                            thead {
                                tr {
                                    th { "Option item" }
                                    th { "Base" }
                                    th { "Rule" }
                                    th { "Effective" }
                                    th { "" }
                                }
                            }
                            tbody {
                                for option in overridden {
                                    tr { key: "{option.option_item_id}",
                                        td { "{option.label}" }
                                        td { "{option.base}" }
                                        td { "{option.rule}" }
                                        td { strong { "{option.effective}" } }
                                        td {
                                            form {
                                                method: "post",
                                                action: "/price-lists/{list_id}/items/{option.option_item_id}/remove",
                                                class: "inline",
                                                input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                                button { r#type: "submit", class: "secondary outline", "Remove" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            article {
                header { strong { "Set a price" } }
                form { method: "post", action: "/price-lists/{list_id}/items",
                    label {
                        "Option item"
                        select { name: "option_item_id", required: true,
                            option { value: "", "Choose an option item" }
                            for (id, label) in choices {
                                option { value: "{id}", "{label}" }
                            }
                        }
                    }
                    div { class: "grid",
                        label {
                            "Rule"
                            select { name: "kind",
                                option { value: "fixed", "Fixed price" }
                                option { value: "multiplier", "Multiplier" }
                            }
                        }
                        label {
                            "Value"
                            input {
                                r#type: "number",
                                name: "value",
                                step: "0.01",
                                min: "0",
                                required: true,
                                placeholder: "{example}",
                            }
                        }
                    }
                    input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                    button { r#type: "submit", "Save" }
                }
            }

            section {
                h2 { "Assigned to" }
                if assigned.is_empty() {
                    p { small { "Nobody uses this list yet." } }
                } else {
                    ul {
                        for who in assigned {
                            li { "{who}" }
                        }
                    }
                }
                if !candidates.is_empty() {
                    form { method: "post", action: "/price-lists/{list_id}/assign", class: "filters",
                        label {
                            "Assign to"
                            select { name: "user_id", required: true,
                                for (id, label) in candidates {
                                    option { value: "{id}", "{label}" }
                                }
                            }
                        }
                        input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                        button { r#type: "submit", "Assign" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptionItem, PriceListItem, ProductOption};

    #[test]
    fn priced_options_show_rule_and_effective_price() {
        let product = Product {
            id: "p-tart".into(),
            name: "Fruit tart".into(),
            group: "Pastry".into(),
            base_price: Decimal::new(3200, 2),
            unit: None,
            active: true,
            options: vec![ProductOption {
                id: "size".into(),
                name: "Size".into(),
                items: vec![
                    OptionItem {
                        id: "opt-6".into(),
                        label: "6 slices".into(),
                        base_price: Decimal::new(2000, 2),
                    },
                    OptionItem {
                        id: "opt-10".into(),
                        label: "10 slices".into(),
                        base_price: Decimal::new(3200, 2),
                    },
                ],
            }],
        };
        let list = PriceList {
            id: "pl".into(),
            name: "Wholesale".into(),
            description: None,
            items: vec![PriceListItem {
                option_item_id: "opt-10".into(),
                rule: PriceRule::Fixed(Decimal::new(2900, 2)),
            }],
            assigned_user_ids: vec![],
        };
        let options = priced_options(&[product], &list, &DisplayFormat::default());
        assert_eq!(options.len(), 2);
        assert!(!options[0].overridden);
        assert_eq!(options[0].effective, "€20.00");
        assert_eq!(options[1].rule, "Fixed €29.00");
        assert_eq!(options[1].effective, "€29.00");
    }
}
