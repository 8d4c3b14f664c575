//! User management: accounts, activation and price list assignment.
//!
//! Admins see everyone and may create any role. Distributors see and
//! create only their own clients.

use dioxus::prelude::*;

use crate::domain::{PriceList, Role, User};
use crate::ui::components::{Flash, Layout};

#[derive(Debug, Clone, PartialEq)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: &'static str,
    detail: String,
    active: bool,
    price_list_id: String,
    assignable: bool,
    toggle_to: &'static str,
    toggle_label: &'static str,
}

fn user_rows(users: &[User], price_lists: &[PriceList], viewer: &User) -> Vec<UserRow> {
    users
        .iter()
        .filter(|u| u.id != viewer.id)
        .map(|u| {
            let detail = match u.role {
                Role::Chef => u
                    .product_group
                    .as_deref()
                    .map(|g| format!("Station {g}"))
                    .unwrap_or_default(),
                Role::Client => u
                    .distributor_id
                    .as_deref()
                    .and_then(|id| users.iter().find(|d| d.id == id))
                    .map(|d| format!("via {}", d.name))
                    .unwrap_or_default(),
                _ => String::new(),
            };
            let price_list_id = u.price_list_id.clone().unwrap_or_default();
            UserRow {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role.label(),
                detail,
                active: u.active,
                price_list_id,
                assignable: matches!(u.role, Role::Client | Role::Distributor)
                    && !price_lists.is_empty(),
                toggle_to: if u.active { "false" } else { "true" },
                toggle_label: if u.active { "Deactivate" } else { "Activate" },
            }
        })
        .collect()
}

#[derive(Props, Clone, PartialEq)]
pub struct UsersPageProps {
    pub user: User,
    #[props(default)]
    pub flash: Option<Flash>,
    pub users: Vec<User>,
    /// Lists the viewer may assign
    #[props(default)]
    pub price_lists: Vec<PriceList>,
    /// Product groups a new chef can be assigned to
    #[props(default)]
    pub groups: Vec<String>,
    /// Current role filter
    #[props(default)]
    pub role_filter: Option<Role>,
}

#[component]
pub fn UsersPage(props: UsersPageProps) -> Element {
    let is_admin = props.user.role == Role::Admin;
    let rows = user_rows(&props.users, &props.price_lists, &props.user);
    let lists: Vec<(String, String)> = props
        .price_lists
        .iter()
        .map(|l| (l.id.clone(), l.name.clone()))
        .collect();
    let distributors: Vec<(String, String)> = props
        .users
        .iter()
        .filter(|u| u.role == Role::Distributor && u.active)
        .map(|u| (u.id.clone(), u.name.clone()))
        .collect();
    let role_options: Vec<(&'static str, &'static str, bool)> = Role::ALL
        .iter()
        .map(|r| (r.as_str(), r.label(), props.role_filter == Some(*r)))
        .collect();
    let creatable: Vec<(&'static str, &'static str)> = if is_admin {
        Role::ALL.iter().map(|r| (r.as_str(), r.label())).collect()
    } else {
        vec![(Role::Client.as_str(), Role::Client.label())]
    };
    let (title, nav_active) = if is_admin {
        ("Users", "users")
    } else {
        ("Clients", "clients")
    };
    let return_to = match props.role_filter {
        Some(role) => format!("/users?role={}", role.as_str()),
        None => "/users".to_string(),
    };
    let count = rows.len();
    let form_title = if is_admin { "New user" } else { "New client" };

    rsx! {
        Layout {
            title: title.to_string(),
            nav_active: nav_active.to_string(),
            user: Some(props.user.clone()),
            flash: props.flash.clone(),
            live: Some("users".to_string()),

            hgroup {
                h1 { "{title}" }
                p { "{count} accounts" }
            }

            if is_admin {
                form { method: "get", action: "/users", class: "filters",
                    label {
                        "Role"
                        select { name: "role",
                            option { value: "", "All roles" }
                            for (code, label, selected) in role_options {
                                option { value: code, selected, "{label}" }
                            }
                        }
                    }
                    button { r#type: "submit", "Filter" }
                }
            }

            figure {
                table {
                    thead {
                        tr {
                            th { "Name" }
                            th { "Email" }
                            th { "Role" }
                            th { "Price list" }
                            th { "Status" }
                            th { "" }
                        }
                    }
                    tbody {
                        for row in rows {
                            tr { key: "{row.id}", "data-user-id": "{row.id}",
                                td {
                                    "{row.name}"
                                    if !row.detail.is_empty() {
                                        br {}
                                        small { "{row.detail}" }
                                    }
                                }
                                td { "{row.email}" }
                                td { "{row.role}" }
                                td {
                                    if row.assignable {
                                        form {
                                            method: "post",
                                            action: "/users/{row.id}/price-list",
                                            class: "inline",
                                            select { name: "price_list_id", "aria-label": "Price list",
                                                option { value: "", selected: row.price_list_id.is_empty(), "Base prices" }
                                                for (id, name) in lists.iter() {
                                                    option { value: "{id}", selected: row.price_list_id == *id, "{name}" }
                                                }
                                            }
                                            input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                            button { r#type: "submit", class: "secondary outline", "Assign" }
                                        }
                                    }
                                }
                                td {
                                    if row.active {
                                        mark { class: "badge-success", "Active" }
                                    } else {
                                        mark { class: "badge-neutral", "Inactive" }
                                    }
                                }
                                td {
                                    form {
                                        method: "post",
                                        action: "/users/{row.id}/active",
                                        class: "inline",
                                        input { r#type: "hidden", name: "active", value: row.toggle_to }
                                        input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                                        button { r#type: "submit", class: "secondary outline", "{row.toggle_label}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            article {
                header { strong { "{form_title}" } }
                form { method: "post", action: "/users",
                    div { class: "grid",
                        label {
                            "Name"
                            input { r#type: "text", name: "name", required: true }
                        }
                        label {
                            "Email"
                            input { r#type: "email", name: "email", required: true }
                        }
                    }
                    div { class: "grid",
                        label {
                            "Role"
                            select { name: "role",
                                for (code, label) in creatable {
                                    option { value: code, "{label}" }
                                }
                            }
                        }
                        label {
                            "Initial password"
                            input { r#type: "password", name: "password", autocomplete: "new-password" }
                        }
                    }
                    if is_admin {
                        div { class: "grid",
                            label {
                                "Station (chefs)"
                                select { name: "product_group",
                                    option { value: "", "None" }
                                    for group in props.groups.iter() {
                                        option { value: "{group}", "{group}" }
                                    }
                                }
                            }
                            label {
                                "Distributor (clients)"
                                select { name: "distributor_id",
                                    option { value: "", "None" }
                                    for (id, name) in distributors {
                                        option { value: "{id}", "{name}" }
                                    }
                                }
                            }
                        }
                    }
                    input { r#type: "hidden", name: "return_to", value: "{return_to}" }
                    button { r#type: "submit", "Create" }
                }
            }
        }
    }
}
