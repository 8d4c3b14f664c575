//! Role-based navigation bar.

use dioxus::prelude::*;

use crate::domain::{Role, User};

/// (id, label, href) menu entries for a role
pub fn nav_links(role: Role) -> &'static [(&'static str, &'static str, &'static str)] {
    match role {
        Role::Admin => &[
            ("overview", "Overview", "/admin"),
            ("orders", "Orders", "/orders"),
            ("products", "Products", "/products"),
            ("users", "Users", "/users"),
            ("price-lists", "Price lists", "/price-lists"),
            ("analytics", "Analytics", "/analytics"),
        ],
        Role::Chef => &[("production", "Production", "/chef")],
        Role::Driver => &[("deliveries", "Deliveries", "/driver")],
        Role::Client => &[
            ("my-orders", "My orders", "/client"),
            ("new-order", "New order", "/orders/new"),
        ],
        Role::Distributor => &[
            ("overview", "Overview", "/distributor"),
            ("clients", "Clients", "/users"),
            ("new-order", "New order", "/orders/new"),
            ("price-lists", "Price lists", "/price-lists"),
            ("analytics", "Analytics", "/analytics"),
        ],
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct NavProps {
    /// The currently active page ID (e.g., "orders", "production")
    pub active: String,
    /// Signed-in user; the login page has none
    pub user: Option<User>,
}

/// Navigation bar component.
#[component]
pub fn Nav(props: NavProps) -> Element {
    let links = props
        .user
        .as_ref()
        .map(|u| nav_links(u.role))
        .unwrap_or(&[]);
    let signed_in = props
        .user
        .as_ref()
        .map(|u| (format!("{} · {}", u.name, u.role.label()), u.email.clone()));

    rsx! {
        nav {
            ul {
                li {
                    strong { "Catering" }
                }
            }
            ul {
                for (id, label, href) in links.iter() {
                    li {
                        if *id == props.active.as_str() {
                            a {
                                href: *href,
                                "aria-current": "page",
                                strong { "{label}" }
                            }
                        } else {
                            a {
                                href: *href,
                                "{label}"
                            }
                        }
                    }
                }
                if let Some((who, email)) = signed_in {
                    li {
                        small { title: "{email}", "{who}" }
                    }
                    li {
                        form {
                            method: "post",
                            action: "/logout",
                            class: "inline",
                            button { r#type: "submit", class: "secondary outline", "Sign out" }
                        }
                    }
                }
            }
        }
    }
}
