//! Sign-in page.

use dioxus::prelude::*;

use crate::domain::Role;
use crate::ui::components::{ErrorAlert, Layout};

#[derive(Props, Clone, PartialEq)]
pub struct LoginPageProps {
    /// Message from a failed attempt, shown verbatim
    #[props(default)]
    pub error: Option<String>,
    /// Email to prefill after a failed attempt
    #[props(default)]
    pub email: String,
    /// Seeded accounts (demo mode only)
    #[props(default)]
    pub demo_accounts: Vec<(String, Role)>,
}

#[component]
pub fn LoginPage(props: LoginPageProps) -> Element {
    let accounts: Vec<(String, &'static str)> = props
        .demo_accounts
        .iter()
        .map(|(email, role)| (email.clone(), role.label()))
        .collect();
    let demo_password = crate::backend::demo::DEMO_PASSWORD;

    rsx! {
        Layout {
            title: "Sign in".to_string(),
            nav_active: String::new(),

            article { style: "max-width:28rem;margin:2rem auto;",
                hgroup {
                    h1 { "Sign in" }
                    p { "Orders, production and deliveries" }
                }
                if let Some(error) = props.error.clone() {
                    ErrorAlert { message: error }
                }
                form { method: "post", action: "/login",
                    label {
                        "Email"
                        input {
                            r#type: "email",
                            name: "email",
                            value: "{props.email}",
                            autocomplete: "username",
                            required: true,
                        }
                    }
                    label {
                        "Password"
                        input {
                            r#type: "password",
                            name: "password",
                            autocomplete: "current-password",
                            required: true,
                        }
                    }
                    button { r#type: "submit", "Sign in" }
                }
                if !accounts.is_empty() {
                    details {
                        summary { "Demo accounts" }
                        p { small { "Password for every account: " code { "{demo_password}" } } }
                        table {
                            tbody {
                                for (email, role) in accounts {
                                    tr { key: "{email}",
                                        td { code { "{email}" } }
                                        td { "{role}" }
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
