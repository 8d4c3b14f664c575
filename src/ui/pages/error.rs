//! Full-page error view for critical failures.

use dioxus::prelude::*;

use crate::domain::User;
use crate::ui::components::Layout;

#[component]
pub fn ErrorPage(status: u16, message: String, user: Option<User>) -> Element {
    let home = user
        .as_ref()
        .map(|u| u.role.home_path())
        .unwrap_or("/login");
    let heading = match status {
        403 => "Not allowed",
        404 => "Not found",
        502 | 503 => "Backend unavailable",
        _ => "Something went wrong",
    };

    rsx! {
        Layout {
            title: heading.to_string(),
            nav_active: String::new(),
            user: user.clone(),

            article { class: "error-page", role: "alert",
                hgroup {
                    h1 { "{heading}" }
                    p { small { "Status {status}" } }
                }
                p { class: "status-err", "{message}" }
                footer {
                    a { href: "{home}", role: "button", "Back to dashboard" }
                    " "
                    a { href: "javascript:location.reload()", role: "button", class: "secondary outline", "Reload" }
                }
            }
        }
    }
}
