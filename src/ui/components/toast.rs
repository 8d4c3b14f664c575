//! Toast notifications and inline error alerts.
//!
//! Form actions redirect back with `?notice=...&level=...`; the next page
//! render turns that into a toast. Live notifications from the bus are added
//! to the same container by the page script.

use dioxus::prelude::*;
use serde::Deserialize;

use crate::bus::NoticeLevel;

/// Flash message carried in the redirect query string
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl Flash {
    pub fn level(&self) -> NoticeLevel {
        match self.level.as_deref() {
            Some("error") => NoticeLevel::Error,
            Some("success") => NoticeLevel::Success,
            _ => NoticeLevel::Info,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.notice.as_deref().filter(|m| !m.trim().is_empty())
    }
}

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "toast toast-info",
        NoticeLevel::Success => "toast toast-success",
        NoticeLevel::Error => "toast toast-error",
    }
}

fn level_param(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "success",
        NoticeLevel::Error => "error",
    }
}

/// `path` with a flash message appended to its query string
pub fn with_flash(path: &str, level: NoticeLevel, message: &str) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!(
        "{path}{sep}notice={}&level={}",
        urlencoding::encode(message),
        level_param(level)
    )
}

/// Container for transient toasts
#[component]
pub fn Toasts(flash: Option<Flash>) -> Element {
    let current = flash
        .as_ref()
        .and_then(|f| f.message().map(|m| (level_class(f.level()), m.to_string())));
    rsx! {
        div { id: "toasts", class: "toasts", "aria-live": "polite",
            if let Some((class, message)) = current {
                div { class: "{class}", role: "status", "data-toast": "flash", "{message}" }
            }
        }
    }
}

/// Inline error block inside a page (login failures, empty states)
#[component]
pub fn ErrorAlert(message: String) -> Element {
    rsx! {
        article { class: "error-alert", role: "alert",
            p { class: "status-err", "{message}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_appended_to_query() {
        assert_eq!(
            with_flash("/chef", NoticeLevel::Error, "Item already completed"),
            "/chef?notice=Item%20already%20completed&level=error"
        );
        assert_eq!(
            with_flash("/driver?date=2026-03-14", NoticeLevel::Success, "Done"),
            "/driver?date=2026-03-14&notice=Done&level=success"
        );
    }

    #[test]
    fn toast_renders_escaped_message() {
        let flash = Flash {
            notice: Some("<b>nope</b>".into()),
            level: Some("error".into()),
        };
        let html = dioxus::ssr::render_element(rsx! { Toasts { flash: Some(flash) } });
        assert!(html.contains("toast-error"));
        assert!(!html.contains("<b>nope</b>"));
    }

    #[test]
    fn blank_flash_renders_no_toast() {
        let html = dioxus::ssr::render_element(rsx! { Toasts { flash: Some(Flash::default()) } });
        assert!(!html.contains("data-toast"));
    }
}
