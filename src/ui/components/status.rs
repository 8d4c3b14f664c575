//! Status badges and progress summaries.

use dioxus::prelude::*;

use crate::domain::{DeliveryStatus, ProductionStatus, Progress, StatusBadge};

/// One label/tone pair; `code` is the wire value (e.g. `CANCELLED`)
#[component]
pub fn Badge(badge: StatusBadge, code: &'static str) -> Element {
    let class = badge.tone.css_class();
    let label = badge.label;
    rsx! {
        mark { class: "{class}", "data-status": "{code}", "{label}" }
    }
}

#[component]
pub fn ProductionBadge(status: ProductionStatus) -> Element {
    rsx! {
        Badge { badge: status.badge(), code: status.as_str() }
    }
}

#[component]
pub fn DeliveryBadge(status: DeliveryStatus) -> Element {
    rsx! {
        Badge { badge: status.badge(), code: status.as_str() }
    }
}

/// "3 of 5 completed · 2 pending"
pub fn progress_text(progress: &Progress) -> String {
    let mut text = format!(
        "{} of {} completed",
        progress.completed,
        progress.active()
    );
    if progress.partial > 0 {
        text.push_str(&format!(" · {} partial", progress.partial));
    }
    if progress.pending > 0 {
        text.push_str(&format!(" · {} pending", progress.pending));
    }
    if progress.cancelled > 0 {
        text.push_str(&format!(" · {} cancelled", progress.cancelled));
    }
    text
}

#[component]
pub fn ProgressSummary(progress: Progress) -> Element {
    let text = progress_text(&progress);
    let done = progress.completed;
    let total = progress.active().max(1);
    rsx! {
        div { class: "progress-summary",
            progress { value: "{done}", max: "{total}" }
            small { "{text}" }
        }
    }
}
