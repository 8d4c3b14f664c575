//! Layout component wrapping all pages with Pico CSS and common elements.

use dioxus::prelude::*;

use super::nav::Nav;
use super::theme::{SpinnerPositionPicker, ThemeSwitcher, THEME_FUNCTIONS, THEME_SCRIPT};
use super::toast::{Flash, Toasts};
use crate::domain::User;

/// Shared JavaScript utilities (XSS-safe escaping, etc.)
const SHARED_JS: &str = r#"
function esc(s) { return String(s || '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'})[c]); }
function showToast(level, message) {
    const box = document.getElementById('toasts');
    if (!box || !message) return;
    const el = document.createElement('div');
    el.className = 'toast toast-' + (level || 'info');
    el.setAttribute('role', 'status');
    el.innerHTML = esc(message);
    box.appendChild(el);
    setTimeout(() => el.remove(), 5000);
}
function setBusy(busy) {
    const spinner = document.getElementById('activity-spinner');
    if (spinner) spinner.hidden = !busy;
}
"#;

/// Live updates: spinner, toasts and refetch of the topic a page shows.
const LIVE_SCRIPT: &str = r#"
(function(){
    const topics = {
        orders: ['OrderCreated','OrderCancelled','ItemProductionChanged','ItemDeliveryChanged','OrderDeliveryChanged'],
        catalog: ['ProductChanged','PriceListChanged'],
        users: ['UserChanged','PriceListChanged'],
    };
    const live = document.body.dataset.live || '';
    let reload = null;
    function scheduleReload() {
        if (reload) clearTimeout(reload);
        reload = setTimeout(() => {
            const focused = document.activeElement;
            if (focused && ['INPUT','SELECT','TEXTAREA'].includes(focused.tagName)) { scheduleReload(); return; }
            const url = new URL(window.location.href);
            url.searchParams.delete('notice');
            url.searchParams.delete('level');
            window.location.replace(url.toString());
        }, 400);
    }
    document.querySelectorAll('form').forEach(f => f.addEventListener('submit', () => setBusy(true)));
    const existing = document.querySelector('[data-toast="flash"]');
    if (existing) setTimeout(() => existing.remove(), 5000);
    if (!window.EventSource) return;
    const es = new EventSource('/events');
    es.onmessage = (e) => {
        try {
            const event = JSON.parse(e.data);
            if (event.type === 'ActivityChanged') { setBusy(event.payload.in_flight > 0); return; }
            if (event.type === 'Notification') { showToast(event.payload.level, event.payload.message); return; }
            if (live && (topics[live] || []).includes(event.type)) scheduleReload();
        } catch (err) { console.error('SSE parse error:', err); }
    };
    es.onerror = () => { setBusy(false); };
})();
"#;

/// CSS styles for the application (extends Pico CSS).
const CUSTOM_STYLES: &str = r#"
:root { --pico-font-size: 15px; }
.status-ok { color: var(--pico-ins-color); }
.status-err { color: var(--pico-del-color); }
.order-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); gap: 1rem; }
.order-card.cancelled { opacity: 0.6; }
.order-head { display: flex; justify-content: space-between; align-items: center; gap: 0.5rem; }
.order-foot { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; }
.badges { display: flex; gap: 0.25rem; }
.controls { display: flex; gap: 0.5rem; margin-top: 0.5rem; flex-wrap: wrap; }
.controls button, .actions button { margin: 0; padding: 0.35rem 0.75rem; font-size: 0.85rem; }
form.inline { display: inline-flex; gap: 0.25rem; margin: 0 0.25rem 0 0; align-items: center; }
form.inline input { margin: 0; padding: 0.25rem 0.5rem; width: 6rem; }
table.items td, table.items th { padding: 0.35rem 0.5rem; }
small { color: var(--pico-muted-color); }
mark { padding: 0.1rem 0.45rem; border-radius: 0.25rem; font-size: 0.8rem; white-space: nowrap; }
mark.badge-neutral { background: #6b7280; color: #fff; }
mark.badge-info { background: #2563eb; color: #fff; }
mark.badge-warning { background: #d97706; color: #fff; }
mark.badge-success { background: #15803d; color: #fff; }
mark.badge-danger { background: #b91c1c; color: #fff; }
.stat-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 1rem; }
.stat-grid article { margin: 0; text-align: center; }
.stat-grid strong { display: block; font-size: 1.6rem; }
.filters { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: end; }
.filters label { flex: 1 1 10rem; }
.toasts { position: fixed; bottom: 1rem; right: 1rem; display: flex; flex-direction: column; gap: 0.5rem; z-index: 20; }
.toast { padding: 0.6rem 1rem; border-radius: 0.35rem; color: #fff; max-width: 24rem; }
.toast-info { background: #2563eb; }
.toast-success { background: #15803d; }
.toast-error { background: #b91c1c; }
#activity-spinner { position: fixed; z-index: 30; width: 1.6rem; height: 1.6rem; border-radius: 50%;
    border: 3px solid var(--pico-muted-border-color); border-top-color: var(--pico-primary); animation: spin 0.8s linear infinite; }
#activity-spinner[data-position="top-right"] { top: 0.75rem; right: 0.75rem; }
#activity-spinner[data-position="bottom-right"] { bottom: 0.75rem; right: 0.75rem; }
#activity-spinner[data-position="bottom-left"] { bottom: 0.75rem; left: 0.75rem; }
@keyframes spin { to { transform: rotate(360deg); } }
/* Black theme (OLED) - extends dark theme */
[data-theme="dark"][data-variant="black"] {
    --pico-background-color: #000;
    --pico-card-background-color: #0a0a0a;
    --pico-card-sectioning-background-color: #0a0a0a;
    --pico-modal-overlay-background-color: rgba(0,0,0,.9);
    --pico-primary-background: #1a1a1a;
    --pico-secondary-background: #111;
    --pico-contrast-background: #0a0a0a;
    --pico-muted-border-color: #1a1a1a;
    --pico-form-element-background-color: #0a0a0a;
    --pico-table-border-color: #1a1a1a;
}
/* Theme switcher */
.theme-switcher { display: flex; gap: 0.25rem; }
.theme-switcher button { padding: 0.25rem 0.5rem; font-size: 0.8rem; margin: 0; }
.theme-switcher button.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
.spinner-picker { display: flex; gap: 0.5rem; align-items: center; margin: 0; }
.spinner-picker select { margin: 0; padding: 0.2rem 2rem 0.2rem 0.5rem; font-size: 0.8rem; }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Active navigation item ID
    pub nav_active: String,
    /// Signed-in user (drives the menu)
    #[props(default)]
    pub user: Option<User>,
    /// Flash message from the previous form action
    #[props(default)]
    pub flash: Option<Flash>,
    /// Event topic that triggers a reload ("orders", "catalog", "users")
    #[props(default)]
    pub live: Option<String>,
    /// Page content
    pub children: Element,
    /// Optional additional scripts to include
    #[props(default)]
    pub scripts: Option<String>,
}

/// Main layout component wrapping all pages.
#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = env!("CATERING_VERSION");
    let live = props.live.clone().unwrap_or_default();

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{props.title} - Catering" }
            link {
                rel: "stylesheet",
                href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css"
            }
            style { {CUSTOM_STYLES} }
            script { dangerous_inner_html: THEME_SCRIPT }
            script { dangerous_inner_html: SHARED_JS }
        }
        body { "data-live": "{live}",
            div { id: "activity-spinner", "data-position": "top-right", hidden: true, "aria-label": "Working" }
            header { class: "container",
                Nav { active: props.nav_active.clone(), user: props.user.clone() }
            }
            main { class: "container",
                {props.children}
            }
            Toasts { flash: props.flash.clone() }
            footer {
                class: "container",
                style: "display:flex;justify-content:space-between;align-items:center;gap:1rem;flex-wrap:wrap;",
                small { "Catering dashboard v{version}" }
                SpinnerPositionPicker {}
                ThemeSwitcher {}
            }
            script { dangerous_inner_html: THEME_FUNCTIONS }
            if props.user.is_some() {
                script { dangerous_inner_html: LIVE_SCRIPT }
            }
            if let Some(scripts) = props.scripts {
                script { dangerous_inner_html: "{scripts}" }
            }
        }
    }
}
