//! Theme switcher and spinner placement preferences.

use dioxus::prelude::*;

/// Theme switcher with light, dark, and black (OLED) options.
/// Uses localStorage for persistence and Pico CSS data-theme attribute.
/// Raw onclick attributes: pages are server-rendered and never hydrated.
#[component]
pub fn ThemeSwitcher() -> Element {
    rsx! {
        div {
            class: "theme-switcher",
            dangerous_inner_html: r#"
                <button id="theme-light" onclick="setTheme('light')">Light</button>
                <button id="theme-dark" onclick="setTheme('dark')">Dark</button>
                <button id="theme-black" onclick="setTheme('black')">Black</button>
            "#
        }
    }
}

/// Where the global activity spinner sits on screen
#[component]
pub fn SpinnerPositionPicker() -> Element {
    rsx! {
        label {
            class: "spinner-picker",
            small { "Spinner" }
            select {
                id: "spinner-position",
                "aria-label": "Spinner position",
                option { value: "top-right", "Top right" }
                option { value: "bottom-right", "Bottom right" }
                option { value: "bottom-left", "Bottom left" }
            }
        }
    }
}

/// Applies the saved theme before first paint (included in head).
pub const THEME_SCRIPT: &str = r#"
(function(){
    const t = localStorage.getItem('catering-theme') || 'dark';
    document.documentElement.setAttribute('data-theme', t === 'black' ? 'dark' : t);
    if (t === 'black') document.documentElement.setAttribute('data-variant', 'black');
})();
"#;

/// Theme and spinner preference functions (included at the end of body).
pub const THEME_FUNCTIONS: &str = r#"
function setTheme(t) {
    document.documentElement.setAttribute('data-theme', t === 'black' ? 'dark' : t);
    if (t === 'black') {
        document.documentElement.setAttribute('data-variant', 'black');
    } else {
        document.documentElement.removeAttribute('data-variant');
    }
    localStorage.setItem('catering-theme', t);
    updateThemeButtons();
}
function updateThemeButtons() {
    const variant = document.documentElement.getAttribute('data-variant');
    const theme = variant === 'black' ? 'black' : (document.documentElement.getAttribute('data-theme') || 'dark');
    ['light','dark','black'].forEach(x => {
        const btn = document.getElementById('theme-' + x);
        if (btn) btn.classList.toggle('active', x === theme);
    });
}
function setSpinnerPosition(p) {
    localStorage.setItem('catering-spinner-position', p);
    applySpinnerPosition();
}
function applySpinnerPosition() {
    const p = localStorage.getItem('catering-spinner-position') || 'top-right';
    const spinner = document.getElementById('activity-spinner');
    if (spinner) spinner.dataset.position = p;
    const picker = document.getElementById('spinner-position');
    if (picker) picker.value = p;
}
const spinnerPicker = document.getElementById('spinner-position');
if (spinnerPicker) spinnerPicker.addEventListener('change', e => setSpinnerPosition(e.target.value));
updateThemeButtons();
applySpinnerPosition();
"#;
