use std::fmt;

use courier_core::{AutomationKind, Credentials};
use serde_json::Value;

/// Milliseconds between clicks in the preferences sequence.
const STEP_DELAY_MS: u32 = 500;

/// One-shot page-context automation. Best effort: nothing reports back whether
/// the page reacted as expected.
#[derive(Clone, PartialEq, Eq)]
pub enum PageAutomation {
    /// Fill and submit the web UI login form if it is shown.
    FallbackLogin { credentials: Credentials },
    /// Open Preferences > Web UI, untick CSRF protection when ticked, save.
    DisableCrossSiteProtection,
}

impl PageAutomation {
    pub fn kind(&self) -> AutomationKind {
        match self {
            PageAutomation::FallbackLogin { .. } => AutomationKind::FallbackLogin,
            PageAutomation::DisableCrossSiteProtection => AutomationKind::DisableCrossSiteProtection,
        }
    }

    /// JavaScript source to inject into the tab.
    pub fn script(&self) -> String {
        match self {
            PageAutomation::FallbackLogin { credentials } => {
                let username = js_string(credentials.username());
                let password = js_string(credentials.password());
                format!(
                    "if (document.getElementById('loginform')) {{\n  \
                     document.getElementById('username').value = {username};\n  \
                     document.getElementById('password').value = {password};\n  \
                     document.getElementById('loginButton').click();\n}}\n"
                )
            }
            PageAutomation::DisableCrossSiteProtection => {
                let step = STEP_DELAY_MS;
                let (second, third) = (step * 2, step * 3);
                format!(
                    "if (document.getElementById('preferencesButton')) {{\n  \
                     document.getElementById('preferencesButton').click();\n  \
                     setTimeout(() => {{ document.getElementById('PrefWebUILink').click(); }}, {step});\n  \
                     setTimeout(() => {{\n    \
                     const box = document.getElementById('csrf_protection_checkbox');\n    \
                     if (box && box.checked) {{ box.click(); }}\n  \
                     }}, {second});\n  \
                     setTimeout(() => {{ document.querySelector('input[type=\"button\"][value=\"Save\"]').click(); }}, {third});\n}}\n"
                )
            }
        }
    }
}

impl fmt::Debug for PageAutomation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageAutomation::FallbackLogin { credentials } => f
                .debug_struct("FallbackLogin")
                .field("credentials", credentials)
                .finish(),
            PageAutomation::DisableCrossSiteProtection => f.write_str("DisableCrossSiteProtection"),
        }
    }
}

/// Quoted, escaped JavaScript string literal.
fn js_string(raw: &str) -> String {
    Value::String(raw.to_string()).to_string()
}
