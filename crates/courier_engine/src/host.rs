use courier_core::{Indicator, MenuEntry, MenuItem, Notification, TabId};
use thiserror::Error;

use crate::PageAutomation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("browser rejected the request: {0}")]
    Rejected(String),
}

/// A popup window opened at an extension page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSpec {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PopupSpec {
    fn default() -> Self {
        Self {
            url: "category-picker.html".to_string(),
            width: 380,
            height: 300,
        }
    }
}

/// Browser tab and window lifecycle.
#[async_trait::async_trait]
pub trait TabHost: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<TabId, HostError>;

    async fn open_popup(&self, popup: &PopupSpec) -> Result<(), HostError>;

    /// Active tab of the current window, if any.
    async fn active_tab(&self) -> Option<TabId>;

    /// Runs a one-shot script in the tab's page context. Success only means
    /// the script was handed over, not that it achieved anything.
    async fn execute(&self, tab: TabId, automation: &PageAutomation) -> Result<(), HostError>;

    async fn notify(&self, tab: TabId, notification: &Notification) -> Result<(), HostError>;
}

/// Toolbar badge and link context menu. Calls are fire-and-forget.
pub trait ToolbarHost: Send + Sync {
    fn set_indicator(&self, indicator: Indicator);

    /// Replaces all entries.
    fn install_menu(&self, entries: &[MenuEntry]);

    fn set_menu_title(&self, item: MenuItem, title: &str);
}
