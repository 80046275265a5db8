use std::collections::BTreeMap;

use crate::TabId;

/// One-shot page automations that run inside a tab once it has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationKind {
    /// Fill and submit the interactive login form.
    FallbackLogin,
    /// Untick the web UI's CSRF protection and save preferences.
    DisableCrossSiteProtection,
}

/// Tabs waiting for their post-load automation.
///
/// Each tab holds at most one mark; `take` removes it, so the automation fires
/// at most once per mark.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingLoginTabs {
    tabs: BTreeMap<TabId, AutomationKind>,
}

impl PendingLoginTabs {
    /// Returns `true` when the tab was not pending before.
    pub fn mark(&mut self, tab: TabId, kind: AutomationKind) -> bool {
        self.tabs.insert(tab, kind).is_none()
    }

    pub fn take(&mut self, tab: TabId) -> Option<AutomationKind> {
        self.tabs.remove(&tab)
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.tabs.contains_key(&tab)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TabId, AutomationKind)> + '_ {
        self.tabs.iter().map(|(tab, kind)| (*tab, *kind))
    }
}
