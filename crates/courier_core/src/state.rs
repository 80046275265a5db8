use crate::view_model::ControllerView;
use crate::{HealthState, PendingLoginTabs};

pub type TabId = u64;
pub type RequestId = u64;

/// Everything the controller remembers between events. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    health: HealthState,
    default_category: Option<String>,
    pending_tabs: PendingLoginTabs,
    dirty: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ControllerView {
        ControllerView {
            health: self.health,
            indicator: self.health.indicator(),
            default_category: self.default_category.clone(),
            pending_tabs: self.pending_tabs.iter().collect(),
        }
    }

    pub fn health(&self) -> HealthState {
        self.health
    }

    pub fn default_category(&self) -> Option<&str> {
        self.default_category.as_deref()
    }

    pub fn pending_tabs(&self) -> &PendingLoginTabs {
        &self.pending_tabs
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_health(&mut self, health: HealthState) {
        if self.health != health {
            self.health = health;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_default_category(&mut self, category: Option<String>) {
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if self.default_category != category {
            self.default_category = category;
            self.mark_dirty();
        }
    }

    pub(crate) fn pending_tabs_mut(&mut self) -> &mut PendingLoginTabs {
        self.mark_dirty();
        &mut self.pending_tabs
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
