use crate::{AutomationKind, HealthState, Indicator, TabId};

/// Read-only snapshot for hosts, logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerView {
    pub health: HealthState,
    pub indicator: Indicator,
    pub default_category: Option<String>,
    pub pending_tabs: Vec<(TabId, AutomationKind)>,
}
