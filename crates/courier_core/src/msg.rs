use crate::{
    Action, MenuItem, ProbeOutcome, RequestId, SessionOutcome, SettingChange, SubmissionResult,
    TabId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Browser startup or extension install.
    Started { default_category: Option<String> },
    /// Periodic health timer fired.
    HealthTick,
    /// Config store reported changed keys.
    SettingsChanged(Vec<SettingChange>),
    /// User picked a link context-menu entry.
    MenuClicked {
        item: MenuItem,
        link_url: String,
        origin: Option<TabId>,
    },
    /// A UI surface sent an action; the reply is routed by `request`.
    ActionReceived {
        request: RequestId,
        action: Action,
        origin: Option<TabId>,
    },
    ProbeCompleted(ProbeOutcome),
    /// A submission attempt finished, successfully or not.
    SubmissionCompleted {
        origin: Option<TabId>,
        result: SubmissionResult,
    },
    /// Remote UI tab opened after a programmatic login attempt.
    RemoteUiOpened { tab: TabId, session: SessionOutcome },
    /// Remote UI tab opened for the protection-disable sequence.
    ProtectionTabOpened { tab: TabId },
    /// Browser reported a tab finished loading.
    TabLoadCompleted { tab: TabId },
}
