use crate::{
    AutomationKind, Indicator, MenuEntry, MenuItem, Notification, RequestId, SubmissionJob, TabId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ProbeHealth,
    ShowIndicator(Indicator),
    InstallMenu { entries: Vec<MenuEntry> },
    SetMenuTitle { item: MenuItem, title: String },
    Submit {
        job: SubmissionJob,
        origin: Option<TabId>,
        request: Option<RequestId>,
    },
    /// `tab: None` means the active tab.
    Notify {
        tab: Option<TabId>,
        notification: Notification,
    },
    OpenRemoteUi { request: RequestId },
    OpenProtectionTab { request: RequestId },
    RunAutomation { tab: TabId, kind: AutomationKind },
    ListCategories { request: RequestId },
    CreateCategory {
        request: RequestId,
        name: String,
        save_path: String,
    },
    OpenCategoryPicker { link_url: String },
}

impl Effect {
    /// The UI request this effect answers, if any.
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Effect::Submit { request, .. } => *request,
            Effect::OpenRemoteUi { request }
            | Effect::OpenProtectionTab { request }
            | Effect::ListCategories { request }
            | Effect::CreateCategory { request, .. } => Some(*request),
            _ => None,
        }
    }
}
