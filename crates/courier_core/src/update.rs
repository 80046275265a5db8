use crate::settings::{DEFAULT_CATEGORY, MAGNET_LINK};
use crate::{
    menu_entries, send_title, Action, AutomationKind, ControllerState, Effect, HealthState,
    MenuItem, Msg, Notification, RequestId, SessionOutcome, SettingChange, SubmissionJob, TabId,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Effects are independent of each other; the runner may execute them
/// concurrently and in any order.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { default_category } => {
            state.set_default_category(default_category);
            vec![
                Effect::InstallMenu {
                    entries: menu_entries(state.default_category()),
                },
                Effect::ProbeHealth,
            ]
        }
        Msg::HealthTick => vec![Effect::ProbeHealth],
        Msg::SettingsChanged(changes) => apply_setting_changes(&mut state, changes),
        Msg::MenuClicked {
            item,
            link_url,
            origin,
        } => {
            if link_url.trim().is_empty() {
                return (state, Vec::new());
            }
            match item {
                MenuItem::Send => vec![Effect::Submit {
                    job: SubmissionJob::single(link_url, default_category(&state)),
                    origin,
                    request: None,
                }],
                MenuItem::SendWithCategory => vec![Effect::OpenCategoryPicker { link_url }],
            }
        }
        Msg::ActionReceived {
            request,
            action,
            origin,
        } => route_action(request, action, origin),
        Msg::ProbeCompleted(outcome) => {
            state.set_health(HealthState::from_probe(outcome));
            vec![Effect::ShowIndicator(state.health().indicator())]
        }
        Msg::SubmissionCompleted { origin, result } => vec![
            Effect::Notify {
                tab: origin,
                notification: Notification::from(result),
            },
            Effect::ProbeHealth,
        ],
        Msg::RemoteUiOpened { tab, session } => {
            if session == SessionOutcome::LegacyRequired {
                state
                    .pending_tabs_mut()
                    .mark(tab, AutomationKind::FallbackLogin);
            }
            Vec::new()
        }
        Msg::ProtectionTabOpened { tab } => {
            state
                .pending_tabs_mut()
                .mark(tab, AutomationKind::DisableCrossSiteProtection);
            vec![Effect::RunAutomation {
                tab,
                kind: AutomationKind::FallbackLogin,
            }]
        }
        Msg::TabLoadCompleted { tab } => {
            if !state.pending_tabs().contains(tab) {
                return (state, Vec::new());
            }
            match state.pending_tabs_mut().take(tab) {
                Some(kind) => vec![Effect::RunAutomation { tab, kind }],
                None => Vec::new(),
            }
        }
    };

    (state, effects)
}

/// Maps each UI action to exactly one effect.
fn route_action(request: RequestId, action: Action, origin: Option<TabId>) -> Vec<Effect> {
    let effect = match action {
        Action::OpenRemoteUi => Effect::OpenRemoteUi { request },
        Action::DisableCrossSiteProtection => Effect::OpenProtectionTab { request },
        Action::ListCategories => Effect::ListCategories { request },
        Action::CreateCategory {
            category_name,
            save_path,
        } => Effect::CreateCategory {
            request,
            name: category_name,
            save_path: save_path.unwrap_or_default(),
        },
        Action::SubmitJob { url, category } => Effect::Submit {
            job: SubmissionJob::single(url, category),
            origin,
            request: Some(request),
        },
    };
    vec![effect]
}

fn apply_setting_changes(state: &mut ControllerState, changes: Vec<SettingChange>) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut reprobe = false;
    let mut captured_link = None;

    for change in changes {
        if change.is_connection_key() {
            reprobe = true;
            continue;
        }
        match change.key.as_str() {
            DEFAULT_CATEGORY => {
                state.set_default_category(change.new_value);
                effects.push(Effect::SetMenuTitle {
                    item: MenuItem::Send,
                    title: send_title(state.default_category()),
                });
            }
            MAGNET_LINK => {
                captured_link = change.new_value.filter(|link| !link.trim().is_empty());
            }
            _ => {}
        }
    }

    // The category change above must apply before a link captured in the same batch.
    if let Some(link) = captured_link {
        effects.push(Effect::Submit {
            job: SubmissionJob::single(link, default_category(state)),
            origin: None,
            request: None,
        });
    }
    if reprobe {
        effects.push(Effect::ProbeHealth);
    }
    effects
}

fn default_category(state: &ControllerState) -> Option<String> {
    state.default_category().map(ToOwned::to_owned)
}
