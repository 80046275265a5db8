use std::sync::Arc;
use std::time::Duration;

use courier_core::settings::PENDING_TORRENT_URL;
use courier_core::{AutomationKind, Effect, Msg, Notification, Reply, TabId};
use courier_logging::{courier_debug, courier_info, courier_warn};
use tokio::sync::{mpsc, oneshot};

use crate::controller::ControllerEvent;
use crate::{
    CategoryService, ConfigStore, CredentialResolver, HealthMonitor, PageAutomation, PopupSpec,
    SessionAuthenticator, SubmissionPipeline, TabHost, ToolbarHost,
};

/// Shared collaborators for effect tasks.
#[derive(Clone)]
pub(crate) struct Services {
    pub store: Arc<dyn ConfigStore>,
    pub resolver: CredentialResolver,
    pub monitor: HealthMonitor,
    pub authenticator: SessionAuthenticator,
    pub pipeline: SubmissionPipeline,
    pub categories: CategoryService,
    pub tabs: Arc<dyn TabHost>,
    pub toolbar: Arc<dyn ToolbarHost>,
}

/// Executes effects. Toolbar updates run inline to keep their order; everything
/// else becomes its own task and reports back through the controller channel.
pub(crate) struct EffectRunner {
    services: Services,
    events: mpsc::UnboundedSender<ControllerEvent>,
    automation_delay: Duration,
    category_picker: PopupSpec,
}

impl EffectRunner {
    pub fn new(
        services: Services,
        events: mpsc::UnboundedSender<ControllerEvent>,
        automation_delay: Duration,
        category_picker: PopupSpec,
    ) -> Self {
        Self {
            services,
            events,
            automation_delay,
            category_picker,
        }
    }

    pub fn run(&self, effect: Effect, reply: Option<oneshot::Sender<Reply>>) {
        match effect {
            Effect::ShowIndicator(indicator) => self.services.toolbar.set_indicator(indicator),
            Effect::InstallMenu { entries } => self.services.toolbar.install_menu(&entries),
            Effect::SetMenuTitle { item, title } => {
                self.services.toolbar.set_menu_title(item, &title)
            }
            Effect::ProbeHealth => {
                let monitor = self.services.monitor.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let outcome = monitor.probe().await;
                    send_msg(&events, Msg::ProbeCompleted(outcome));
                });
            }
            Effect::Submit { job, origin, .. } => {
                let pipeline = self.services.pipeline.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = pipeline.submit(&job).await;
                    send_msg(
                        &events,
                        Msg::SubmissionCompleted {
                            origin,
                            result: result.clone(),
                        },
                    );
                    send_reply(reply, Reply::Submitted(result));
                });
            }
            Effect::Notify { tab, notification } => {
                let tabs = self.services.tabs.clone();
                tokio::spawn(async move {
                    notify(tabs.as_ref(), tab, &notification).await;
                });
            }
            Effect::OpenRemoteUi { .. } => self.spawn_open_remote_ui(reply, true),
            Effect::OpenProtectionTab { .. } => self.spawn_open_remote_ui(reply, false),
            Effect::RunAutomation { tab, kind } => {
                let services = self.services.clone();
                let delay = match kind {
                    AutomationKind::FallbackLogin => Duration::ZERO,
                    AutomationKind::DisableCrossSiteProtection => self.automation_delay,
                };
                tokio::spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let automation = match kind {
                        AutomationKind::FallbackLogin => PageAutomation::FallbackLogin {
                            credentials: services.resolver.resolve().await.credentials,
                        },
                        AutomationKind::DisableCrossSiteProtection => {
                            PageAutomation::DisableCrossSiteProtection
                        }
                    };
                    match services.tabs.execute(tab, &automation).await {
                        Ok(()) => courier_debug!("Ran {:?} in tab {}", kind, tab),
                        Err(err) => courier_warn!("{:?} in tab {} failed: {}", kind, tab, err),
                    }
                });
            }
            Effect::ListCategories { .. } => {
                let categories = self.services.categories.clone();
                tokio::spawn(async move {
                    send_reply(reply, Reply::Categories(categories.list().await));
                });
            }
            Effect::CreateCategory {
                name, save_path, ..
            } => {
                let categories = self.services.categories.clone();
                tokio::spawn(async move {
                    let created = categories.create(&name, &save_path).await;
                    send_reply(reply, Reply::CategoryCreated(created));
                });
            }
            Effect::OpenCategoryPicker { link_url } => {
                let store = self.services.store.clone();
                let tabs = self.services.tabs.clone();
                let popup = self.category_picker.clone();
                tokio::spawn(async move {
                    if let Err(err) = store
                        .set(vec![(PENDING_TORRENT_URL.to_string(), link_url)])
                        .await
                    {
                        courier_warn!("Saving link for category picker failed: {}", err);
                        return;
                    }
                    if let Err(err) = tabs.open_popup(&popup).await {
                        courier_warn!("Opening category picker failed: {}", err);
                    }
                });
            }
        }
    }

    /// Opens the server's web UI in a new tab. With `login_first` the
    /// programmatic login runs before, and its outcome decides the fallback;
    /// otherwise the tab is headed for the protection-disable sequence.
    fn spawn_open_remote_ui(&self, reply: Option<oneshot::Sender<Reply>>, login_first: bool) {
        let services = self.services.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let connection = services.resolver.resolve().await;
            let Some(endpoint) = connection.endpoint.configured() else {
                courier_warn!("Remote UI not opened: server not configured");
                send_reply(reply, Reply::RemoteUi { tab: None });
                return;
            };
            let session = if login_first {
                Some(services.authenticator.authenticate(&connection).await)
            } else {
                None
            };
            let tab = match services.tabs.open_tab(&endpoint.base_url()).await {
                Ok(tab) => {
                    let opened = match session {
                        Some(session) => Msg::RemoteUiOpened { tab, session },
                        None => Msg::ProtectionTabOpened { tab },
                    };
                    send_msg(&events, opened);
                    Some(tab)
                }
                Err(err) => {
                    courier_warn!("Opening remote UI at {} failed: {}", endpoint, err);
                    None
                }
            };
            send_reply(reply, Reply::RemoteUi { tab });
        });
    }
}

async fn notify(tabs: &dyn TabHost, tab: Option<TabId>, notification: &Notification) {
    let target = match tab {
        Some(tab) => Some(tab),
        None => tabs.active_tab().await,
    };
    let Some(target) = target else {
        courier_info!("No tab to notify about {:?}", notification);
        return;
    };
    if let Err(err) = tabs.notify(target, notification).await {
        courier_warn!("Notifying tab {} failed: {}", target, err);
    }
}

fn send_msg(events: &mpsc::UnboundedSender<ControllerEvent>, msg: Msg) {
    // Closed only after shutdown; late completions are dropped.
    let _ = events.send(ControllerEvent::Msg(msg));
}

fn send_reply(reply: Option<oneshot::Sender<Reply>>, value: Reply) {
    if let Some(reply) = reply {
        let _ = reply.send(value);
    }
}
