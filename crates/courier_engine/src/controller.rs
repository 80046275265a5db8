use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use courier_core::{
    update, Action, ControllerState, MenuItem, Msg, Reply, RequestId, SettingChange, TabId,
};
use courier_logging::{courier_debug, courier_info, courier_warn};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::effects::{EffectRunner, Services};
use crate::{
    CategoryService, ConfigStore, ControllerError, CredentialResolver, HealthMonitor, PopupSpec,
    QbitApi, SessionAuthenticator, SubmissionPipeline, TabHost, ToolbarHost,
};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub health_interval: Duration,
    /// Settle time between a tab finishing loading and the preferences automation.
    pub automation_delay: Duration,
    pub category_picker: PopupSpec,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            health_interval: Duration::from_secs(30),
            automation_delay: Duration::from_millis(500),
            category_picker: PopupSpec::default(),
        }
    }
}

pub(crate) enum ControllerEvent {
    Action {
        action: Action,
        origin: Option<TabId>,
        reply: oneshot::Sender<Reply>,
    },
    Msg(Msg),
}

/// Cloneable entry point for UI surfaces and browser listeners.
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::UnboundedSender<ControllerEvent>,
    shutdown: CancellationToken,
}

impl ControllerHandle {
    /// Sends a UI action and waits until its handler has finished.
    pub async fn dispatch(
        &self,
        action: Action,
        origin: Option<TabId>,
    ) -> Result<Reply, ControllerError> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(ControllerEvent::Action {
                action,
                origin,
                reply,
            })
            .map_err(|_| ControllerError::Stopped)?;
        response.await.map_err(|_| ControllerError::NoReply)
    }

    pub fn menu_clicked(
        &self,
        item: MenuItem,
        link_url: impl Into<String>,
        origin: Option<TabId>,
    ) -> Result<(), ControllerError> {
        self.send(Msg::MenuClicked {
            item,
            link_url: link_url.into(),
            origin,
        })
    }

    pub fn tab_loaded(&self, tab: TabId) -> Result<(), ControllerError> {
        self.send(Msg::TabLoadCompleted { tab })
    }

    /// Forces an immediate health probe outside the periodic schedule.
    pub fn refresh_health(&self) -> Result<(), ControllerError> {
        self.send(Msg::HealthTick)
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn send(&self, msg: Msg) -> Result<(), ControllerError> {
        if self.shutdown.is_cancelled() {
            return Err(ControllerError::Stopped);
        }
        self.events
            .send(ControllerEvent::Msg(msg))
            .map_err(|_| ControllerError::Stopped)
    }
}

/// Owns the controller state and routes every event through [`update`].
///
/// All state changes happen on the loop in [`Controller::run`]; network and
/// browser work runs in spawned tasks that report back as messages. There is
/// no queueing across actions: each handler proceeds independently.
pub struct Controller {
    state: ControllerState,
    settings: ControllerSettings,
    services: Services,
    runner: EffectRunner,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    replies: HashMap<RequestId, oneshot::Sender<Reply>>,
    next_request: RequestId,
    shutdown: CancellationToken,
}

impl Controller {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        api: Arc<dyn QbitApi>,
        tabs: Arc<dyn TabHost>,
        toolbar: Arc<dyn ToolbarHost>,
        settings: ControllerSettings,
    ) -> (Self, ControllerHandle) {
        let resolver = CredentialResolver::new(store.clone());
        let authenticator = SessionAuthenticator::new(api.clone());
        let services = Services {
            store,
            monitor: HealthMonitor::new(resolver.clone(), api.clone()),
            pipeline: SubmissionPipeline::new(resolver.clone(), authenticator.clone(), api.clone()),
            categories: CategoryService::new(resolver.clone(), authenticator.clone(), api),
            resolver,
            authenticator,
            tabs,
            toolbar,
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let runner = EffectRunner::new(
            services.clone(),
            events_tx.clone(),
            settings.automation_delay,
            settings.category_picker.clone(),
        );
        let handle = ControllerHandle {
            events: events_tx.clone(),
            shutdown: shutdown.clone(),
        };

        let controller = Self {
            state: ControllerState::new(),
            settings,
            services,
            runner,
            events_rx,
            events_tx,
            replies: HashMap::new(),
            next_request: 1,
            shutdown,
        };
        (controller, handle)
    }

    /// Runs until [`ControllerHandle::shutdown`] is called.
    pub async fn run(mut self) {
        let changes = self.services.store.subscribe();
        let default_category = self.services.resolver.default_category().await;
        self.apply(Msg::Started { default_category });

        spawn_health_ticker(
            self.events_tx.clone(),
            self.settings.health_interval,
            self.shutdown.clone(),
        );
        spawn_settings_watcher(self.events_tx.clone(), changes, self.shutdown.clone());

        courier_info!("Controller running");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
        courier_info!("Controller stopped");
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Action {
                action,
                origin,
                reply,
            } => {
                let request = self.next_request;
                self.next_request += 1;
                self.replies.insert(request, reply);
                self.apply(Msg::ActionReceived {
                    request,
                    action,
                    origin,
                });
            }
            ControllerEvent::Msg(msg) => self.apply(msg),
        }
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if self.state.consume_dirty() {
            courier_debug!("Controller state: {:?}", self.state.view());
        }

        for effect in effects {
            let reply = effect
                .request()
                .and_then(|request| self.replies.remove(&request));
            self.runner.run(effect, reply);
        }
    }
}

fn spawn_health_ticker(
    events: mpsc::UnboundedSender<ControllerEvent>,
    period: Duration,
    shutdown: CancellationToken,
) {
    // `interval` panics on a zero period.
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; startup already probed.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    if events.send(ControllerEvent::Msg(Msg::HealthTick)).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn spawn_settings_watcher(
    events: mpsc::UnboundedSender<ControllerEvent>,
    mut changes: broadcast::Receiver<Vec<SettingChange>>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let batch = tokio::select! {
                _ = shutdown.cancelled() => break,
                batch = changes.recv() => batch,
            };
            match batch {
                Ok(batch) => {
                    if events
                        .send(ControllerEvent::Msg(Msg::SettingsChanged(batch)))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    courier_warn!("Missed {} settings change batches; re-probing", missed);
                    let _ = events.send(ControllerEvent::Msg(Msg::HealthTick));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
