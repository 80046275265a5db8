use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use courier_core::{Action, MenuItem, TabId};
use courier_engine::{
    ApiSettings, ConfigStore, Controller, ControllerHandle, ControllerSettings, ReqwestQbitApi,
};
use courier_logging::{courier_info, courier_warn};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::host::ConsoleHost;
use super::logging::{self, LogDestination};
use super::persistence::{FileConfigStore, SETTINGS_FILENAME};

/// Inbound browser events, one JSON object per line on stdin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum InboundEvent {
    /// A UI surface sent an action; `id` correlates the reply.
    #[serde(rename_all = "camelCase")]
    Message {
        #[serde(default)]
        id: Option<u64>,
        #[serde(default)]
        tab: Option<TabId>,
        payload: Action,
    },
    #[serde(rename_all = "camelCase")]
    MenuClicked {
        menu_item_id: String,
        #[serde(default)]
        link_url: String,
        #[serde(default)]
        tab: Option<TabId>,
    },
    #[serde(rename_all = "camelCase")]
    TabLoaded { tab: TabId },
    #[serde(rename_all = "camelCase")]
    TabActivated { tab: TabId },
    /// Writes from the settings page or the magnet-link content script.
    #[serde(rename_all = "camelCase")]
    StorageSet { values: BTreeMap<String, String> },
    RefreshHealth,
}

pub async fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::from_env());

    let store = Arc::new(
        FileConfigStore::open(format!("./{SETTINGS_FILENAME}"))
            .context("loading settings")?,
    );
    let api = Arc::new(ReqwestQbitApi::new(ApiSettings::default()).context("building HTTP client")?);
    let host = Arc::new(ConsoleHost::stdout());

    let (controller, handle) = Controller::new(
        store.clone(),
        api,
        host.clone(),
        host.clone(),
        ControllerSettings::default(),
    );
    let controller = tokio::spawn(controller.run());
    courier_info!("courier_app started; reading events from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(event) => handle_event(event, &handle, &host, store.as_ref()).await,
            Err(err) => courier_warn!("Ignoring malformed event {:?}: {}", line, err),
        }
    }

    courier_info!("stdin closed; shutting down");
    handle.shutdown();
    controller.await.context("controller task")?;
    Ok(())
}

async fn handle_event(
    event: InboundEvent,
    handle: &ControllerHandle,
    host: &Arc<ConsoleHost>,
    store: &dyn ConfigStore,
) {
    match event {
        InboundEvent::Message { id, tab, payload } => {
            // Replies can take as long as a login plus an add; keep reading meanwhile.
            let handle = handle.clone();
            let host = host.clone();
            tokio::spawn(async move {
                match handle.dispatch(payload, tab).await {
                    Ok(reply) => {
                        if let Some(id) = id {
                            host.reply(id, &reply);
                        }
                    }
                    Err(err) => courier_warn!("Action not handled: {}", err),
                }
            });
        }
        InboundEvent::MenuClicked {
            menu_item_id,
            link_url,
            tab,
        } => match MenuItem::from_id(&menu_item_id) {
            Some(item) => report(handle.menu_clicked(item, link_url, tab)),
            None => courier_warn!("Unknown menu item {:?}", menu_item_id),
        },
        InboundEvent::TabLoaded { tab } => report(handle.tab_loaded(tab)),
        InboundEvent::TabActivated { tab } => host.set_active_tab(tab),
        InboundEvent::StorageSet { values } => {
            if let Err(err) = store.set(values.into_iter().collect()).await {
                courier_warn!("Saving settings failed: {}", err);
            }
        }
        InboundEvent::RefreshHealth => report(handle.refresh_health()),
    }
}

fn report(result: Result<(), courier_engine::ControllerError>) {
    if let Err(err) = result {
        courier_warn!("Event not delivered: {}", err);
    }
}
