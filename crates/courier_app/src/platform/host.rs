use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use courier_core::{Indicator, MenuEntry, MenuItem, Notification, Reply, TabId};
use courier_engine::{HostError, PageAutomation, PopupSpec, TabHost, ToolbarHost};
use courier_logging::{courier_error, courier_trace};
use serde::Serialize;

const FIRST_TAB_ID: TabId = 1;

/// Outbound browser commands, one JSON object per line.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum HostCommand<'a> {
    #[serde(rename_all = "camelCase")]
    OpenTab { tab: TabId, url: &'a str },
    #[serde(rename_all = "camelCase")]
    OpenPopup {
        url: &'a str,
        width: u32,
        height: u32,
    },
    #[serde(rename_all = "camelCase")]
    ExecuteScript { tab: TabId, script: String },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        tab: TabId,
        message: &'a Notification,
    },
    #[serde(rename_all = "camelCase")]
    SetBadge { text: &'a str, color: &'a str },
    #[serde(rename_all = "camelCase")]
    InstallMenu { entries: Vec<MenuLine<'a>> },
    #[serde(rename_all = "camelCase")]
    UpdateMenu { id: &'a str, title: &'a str },
    #[serde(rename = "reply")]
    Answer { id: u64, payload: &'a Reply },
}

#[derive(Debug, Serialize)]
struct MenuLine<'a> {
    id: &'a str,
    title: &'a str,
    contexts: [&'a str; 1],
}

/// Browser stand-in that prints commands on a line-oriented channel.
///
/// Tab ids are assigned here when a tab is opened; the other side only
/// reports them back. The active tab is whatever was last announced.
pub(crate) struct ConsoleHost {
    out: Mutex<Box<dyn Write + Send>>,
    next_tab: AtomicU64,
    active: Mutex<Option<TabId>>,
}

impl ConsoleHost {
    pub(crate) fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            next_tab: AtomicU64::new(FIRST_TAB_ID),
            active: Mutex::new(None),
        }
    }

    pub(crate) fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub(crate) fn set_active_tab(&self, tab: TabId) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(tab);
        }
    }

    pub(crate) fn reply(&self, id: u64, reply: &Reply) {
        // A reply nobody reads is not worth failing the request over.
        let _ = self.emit(&HostCommand::Answer { id, payload: reply });
    }

    fn emit(&self, command: &HostCommand<'_>) -> Result<(), HostError> {
        let line = serde_json::to_string(command)
            .map_err(|err| HostError::Rejected(err.to_string()))?;
        courier_trace!("-> {}", line);
        let mut out = self
            .out
            .lock()
            .map_err(|_| HostError::Rejected("output lock poisoned".to_string()))?;
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|err| {
                courier_error!("Writing host command failed: {}", err);
                HostError::Rejected(err.to_string())
            })
    }
}

#[async_trait]
impl TabHost for ConsoleHost {
    async fn open_tab(&self, url: &str) -> Result<TabId, HostError> {
        let tab = self.next_tab.fetch_add(1, Ordering::Relaxed);
        self.emit(&HostCommand::OpenTab { tab, url })?;
        self.set_active_tab(tab);
        Ok(tab)
    }

    async fn open_popup(&self, popup: &PopupSpec) -> Result<(), HostError> {
        self.emit(&HostCommand::OpenPopup {
            url: &popup.url,
            width: popup.width,
            height: popup.height,
        })
    }

    async fn active_tab(&self) -> Option<TabId> {
        self.active.lock().ok().and_then(|active| *active)
    }

    async fn execute(&self, tab: TabId, automation: &PageAutomation) -> Result<(), HostError> {
        self.emit(&HostCommand::ExecuteScript {
            tab,
            script: automation.script(),
        })
    }

    async fn notify(&self, tab: TabId, notification: &Notification) -> Result<(), HostError> {
        self.emit(&HostCommand::SendMessage {
            tab,
            message: notification,
        })
    }
}

impl ToolbarHost for ConsoleHost {
    fn set_indicator(&self, indicator: Indicator) {
        let _ = self.emit(&HostCommand::SetBadge {
            text: indicator.text,
            color: indicator.color,
        });
    }

    fn install_menu(&self, entries: &[MenuEntry]) {
        let entries = entries
            .iter()
            .map(|entry| MenuLine {
                id: entry.item.id(),
                title: &entry.title,
                contexts: ["link"],
            })
            .collect();
        let _ = self.emit(&HostCommand::InstallMenu { entries });
    }

    fn set_menu_title(&self, item: MenuItem, title: &str) {
        let _ = self.emit(&HostCommand::UpdateMenu {
            id: item.id(),
            title,
        });
    }
}
