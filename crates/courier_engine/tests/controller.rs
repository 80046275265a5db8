mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{eventually, init_logging, refused_uri, store_for, store_with};
use courier_core::settings::{DEFAULT_CATEGORY, MAGNET_LINK, PENDING_TORRENT_URL};
use courier_core::{
    Action, AutomationKind, Indicator, MenuEntry, MenuItem, Notification, Reply,
    SubmissionResult, TabId,
};
use courier_engine::{
    ApiSettings, ConfigStore, Controller, ControllerHandle, ControllerSettings, HostError,
    MemoryConfigStore, PageAutomation, PopupSpec, ReqwestQbitApi, TabHost, ToolbarHost,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAGNET: &str = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567";
const FIRST_TAB: TabId = 100;

#[derive(Default)]
struct Recorded {
    indicators: Vec<Indicator>,
    menu: Vec<MenuEntry>,
    titles: Vec<(MenuItem, String)>,
    opened: Vec<String>,
    popups: Vec<PopupSpec>,
    executed: Vec<(TabId, AutomationKind)>,
    notified: Vec<(TabId, Notification)>,
}

#[derive(Default)]
struct FakeHost {
    recorded: Mutex<Recorded>,
}

impl FakeHost {
    fn with<T>(&self, read: impl FnOnce(&Recorded) -> T) -> T {
        read(&self.recorded.lock().unwrap())
    }

    fn last_indicator_text(&self) -> Option<&'static str> {
        self.with(|r| r.indicators.last().map(|i| i.text))
    }
}

#[async_trait::async_trait]
impl TabHost for FakeHost {
    async fn open_tab(&self, url: &str) -> Result<TabId, HostError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.opened.push(url.to_string());
        Ok(FIRST_TAB + recorded.opened.len() as TabId - 1)
    }

    async fn open_popup(&self, popup: &PopupSpec) -> Result<(), HostError> {
        self.recorded.lock().unwrap().popups.push(popup.clone());
        Ok(())
    }

    async fn active_tab(&self) -> Option<TabId> {
        Some(1)
    }

    async fn execute(&self, tab: TabId, automation: &PageAutomation) -> Result<(), HostError> {
        self.recorded
            .lock()
            .unwrap()
            .executed
            .push((tab, automation.kind()));
        Ok(())
    }

    async fn notify(&self, tab: TabId, notification: &Notification) -> Result<(), HostError> {
        self.recorded
            .lock()
            .unwrap()
            .notified
            .push((tab, notification.clone()));
        Ok(())
    }
}

impl ToolbarHost for FakeHost {
    fn set_indicator(&self, indicator: Indicator) {
        self.recorded.lock().unwrap().indicators.push(indicator);
    }

    fn install_menu(&self, entries: &[MenuEntry]) {
        self.recorded.lock().unwrap().menu = entries.to_vec();
    }

    fn set_menu_title(&self, item: MenuItem, title: &str) {
        self.recorded
            .lock()
            .unwrap()
            .titles
            .push((item, title.to_string()));
    }
}

fn start(store: Arc<MemoryConfigStore>) -> (Arc<FakeHost>, ControllerHandle) {
    init_logging();
    let host = Arc::new(FakeHost::default());
    let api = Arc::new(ReqwestQbitApi::new(ApiSettings::default()).unwrap());
    let settings = ControllerSettings {
        health_interval: Duration::from_secs(3600),
        automation_delay: Duration::ZERO,
        ..ControllerSettings::default()
    };
    let (controller, handle) = Controller::new(store, api, host.clone(), host.clone(), settings);
    tokio::spawn(controller.run());
    (host, handle)
}

async fn healthy_server(login_body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/app/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v4.6.2"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_body))
        .mount(&server)
        .await;
    server
}

async fn add_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/api/v2/torrents/add")
        .count()
}

#[tokio::test]
async fn startup_installs_menu_and_shows_connected() {
    let server = healthy_server("Ok.").await;
    let (host, handle) = start(store_with(&server.uri(), [(DEFAULT_CATEGORY, "tv")]));

    eventually("connected indicator", || {
        host.last_indicator_text() == Some("")
    })
    .await;
    host.with(|r| {
        assert_eq!(r.menu.len(), 2);
        assert_eq!(r.menu[0].title, "Send to qBittorrent [tv]");
    });
    handle.shutdown();
}

#[tokio::test]
async fn unconfigured_store_shows_question_mark() {
    let (host, handle) = start(Arc::new(MemoryConfigStore::new()));
    eventually("unconfigured indicator", || {
        host.last_indicator_text() == Some("?")
    })
    .await;
    handle.shutdown();
}

#[tokio::test]
async fn unreachable_server_shows_exclamation_mark() {
    let (host, handle) = start(store_for(&refused_uri()));
    eventually("unreachable indicator", || {
        host.last_indicator_text() == Some("!")
    })
    .await;
    handle.shutdown();
}

#[tokio::test]
async fn submitted_job_replies_and_notifies_origin_tab() {
    let server = healthy_server("Ok.").await;
    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/add"))
        .and(body_string_contains("category=movies"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (host, handle) = start(store_for(&server.uri()));

    let reply = handle
        .dispatch(
            Action::SubmitJob {
                url: MAGNET.to_string(),
                category: Some("movies".to_string()),
            },
            Some(7),
        )
        .await
        .unwrap();
    assert_eq!(reply, Reply::Submitted(SubmissionResult::succeeded()));

    eventually("torrentAdded notification", || {
        host.with(|r| !r.notified.is_empty())
    })
    .await;
    host.with(|r| {
        assert_eq!(
            r.notified,
            vec![(
                7,
                Notification::TorrentAdded {
                    success: true,
                    error: None
                }
            )]
        );
    });
    handle.shutdown();
}

#[tokio::test]
async fn rejected_job_notifies_active_tab_when_origin_unknown() {
    let server = healthy_server("Ok.").await;
    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/add"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let (host, handle) = start(store_for(&server.uri()));

    let reply = handle
        .dispatch(
            Action::SubmitJob {
                url: MAGNET.to_string(),
                category: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Submitted(SubmissionResult::failed("Server returned 403"))
    );

    eventually("notification", || host.with(|r| !r.notified.is_empty())).await;
    host.with(|r| assert_eq!(r.notified[0].0, 1));
    handle.shutdown();
}

#[tokio::test]
async fn refused_submission_reports_unreachable_and_reprobes_once() {
    let (host, handle) = start(store_for(&refused_uri()));
    eventually("startup indicator", || {
        host.with(|r| r.indicators.len() == 1)
    })
    .await;
    host.with(|r| assert_eq!(r.indicators[0].text, "!"));

    let reply = handle
        .dispatch(
            Action::SubmitJob {
                url: MAGNET.to_string(),
                category: None,
            },
            Some(7),
        )
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Submitted(SubmissionResult::failed("Server unreachable"))
    );

    eventually("notification", || host.with(|r| !r.notified.is_empty())).await;
    eventually("re-probe indicator", || {
        host.with(|r| r.indicators.len() >= 2)
    })
    .await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    host.with(|r| {
        let texts: Vec<_> = r.indicators.iter().map(|i| i.text).collect();
        assert_eq!(texts, vec!["!", "!"]);
        assert_eq!(
            r.notified,
            vec![(
                7,
                Notification::TorrentAdded {
                    success: false,
                    error: Some("Server unreachable".to_string())
                }
            )]
        );
    });
    handle.shutdown();
}

#[tokio::test]
async fn menu_send_uses_default_category() {
    let server = healthy_server("Ok.").await;
    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/add"))
        .and(body_string_contains("category=tv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (host, handle) = start(store_with(&server.uri(), [(DEFAULT_CATEGORY, "tv")]));

    eventually("menu installed", || host.with(|r| !r.menu.is_empty())).await;
    handle.menu_clicked(MenuItem::Send, MAGNET, Some(3)).unwrap();

    eventually("notification", || host.with(|r| !r.notified.is_empty())).await;
    host.with(|r| assert_eq!(r.notified[0].0, 3));
    handle.shutdown();
}

#[tokio::test]
async fn menu_send_with_category_opens_picker() {
    let server = healthy_server("Ok.").await;
    let store = store_for(&server.uri());
    let (host, handle) = start(store.clone());

    eventually("menu installed", || host.with(|r| !r.menu.is_empty())).await;
    handle
        .menu_clicked(MenuItem::SendWithCategory, MAGNET, Some(3))
        .unwrap();

    eventually("picker popup", || host.with(|r| !r.popups.is_empty())).await;
    host.with(|r| assert_eq!(r.popups[0], PopupSpec::default()));
    let saved = store.get(&[PENDING_TORRENT_URL]).await.unwrap();
    assert_eq!(saved.get(PENDING_TORRENT_URL).map(String::as_str), Some(MAGNET));
    assert_eq!(add_requests(&server).await, 0);
    handle.shutdown();
}

#[tokio::test]
async fn captured_magnet_link_is_submitted() {
    let server = healthy_server("Ok.").await;
    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/add"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());
    let (host, handle) = start(store.clone());

    eventually("menu installed", || host.with(|r| !r.menu.is_empty())).await;
    store
        .set(vec![
            (DEFAULT_CATEGORY.to_string(), "music".to_string()),
            (MAGNET_LINK.to_string(), MAGNET.to_string()),
        ])
        .await
        .unwrap();

    eventually("notification", || host.with(|r| !r.notified.is_empty())).await;
    host.with(|r| {
        assert_eq!(
            r.titles,
            vec![(MenuItem::Send, "Send to qBittorrent [music]".to_string())]
        );
    });
    let requests = server.received_requests().await.unwrap();
    let add = requests
        .iter()
        .find(|request| request.url.path() == "/api/v2/torrents/add")
        .unwrap();
    assert!(String::from_utf8_lossy(&add.body).contains("category=music"));
    handle.shutdown();
}

#[tokio::test]
async fn failed_login_runs_fallback_once_on_load() {
    let server = healthy_server("Fails.").await;
    let (host, handle) = start(store_for(&server.uri()));

    let reply = handle.dispatch(Action::OpenRemoteUi, None).await.unwrap();
    assert_eq!(
        reply,
        Reply::RemoteUi {
            tab: Some(FIRST_TAB)
        }
    );
    host.with(|r| assert_eq!(r.opened, vec![server.uri()]));

    handle.tab_loaded(FIRST_TAB).unwrap();
    handle.tab_loaded(FIRST_TAB).unwrap();
    eventually("fallback login", || {
        host.with(|r| !r.executed.is_empty())
    })
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    host.with(|r| {
        assert_eq!(r.executed, vec![(FIRST_TAB, AutomationKind::FallbackLogin)]);
    });
    handle.shutdown();
}

#[tokio::test]
async fn established_session_runs_no_automation() {
    let server = healthy_server("Ok.").await;
    let (host, handle) = start(store_for(&server.uri()));

    handle.dispatch(Action::OpenRemoteUi, None).await.unwrap();
    handle.tab_loaded(FIRST_TAB).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    host.with(|r| assert!(r.executed.is_empty()));
    handle.shutdown();
}

#[tokio::test]
async fn protection_flow_logs_in_then_disables_once() {
    let server = healthy_server("Ok.").await;
    let (host, handle) = start(store_for(&server.uri()));

    let reply = handle
        .dispatch(Action::DisableCrossSiteProtection, None)
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::RemoteUi {
            tab: Some(FIRST_TAB)
        }
    );

    handle.tab_loaded(FIRST_TAB).unwrap();
    handle.tab_loaded(FIRST_TAB).unwrap();
    eventually("both automations", || host.with(|r| r.executed.len() >= 2)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    host.with(|r| {
        assert_eq!(r.executed.len(), 2);
        assert!(r
            .executed
            .contains(&(FIRST_TAB, AutomationKind::FallbackLogin)));
        assert!(r
            .executed
            .contains(&(FIRST_TAB, AutomationKind::DisableCrossSiteProtection)));
    });
    handle.shutdown();
}

#[tokio::test]
async fn remote_ui_without_server_opens_nothing() {
    let (host, handle) = start(Arc::new(MemoryConfigStore::new()));
    let reply = handle.dispatch(Action::OpenRemoteUi, None).await.unwrap();
    assert_eq!(reply, Reply::RemoteUi { tab: None });
    host.with(|r| assert!(r.opened.is_empty()));
    handle.shutdown();
}

#[tokio::test]
async fn category_actions_round_trip_through_controller() {
    let server = healthy_server("Ok.").await;
    Mock::given(method("GET"))
        .and(path("/api/v2/torrents/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "movies": {"name": "movies", "savePath": ""}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/createCategory"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let (_host, handle) = start(store_for(&server.uri()));

    let Reply::Categories(categories) = handle
        .dispatch(Action::ListCategories, None)
        .await
        .unwrap()
    else {
        panic!("expected categories");
    };
    assert!(categories.contains_key("movies"));

    let created = handle
        .dispatch(
            Action::CreateCategory {
                category_name: "anime".to_string(),
                save_path: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(created, Reply::CategoryCreated(true));
    handle.shutdown();
}

#[tokio::test]
async fn stopped_controller_rejects_messages() {
    let (_host, handle) = start(Arc::new(MemoryConfigStore::new()));
    handle.shutdown();
    assert!(handle.refresh_health().is_err());
}
