#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Once};
use std::time::Duration;

use courier_core::settings::{API_HOST, API_PASSWORD, API_PORT, API_SCHEME, API_USERNAME};
use courier_engine::MemoryConfigStore;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(courier_logging::initialize_for_tests);
}

/// Store pointing at `uri` (e.g. a `MockServer::uri()`), with admin/secret credentials.
pub fn store_for(uri: &str) -> Arc<MemoryConfigStore> {
    store_with(uri, [])
}

pub fn store_with<const N: usize>(
    uri: &str,
    extra: [(&str, &str); N],
) -> Arc<MemoryConfigStore> {
    let url = url::Url::parse(uri).unwrap();
    let mut values = vec![
        (API_SCHEME.to_string(), url.scheme().to_string()),
        (API_HOST.to_string(), url.host_str().unwrap().to_string()),
        (
            API_PORT.to_string(),
            url.port_or_known_default().unwrap().to_string(),
        ),
        (API_USERNAME.to_string(), "admin".to_string()),
        (API_PASSWORD.to_string(), "secret".to_string()),
    ];
    values.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Arc::new(MemoryConfigStore::with_values(values))
}

/// Base URL of a local port nothing listens on.
pub fn refused_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Polls `check` until it holds or five seconds pass.
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    let polled = tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting for {what}");
}
