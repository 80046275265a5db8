use std::fmt;

use url::Url;

pub const API_SCHEME: &str = "apiScheme";
pub const API_HOST: &str = "apiHost";
pub const API_PORT: &str = "apiPort";
pub const API_USERNAME: &str = "apiUsername";
pub const API_PASSWORD: &str = "apiPassword";
pub const DEFAULT_CATEGORY: &str = "defaultCategory";
/// Written by the left-click content script when a magnet link is captured.
pub const MAGNET_LINK: &str = "magnetLink";
/// Link awaiting a category choice in the picker popup.
pub const PENDING_TORRENT_URL: &str = "pendingTorrentUrl";

/// Keys that make up the connection settings; a change to any of them re-probes health.
pub const CONNECTION_KEYS: [&str; 5] = [API_SCHEME, API_HOST, API_PORT, API_USERNAME, API_PASSWORD];

const PLACEHOLDERS: &[&str] = &["undefined", "null"];

/// One changed key as reported by the config store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub new_value: Option<String>,
}

impl SettingChange {
    pub fn new(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: key.into(),
            new_value,
        }
    }

    pub fn is_connection_key(&self) -> bool {
        CONNECTION_KEYS.contains(&self.key.as_str())
    }
}

/// Raw connection fields as stored; any of them may be missing.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionSettings {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Builds settings from any key lookup (store snapshot, map, test closure).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            scheme: lookup(API_SCHEME),
            host: lookup(API_HOST),
            port: lookup(API_PORT),
            username: lookup(API_USERNAME),
            password: lookup(API_PASSWORD),
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A fully specified server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl ServerEndpoint {
    /// Validates the parts by parsing the assembled base URL. The parse must
    /// give back exactly the host and port that went in, with nothing after them.
    pub fn new(scheme: &str, host: &str, port: u16) -> Option<Self> {
        let scheme = scheme.trim().to_ascii_lowercase();
        let host = bracket_ipv6(host.trim());
        let url = Url::parse(&format!("{scheme}://{host}:{port}")).ok()?;

        let same_host = url
            .host_str()
            .is_some_and(|parsed| parsed.eq_ignore_ascii_case(&host));
        let bare = url.path() == "/"
            && url.query().is_none()
            && url.fragment().is_none()
            && url.username().is_empty()
            && url.password().is_none();
        if !same_host || url.port_or_known_default() != Some(port) || !bare {
            return None;
        }
        Some(Self { scheme, host, port })
    }

    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Web API URL for `path`, e.g. `app/version` -> `{base}/api/v2/app/version`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

/// `::1` -> `[::1]`; anything else is returned as is.
fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Endpoint as resolved from settings. `Unconfigured` must be checked before any request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    #[default]
    Unconfigured,
    Configured(ServerEndpoint),
}

impl Endpoint {
    pub fn is_configured(&self) -> bool {
        matches!(self, Endpoint::Configured(_))
    }

    pub fn configured(&self) -> Option<&ServerEndpoint> {
        match self {
            Endpoint::Configured(endpoint) => Some(endpoint),
            Endpoint::Unconfigured => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedConnection {
    pub endpoint: Endpoint,
    pub credentials: Credentials,
}

/// Assembles endpoint and credentials. Absence is a normal state, never an error.
pub fn resolve_connection(settings: &ConnectionSettings) -> ResolvedConnection {
    let endpoint = match (
        present(&settings.scheme),
        present(&settings.host),
        present(&settings.port).and_then(|port| port.parse::<u16>().ok()),
    ) {
        (Some(scheme), Some(host), Some(port)) => ServerEndpoint::new(scheme, host, port)
            .map(Endpoint::Configured)
            .unwrap_or_default(),
        _ => Endpoint::Unconfigured,
    };

    let credentials = Credentials::new(
        credential_field(&settings.username),
        credential_field(&settings.password),
    );

    ResolvedConnection {
        endpoint,
        credentials,
    }
}

/// Missing or placeholder credential fields become empty. Values are kept
/// verbatim otherwise; whitespace can be part of a password.
fn credential_field(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(raw) if !is_placeholder(raw.trim()) => raw.to_string(),
        _ => String::new(),
    }
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(value))
}

/// Blank strings and placeholder values count as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    let trimmed = value.as_deref()?.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        None
    } else {
        Some(trimmed)
    }
}
