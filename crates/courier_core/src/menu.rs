const SEND_TITLE: &str = "Send to qBittorrent";
const SEND_WITH_CATEGORY_TITLE: &str = "Send to qBittorrent (choose category...)";

/// Link context-menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Send with the default category.
    Send,
    /// Ask for a category first.
    SendWithCategory,
}

impl MenuItem {
    pub fn id(self) -> &'static str {
        match self {
            MenuItem::Send => "sendToQbit",
            MenuItem::SendWithCategory => "sendToQbitWithCategory",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "sendToQbit" => Some(MenuItem::Send),
            "sendToQbitWithCategory" => Some(MenuItem::SendWithCategory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub title: String,
}

/// Title of the plain send entry, e.g. `Send to qBittorrent [movies]`.
pub fn send_title(default_category: Option<&str>) -> String {
    match default_category {
        Some(category) => format!("{SEND_TITLE} [{category}]"),
        None => SEND_TITLE.to_string(),
    }
}

pub fn menu_entries(default_category: Option<&str>) -> Vec<MenuEntry> {
    vec![
        MenuEntry {
            item: MenuItem::Send,
            title: send_title(default_category),
        },
        MenuEntry {
            item: MenuItem::SendWithCategory,
            title: SEND_WITH_CATEGORY_TITLE.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{send_title, MenuItem};

    #[test]
    fn title_mentions_category_only_when_set() {
        assert_eq!(send_title(None), "Send to qBittorrent");
        assert_eq!(send_title(Some("tv")), "Send to qBittorrent [tv]");
    }

    #[test]
    fn ids_round_trip() {
        for item in [MenuItem::Send, MenuItem::SendWithCategory] {
            assert_eq!(MenuItem::from_id(item.id()), Some(item));
        }
        assert_eq!(MenuItem::from_id("other"), None);
    }
}
