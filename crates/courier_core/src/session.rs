/// Body the login endpoint returns when the session was accepted.
pub const LOGIN_SUCCESS_BODY: &str = "Ok.";

/// Whether the programmatic login established a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Established,
    /// Anything other than the canonical body, including no answer at all.
    /// The interactive fallback login may be needed.
    LegacyRequired,
}

impl SessionOutcome {
    pub fn from_login_body(body: &str) -> Self {
        if body == LOGIN_SUCCESS_BODY {
            SessionOutcome::Established
        } else {
            SessionOutcome::LegacyRequired
        }
    }

    pub fn is_established(self) -> bool {
        self == SessionOutcome::Established
    }
}
