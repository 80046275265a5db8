/// Server reachability as shown on the toolbar badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthState {
    #[default]
    Unconfigured,
    Connected,
    Unreachable,
}

/// Result of one version probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// No endpoint; nothing was sent.
    Unconfigured,
    /// The server answered with a success status.
    Responded,
    /// Non-success status, timeout or transport failure.
    Failed,
}

/// Badge text and background colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub text: &'static str,
    pub color: &'static str,
}

impl HealthState {
    pub fn from_probe(outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Unconfigured => HealthState::Unconfigured,
            ProbeOutcome::Responded => HealthState::Connected,
            ProbeOutcome::Failed => HealthState::Unreachable,
        }
    }

    pub fn indicator(self) -> Indicator {
        match self {
            HealthState::Unconfigured => Indicator {
                text: "?",
                color: "#888",
            },
            HealthState::Connected => Indicator {
                text: "",
                color: "#4CAF50",
            },
            HealthState::Unreachable => Indicator {
                text: "!",
                color: "#f44336",
            },
        }
    }
}
