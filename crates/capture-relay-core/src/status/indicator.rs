use crate::session::SessionState;

/// Icon artwork to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconVariant {
    /// Ready to record.
    Idle,
    /// Waiting on selection or a stop.
    Busy,
    /// Capturing.
    Recording,
}

/// Everything the action icon displays, derived only from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorState {
    /// Badge text: `"REC"` while recording, empty otherwise.
    pub badge_text: &'static str,
    /// Icon artwork.
    pub icon: IconVariant,
    /// Whether clicking the icon opens the popup. When disabled, the click
    /// is delivered as an unconditional stop.
    pub popup_enabled: bool,
}

impl From<SessionState> for IndicatorState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Idle => Self {
                badge_text: "",
                icon: IconVariant::Idle,
                popup_enabled: true,
            },
            SessionState::Preparing | SessionState::Stopping => Self {
                badge_text: "",
                icon: IconVariant::Busy,
                popup_enabled: false,
            },
            SessionState::Recording => Self {
                badge_text: "REC",
                icon: IconVariant::Recording,
                popup_enabled: false,
            },
        }
    }
}
