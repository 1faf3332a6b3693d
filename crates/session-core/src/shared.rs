use session_protocol::ConnectionState;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

/// Session status shared between the actor and the facade.
///
/// Facade queries (`is_open`, `state`, `device_name`) must never cross the
/// actor channel, so the actor publishes its status here. Only the actor
/// writes; the facade reads.
pub(crate) struct SessionShared {
    state: AtomicU8,
    selected: AtomicBool,
    device_name: Mutex<Option<String>>,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Closed.to_u8()),
            selected: AtomicBool::new(false),
            device_name: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        // An invalid stored value cannot occur (only the actor writes),
        // but Closed is the safe reading for it regardless.
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(ConnectionState::Closed)
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    pub(crate) fn is_selected(&self) -> bool {
        self.selected.load(Ordering::Acquire)
    }

    pub(crate) fn set_selected(&self, selected: bool, name: Option<String>) {
        self.selected.store(selected, Ordering::Release);
        if let Ok(mut guard) = self.device_name.lock() {
            *guard = name;
        }
    }

    pub(crate) fn device_name(&self) -> Option<String> {
        self.device_name.lock().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed_and_unselected() {
        let shared = SessionShared::new();
        assert_eq!(shared.state(), ConnectionState::Closed);
        assert!(!shared.is_selected());
        assert_eq!(shared.device_name(), None);
    }

    #[test]
    fn test_selection_roundtrip() {
        let shared = SessionShared::new();
        shared.set_selected(true, Some("CH340".into()));
        assert!(shared.is_selected());
        assert_eq!(shared.device_name(), Some("CH340".to_string()));

        shared.set_selected(false, None);
        assert!(!shared.is_selected());
        assert_eq!(shared.device_name(), None);
    }
}
