//! Host-environment signals that drive background revalidation.

use tokio::sync::broadcast;

/// Capacity of each signal channel. A burst beyond it collapses into a
/// single revalidation, which is the wanted behavior for edge triggers.
const SIGNAL_BUFFER: usize = 8;

/// Edge-triggered host signals: foreground focus regained and connectivity
/// restored.
///
/// Sessions subscribe to both channels at spawn time. Whatever owns the host
/// integration (a windowing layer, a connectivity probe, a test) emits
/// through the same hub. Clones share the underlying channels.
#[derive(Clone)]
pub struct EnvironmentSignals {
    focus: broadcast::Sender<()>,
    online: broadcast::Sender<()>,
}

impl EnvironmentSignals {
    /// Creates a signal hub with no subscribers.
    pub fn new() -> Self {
        let (focus, _) = broadcast::channel(SIGNAL_BUFFER);
        let (online, _) = broadcast::channel(SIGNAL_BUFFER);
        Self { focus, online }
    }

    /// Signals that the host regained foreground focus.
    pub fn emit_focus(&self) {
        // send only fails when no receiver exists, which is fine for a signal
        let _ = self.focus.send(());
    }

    /// Signals that connectivity was restored.
    pub fn emit_online(&self) {
        let _ = self.online.send(());
    }

    /// Subscribes to focus-regained events.
    pub fn on_focus(&self) -> broadcast::Receiver<()> {
        self.focus.subscribe()
    }

    /// Subscribes to connectivity-restored events.
    pub fn on_online(&self) -> broadcast::Receiver<()> {
        self.online.subscribe()
    }
}

impl Default for EnvironmentSignals {
    fn default() -> Self {
        Self::new()
    }
}
