use std::collections::BTreeMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{DisplayBinding, DisplayCommand, DisplayEvent, MonitorSpec, WindowSpec};
use crate::placement::error::{PlacementError, PlacementResult};
use crate::placement::geometry::Rect;
use crate::placement::{MonitorId, WindowId};

#[derive(Debug, Default)]
struct MockState {
    windows: BTreeMap<WindowId, WindowSpec>,
    monitors: BTreeMap<MonitorId, MonitorSpec>,
    commands: Vec<DisplayCommand>,
    failing: bool,
}

/// In-memory display server.
///
/// Commands are recorded and applied to the stored windows so that later
/// queries observe them. Events are only delivered through [`emit`](Self::emit).
#[derive(Debug)]
pub struct MockBinding {
    state: Mutex<MockState>,
    sender: mpsc::UnboundedSender<DisplayEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<DisplayEvent>>>,
}

impl MockBinding {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(MockState::default()),
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Registers a window without emitting an event.
    pub fn add_window(&self, spec: WindowSpec) { self.state.lock().windows.insert(spec.id, spec); }

    /// Forgets a window without emitting an event.
    pub fn remove_window(&self, id: WindowId) -> Option<WindowSpec> {
        self.state.lock().windows.remove(&id)
    }

    /// Registers (or replaces) a monitor without emitting an event.
    pub fn add_monitor(&self, spec: MonitorSpec) { self.state.lock().monitors.insert(spec.id, spec); }

    /// Forgets a monitor without emitting an event.
    pub fn remove_monitor(&self, id: MonitorId) -> Option<MonitorSpec> {
        self.state.lock().monitors.remove(&id)
    }

    /// Pushes an event onto the stream.
    ///
    /// Returns `false` once the receiving side has been dropped.
    pub fn emit(&self, event: DisplayEvent) -> bool { self.sender.send(event).is_ok() }

    /// Makes every subsequent command fail until reset.
    pub fn set_failing(&self, failing: bool) { self.state.lock().failing = failing; }

    /// Commands executed so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<DisplayCommand> { self.state.lock().commands.clone() }

    /// The stored frame of a window.
    #[must_use]
    pub fn frame_of(&self, id: WindowId) -> Option<Rect> {
        self.state.lock().windows.get(&id).map(|w| w.frame)
    }
}

impl Default for MockBinding {
    fn default() -> Self { Self::new() }
}

impl DisplayBinding for MockBinding {
    fn execute(&self, command: DisplayCommand) -> PlacementResult<()> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(PlacementError::binding(format!("rejected {command:?}")));
        }

        let id = command.window_id();
        if matches!(command, DisplayCommand::Close { .. }) {
            if state.windows.remove(&id).is_none() {
                return Err(PlacementError::binding(format!("unknown window {id}")));
            }
            state.commands.push(command);
            return Ok(());
        }

        let Some(window) = state.windows.get_mut(&id) else {
            return Err(PlacementError::binding(format!("unknown window {id}")));
        };

        match &command {
            DisplayCommand::Move { origin, .. } => {
                window.frame.x = origin.x;
                window.frame.y = origin.y;
            }
            DisplayCommand::Resize { size, .. } => {
                window.frame.width = size.width;
                window.frame.height = size.height;
            }
            DisplayCommand::SetFrame { frame, .. } | DisplayCommand::Maximize { frame, .. } => {
                window.frame = *frame;
                window.minimized = false;
            }
            DisplayCommand::Focus { .. } => window.minimized = false,
            DisplayCommand::Minimize { .. } => window.minimized = true,
            DisplayCommand::Close { .. } => {}
        }

        state.commands.push(command);
        Ok(())
    }

    fn windows(&self) -> PlacementResult<Vec<WindowSpec>> {
        Ok(self.state.lock().windows.values().cloned().collect())
    }

    fn monitors(&self) -> PlacementResult<Vec<MonitorSpec>> {
        Ok(self.state.lock().monitors.values().cloned().collect())
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<DisplayEvent>> {
        self.receiver.lock().take()
    }
}
