//! Shared fixtures for placement integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tessel_lib::config::TesselConfig;
use tessel_lib::placement::Orchestrator;
use tessel_lib::placement::binding::{DisplayBinding, DisplayEvent, MockBinding, MonitorSpec, WindowSpec};
use tessel_lib::placement::geometry::{Point, Rect, Size};

/// Orchestrator over a mock with a primary 1920x1080 monitor (id 1) and a
/// second one to its right (id 2).
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub mock: Arc<MockBinding>,
}

impl Harness {
    pub async fn new(config: &TesselConfig) -> Self {
        let mock = Arc::new(MockBinding::new());
        mock.add_monitor(
            MonitorSpec::new(1, "built-in", Size::new(1920.0, 1080.0), Point::new(0.0, 0.0)).primary(),
        );
        mock.add_monitor(MonitorSpec::new(2, "external", Size::new(1920.0, 1080.0), Point::new(1920.0, 0.0)));

        let binding: Arc<dyn DisplayBinding> = Arc::clone(&mock) as Arc<dyn DisplayBinding>;
        let orchestrator = Orchestrator::new(config, binding, None).expect("valid config");
        orchestrator.sync().await.expect("initial sync");
        Self { orchestrator, mock }
    }

    /// Opens a window on the mock and delivers its creation event directly.
    pub async fn open(&self, spec: WindowSpec) {
        self.mock.add_window(spec.clone());
        self.orchestrator
            .handle_event(DisplayEvent::WindowCreated(spec))
            .await
            .expect("window created");
    }

    /// Opens a window on the mock and emits its creation event on the stream.
    pub fn emit_open(&self, spec: WindowSpec) {
        self.mock.add_window(spec.clone());
        assert!(self.mock.emit(DisplayEvent::WindowCreated(spec)));
    }

    pub fn monitor_of(&self, id: u32) -> Option<u32> {
        self.orchestrator.registry().get(id).ok().and_then(|w| w.monitor_id)
    }
}

pub fn window(id: u32, app: &str, frame: Rect) -> WindowSpec { WindowSpec::new(id, app, frame) }

pub fn primary_frame() -> Rect { Rect::new(100.0, 100.0, 800.0, 600.0) }

pub fn secondary_frame() -> Rect { Rect::new(2100.0, 100.0, 800.0, 600.0) }

/// Polls `check` until it holds or one second passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
