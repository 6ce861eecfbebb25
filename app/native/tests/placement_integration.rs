//! End-to-end tests of the orchestrator against the in-memory display server.

mod common;

use common::{Harness, eventually, primary_frame, secondary_frame, window};
use tessel_lib::config::{TesselConfig, load_config_from_path};
use tessel_lib::placement::Lifecycle;
use tessel_lib::placement::actions::WindowAction;
use tessel_lib::placement::binding::{DisplayCommand, DisplayEvent, MonitorSpec};
use tessel_lib::placement::geometry::{Point, Rect, Size};
use tessel_lib::placement::rules::{Condition, RuleTrigger, WindowRule};

fn manual_config() -> TesselConfig {
    let mut config = TesselConfig::default();
    config.tiling.auto_tile = false;
    config
}

#[tokio::test]
async fn test_primary_focused_distribution_keeps_small_sets_on_primary() {
    let harness = Harness::new(&manual_config()).await;
    harness.open(window(1, "editor", primary_frame())).await;
    assert_eq!(harness.monitor_of(1), Some(1));

    harness.orchestrator.set_distribution_strategy("primary-focused").unwrap();
    harness.open(window(2, "terminal", secondary_frame())).await;
    harness.open(window(3, "browser", secondary_frame())).await;
    assert_eq!(harness.monitor_of(2), Some(2));

    let assignment = harness.orchestrator.distribute_windows().await.unwrap();
    assert_eq!(assignment.len(), 3);

    for id in 1..=3 {
        assert_eq!(harness.monitor_of(id), Some(1), "window {id}");
    }
    assert!(harness.orchestrator.topology().windows_on(2).is_empty());
    assert_eq!(harness.orchestrator.topology().windows_on(1).len(), 3);
    // Moved windows keep their size and land inside the primary.
    let frame = harness.orchestrator.registry().get(2).unwrap().frame;
    assert_eq!(frame, Rect::new(180.0, 100.0, 800.0, 600.0));
    assert_eq!(harness.mock.frame_of(2), Some(frame));
}

#[tokio::test]
async fn test_browser_rule_maximizes_through_running_pipeline() {
    let harness = Harness::new(&TesselConfig::default()).await;
    let orchestrator = &harness.orchestrator;
    orchestrator
        .add_rule(
            WindowRule::new("browser-max", "Maximize browsers")
                .when(Condition::app_is("Browser"))
                .then(WindowAction::Maximize)
                .on(RuleTrigger::WindowCreated),
        )
        .unwrap();
    orchestrator.start().unwrap();

    harness.emit_open(window(1, "browser", primary_frame()));
    let maximized =
        eventually(|| orchestrator.registry().get(1).is_ok_and(|w| w.flags.maximized)).await;

    let window = orchestrator.registry().get(1).unwrap();
    let matches = orchestrator.rules().rule("browser-max").unwrap().stats.match_count;
    orchestrator.stop();

    assert!(maximized);
    assert_eq!(window.frame, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    assert_eq!(matches, 1);
    assert!(harness.mock.commands().iter().any(|c| matches!(c, DisplayCommand::Maximize { id: 1, .. })));
}

#[tokio::test]
async fn test_rules_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.jsonc");
    std::fs::write(
        &path,
        r#"{
            // Terminals always go to the external monitor.
            "tiling": { "autoTile": false },
            "rules": {
                "rules": [{
                    "id": "terminal-external",
                    "name": "Terminals on the external monitor",
                    "conditions": [{ "field": "app", "op": "equals", "value": "terminal" }],
                    "actions": [{ "type": "moveToMonitor", "monitor": 2 }, { "type": "addTag", "tag": "dev" }],
                    "triggers": ["window-created"]
                }]
            }
        }"#,
    )
    .unwrap();
    let (config, _) = load_config_from_path(&path).unwrap();

    let harness = Harness::new(&config).await;
    harness.open(window(1, "terminal", primary_frame())).await;
    harness.open(window(2, "editor", primary_frame())).await;

    let terminal = harness.orchestrator.registry().get(1).unwrap();
    assert_eq!(terminal.monitor_id, Some(2));
    assert!(terminal.has_tag("dev"));
    assert_eq!(terminal.frame, Rect::new(2020.0, 100.0, 800.0, 600.0));
    assert_eq!(harness.monitor_of(2), Some(1));
}

#[tokio::test]
async fn test_auto_tile_splits_workspace() {
    let mut config = TesselConfig::default();
    config.tiling.ai_optimization = false;
    config.tiling.preferred_algorithm = Some("columns".to_string());
    let harness = Harness::new(&config).await;
    harness.orchestrator.show_workspace(1, 1).unwrap();

    harness.open(window(1, "editor", primary_frame())).await;
    harness.open(window(2, "terminal", primary_frame())).await;

    let left = harness.orchestrator.registry().get(1).unwrap().frame;
    let right = harness.orchestrator.registry().get(2).unwrap().frame;
    assert!(left.max_x() <= right.x);
    assert!(right.max_x() <= 1920.0);

    // Closing one window hands the workspace back to the other.
    harness.orchestrator.handle_event(DisplayEvent::WindowClosed { id: 2 }).await.unwrap();
    let alone = harness.orchestrator.registry().get(1).unwrap().frame;
    assert!(alone.width > left.width);
}

#[tokio::test]
async fn test_focus_prediction_prefers_recent_switches() {
    let harness = Harness::new(&manual_config()).await;
    for (id, app) in [(1, "editor"), (2, "terminal"), (3, "browser")] {
        harness.open(window(id, app, primary_frame())).await;
    }
    for _ in 0..5 {
        harness.orchestrator.focus_window(1).unwrap();
        harness.orchestrator.focus_window(2).unwrap();
    }
    harness.orchestrator.focus_window(1).unwrap();

    let predictions = harness.orchestrator.predict_next_focus().await;
    assert!(!predictions.is_empty());
    assert!(predictions.iter().all(|p| p.window_id != 1));
    assert_eq!(predictions[0].window_id, 2);
    assert!(predictions.windows(2).all(|pair| pair[0].confidence >= pair[1].confidence));
}

#[tokio::test]
async fn test_monitor_hotplug_round_trip() {
    let harness = Harness::new(&manual_config()).await;
    harness.open(window(1, "terminal", secondary_frame())).await;

    harness.mock.remove_monitor(2);
    let report = harness.orchestrator.sync().await.unwrap();
    assert_eq!(report.reassigned, vec![1]);
    assert_eq!(harness.monitor_of(1), Some(1));
    assert_eq!(harness.orchestrator.status().monitors, 1);

    let projector = MonitorSpec::new(3, "projector", Size::new(1280.0, 720.0), Point::new(0.0, 1080.0));
    harness.mock.add_monitor(projector.clone());
    harness.orchestrator.handle_event(DisplayEvent::MonitorAdded(projector)).await.unwrap();

    // Keeps its offset from the primary, clamped into the smaller screen.
    harness.orchestrator.move_window_to_monitor(1, 3).await.unwrap();
    let frame = harness.orchestrator.registry().get(1).unwrap().frame;
    assert_eq!(frame, Rect::new(480.0, 1200.0, 800.0, 600.0));
    assert_eq!(harness.monitor_of(1), Some(3));
}

#[tokio::test]
async fn test_repeated_focus_raises_frequency_confidence() {
    let mut config = manual_config();
    config.focus.min_confidence = 0.0;
    for (model, weight) in [("frequency", 1.0), ("pattern", 0.0), ("temporal", 0.0), ("context", 0.0)] {
        config.focus.model_weights.insert(model.to_string(), weight);
    }
    let harness = Harness::new(&config).await;
    harness.open(window(1, "editor", primary_frame())).await;
    harness.open(window(2, "terminal", primary_frame())).await;

    let mut confidences = Vec::new();
    for _ in 0..4 {
        harness.orchestrator.focus_window(2).unwrap();
        harness.orchestrator.focus_window(2).unwrap();
        harness.orchestrator.focus_window(1).unwrap();

        let predictions = harness.orchestrator.predict_next_focus().await;
        let terminal = predictions.iter().find(|p| p.window_id == 2).expect("terminal predicted");
        confidences.push(terminal.confidence);
    }

    assert!(confidences.windows(2).all(|pair| pair[1] > pair[0]), "{confidences:?}");
    assert!((confidences[0] - 0.5).abs() < 1e-9);
}
