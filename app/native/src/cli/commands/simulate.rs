//! `tessel simulate`: drives the orchestrator against [`MockBinding`].
//!
//! Monitors are laid out left to right at 1920x1080, the first one primary.
//! Monitor `n` shows workspace `n`. Windows open with random frames, a few
//! focus changes are replayed, then windows are distributed and every
//! workspace is tiled.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::TesselConfig;
use crate::error::TesselError;
use crate::placement::Orchestrator;
use crate::placement::binding::{DisplayBinding, DisplayEvent, MockBinding, MonitorSpec, WindowSpec};
use crate::placement::focus::{FocusSource, WindowPrediction};
use crate::placement::geometry::{Point, Rect, Size};
use crate::placement::monitors::Monitor;
use crate::placement::orchestrator::StatusReport;
use crate::placement::registry::Window;

const APPS: [&str; 8] = ["browser", "editor", "terminal", "chat", "mail", "music", "notes", "calendar"];
const SCREEN: Size = Size::new(1920.0, 1080.0);

/// Arguments of `tessel simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Number of monitors.
    #[arg(long, short, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=8))]
    pub monitors: u32,

    /// Number of windows to open.
    #[arg(long, short, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=64))]
    pub windows: u32,

    /// Distribution strategy to use instead of the configured one.
    #[arg(long, short)]
    pub strategy: Option<String>,

    /// Tiling algorithm to force for every workspace.
    #[arg(long, short)]
    pub algorithm: Option<String>,

    /// Seed for window placement; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Tiling result of one workspace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiledWorkspace {
    pub workspace: u32,
    pub algorithm: String,
    pub windows: usize,
}

/// Everything a simulation run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub seed: u64,
    pub monitors: Vec<Monitor>,
    pub windows: Vec<Window>,
    pub tiled: Vec<TiledWorkspace>,
    pub predictions: Vec<WindowPrediction>,
    pub status: StatusReport,
}

/// Runs a simulation on a fresh current-thread runtime and prints it.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built or a placement step fails.
pub fn execute(args: &SimulateArgs, config: &TesselConfig) -> Result<(), TesselError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let report = runtime.block_on(simulate(args, config))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn mock_monitors(count: u32) -> Arc<MockBinding> {
    let binding = Arc::new(MockBinding::new());
    for index in 0..count {
        let origin = Point::new(f64::from(index) * SCREEN.width, 0.0);
        let spec = MonitorSpec::new(index + 1, format!("display-{}", index + 1), SCREEN, origin);
        binding.add_monitor(if index == 0 { spec.primary() } else { spec });
    }
    binding
}

fn random_frame(rng: &mut StdRng, monitor: u32) -> Rect {
    let width = rng.random_range(400.0..1200.0);
    let height = rng.random_range(300.0..900.0);
    let x = f64::from(monitor - 1) * SCREEN.width + rng.random_range(0.0..SCREEN.width - width);
    let y = rng.random_range(0.0..SCREEN.height - height);
    Rect::new(x.round(), y.round(), width.round(), height.round())
}

/// Runs one simulation.
///
/// # Errors
///
/// Returns an error for unknown strategies or algorithms, or if a placement
/// step fails.
pub async fn simulate(args: &SimulateArgs, config: &TesselConfig) -> Result<SimulationReport, TesselError> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::debug!("simulate: seed {seed}, {} monitors, {} windows", args.monitors, args.windows);

    let mock = mock_monitors(args.monitors);
    let binding: Arc<dyn DisplayBinding> = Arc::clone(&mock) as Arc<dyn DisplayBinding>;
    let orchestrator = Orchestrator::new(config, binding, None)?;
    orchestrator.sync().await?;

    if let Some(strategy) = &args.strategy {
        orchestrator.set_distribution_strategy(strategy)?;
    }
    for monitor in 1..=args.monitors {
        orchestrator.show_workspace(monitor, monitor)?;
    }

    for id in 1..=args.windows {
        let monitor = rng.random_range(1..=args.monitors);
        let app = APPS[rng.random_range(0..APPS.len())];
        let spec = WindowSpec::new(id, app, random_frame(&mut rng, monitor))
            .with_title(format!("{app} #{id}"))
            .on_workspace(monitor);
        mock.add_window(spec.clone());
        orchestrator.handle_event(DisplayEvent::WindowCreated(spec)).await?;
    }

    if args.windows > 0 {
        for _ in 0..args.windows.min(8) {
            let id = rng.random_range(1..=args.windows);
            let event = DisplayEvent::WindowFocused { id, source: FocusSource::Click };
            orchestrator.handle_event(event).await?;
        }
    }

    orchestrator.distribute_windows().await?;
    for window in orchestrator.registry().list() {
        if let Some(monitor) = window.monitor_id.filter(|m| *m != window.workspace_id) {
            orchestrator.move_window_to_workspace(window.id, monitor).await?;
        }
    }

    let mut tiled = Vec::new();
    for workspace in 1..=args.monitors {
        if let Some(outcome) = orchestrator.tile_workspace(workspace, args.algorithm.as_deref()).await? {
            tiled.push(TiledWorkspace {
                workspace,
                algorithm: outcome.algorithm,
                windows: outcome.placements.len(),
            });
        }
    }

    let predictions = orchestrator.predict_next_focus().await;
    Ok(SimulationReport {
        seed,
        monitors: orchestrator.topology().list(),
        windows: orchestrator.registry().list(),
        tiled,
        predictions,
        status: orchestrator.status(),
    })
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Monitor")]
    monitor: String,
    #[tabled(rename = "Workspace")]
    workspace: u32,
    #[tabled(rename = "Frame")]
    frame: String,
    #[tabled(rename = "Focused")]
    focused: String,
}

fn print_report(report: &SimulationReport) {
    let rows: Vec<WindowRow> = report
        .windows
        .iter()
        .map(|w| WindowRow {
            id: w.id,
            app: w.app.clone(),
            monitor: w.monitor_id.map_or_else(|| "-".to_string(), |m| m.to_string()),
            workspace: w.workspace_id,
            frame: output::format_frame(&w.frame),
            focused: output::format_bool(w.flags.focused),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..1)).with(Alignment::right()))
        .with(Modify::new(Columns::new(5..6)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Windows ({})", report.windows.len()).bold());
    println!("{table}");
    println!();

    let status = &report.status;
    println!("{} {}", "Strategy:".bold(), status.strategy);
    for workspace in &report.tiled {
        println!(
            "{} workspace {} with {} ({} windows)",
            "Tiled:".bold(),
            workspace.workspace,
            workspace.algorithm.cyan(),
            workspace.windows
        );
    }
    if let Some(best) = report.predictions.first() {
        println!(
            "{} window {} ({} confidence)",
            "Next focus:".bold(),
            best.window_id,
            output::format_percent(best.confidence)
        );
    }
    println!(
        "{} {} events, {} rule executions, seed {}",
        "Handled:".bold(),
        status.events_handled,
        status.rules.executions,
        report.seed
    );
}
