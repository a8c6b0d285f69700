use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::KeyEventKind;
use serde::Serialize;
use tokio::sync::mpsc;

use procwatch::app::App;
use procwatch::config::{self, Config, OperatorRole};
use procwatch::event::{Event, EventHandler, Ticker};
use procwatch::logging::{self, LogSink};
use procwatch::poller::{Poller, default_views};
use procwatch::reconcile::{EditOp, SortMode};
use procwatch::system::capability;
use procwatch::system::collector::{SysinfoMetricSource, SysinfoProcessSource};
use procwatch::system::history::{MetricKind, MetricSampler};
use procwatch::system::lifecycle::{
    CommandOutcome, LifecycleCommand, LifecycleCommandRunner, Requester, authorize,
};
use procwatch::system::signal::SysinfoSignalSink;
use procwatch::ui;

#[derive(Parser)]
#[command(
    name = "procwatch",
    about = "Live process table and host metrics monitor"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metric chart cadence in milliseconds
    #[arg(long)]
    metrics_interval: Option<u64>,

    /// Process table cadence in milliseconds
    #[arg(long)]
    table_interval: Option<u64>,

    /// Operator role: viewer or admin
    #[arg(long)]
    role: Option<String>,

    /// Color support: auto, 256, truecolor, mono
    #[arg(long)]
    color: Option<String>,

    /// Write logs (including audit events) to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Run without a terminal and print edit scripts as JSON lines.
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Number of table cycles to run in headless mode.
    #[arg(long, default_value_t = 5)]
    ticks: usize,

    /// Headless only: terminate this PID before the first cycle.
    #[arg(long, value_name = "PID", requires = "headless")]
    terminate: Option<u32>,

    /// Headless only: pause this PID before the first cycle.
    #[arg(long, value_name = "PID", requires = "headless")]
    pause: Option<u32>,
}

impl Cli {
    fn lifecycle_requests(&self) -> Vec<(LifecycleCommand, u32)> {
        let terminate = self.terminate.map(|pid| (LifecycleCommand::Terminate, pid));
        let pause = self.pause.map(|pid| (LifecycleCommand::Pause, pid));
        terminate.into_iter().chain(pause).collect()
    }
}

struct Intervals {
    metrics: Duration,
    table: Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    let intervals = validate_intervals(&config)?;

    let sink = match (&config.logging.file, cli.headless) {
        (Some(path), _) => LogSink::File(path.clone()),
        (None, true) => LogSink::Stderr,
        (None, false) => LogSink::Off,
    };
    logging::init(&sink, &config.logging.level, config.logging.json)
        .wrap_err("failed to initialise logging")?;

    let capabilities = capability::probe();
    let gpu_note = capabilities.gpu.note().map(str::to_string);

    let sampler = Arc::new(MetricSampler::new(config.general.history_length));
    let mut poller = Poller::new(
        Box::new(SysinfoMetricSource::new(
            capabilities.host_metrics.clone(),
            capabilities.gpu.clone(),
        )),
        Box::new(SysinfoProcessSource::new(capabilities.processes.clone())),
        sampler,
        default_views(),
    )
    .with_sort(SortMode::from_str_config(&config.general.default_sort));

    let (runner, completions) = LifecycleCommandRunner::new(Arc::new(SysinfoSignalSink));
    let runner = runner.with_requester(Requester::new(
        config.operator.resolved_name(),
        config.operator.role,
    ));
    poller.attach_completions(completions);

    tracing::info!(
        role = config.operator.role.label(),
        metrics_ms = intervals.metrics.as_millis() as u64,
        table_ms = intervals.table.as_millis() as u64,
        headless = cli.headless,
        "procwatch starting"
    );

    if cli.headless {
        let requests = cli.lifecycle_requests();
        return run_headless(poller, &runner, &requests, &intervals, cli.ticks).await;
    }

    let app = App::new(&config, poller, runner, gpu_note);

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, app, &intervals).await;

    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    mut app: App,
    intervals: &Intervals,
) -> Result<()> {
    let mut events = EventHandler::new(intervals.metrics, intervals.table);

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = app.map_key(key);
                app.dispatch(action);
                true
            }
            Event::Key(_) => false,
            Event::MetricsTick => {
                app.on_metrics_tick();
                true
            }
            Event::TableTick => {
                app.on_table_tick();
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    tracing::info!("procwatch exiting");
    Ok(())
}

#[derive(Serialize)]
struct CycleLine<'a> {
    cycle: usize,
    view: &'static str,
    ops: &'a [EditOp],
}

#[derive(Serialize)]
struct ErrorLine {
    cycle: usize,
    error: String,
}

#[derive(Serialize)]
struct OutcomeLine<'a> {
    cycle: usize,
    outcome: &'a CommandOutcome,
}

#[derive(Serialize)]
struct SummaryLine {
    cycles: usize,
    processes: usize,
    latest: Vec<(MetricKind, f32)>,
}

async fn run_headless(
    mut poller: Poller,
    runner: &LifecycleCommandRunner,
    requests: &[(LifecycleCommand, u32)],
    intervals: &Intervals,
    ticks: usize,
) -> Result<()> {
    // Outcomes are reported by the first table cycle that sees them.
    for &(command, pid) in requests {
        match authorize(runner.requester(), command, pid) {
            Ok(()) => runner.submit(command, pid),
            Err(denied) => emit(&ErrorLine {
                cycle: 0,
                error: denied,
            })?,
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let ticker = Ticker::spawn(tx, intervals.metrics, intervals.table);

    let mut cycle = 0;
    while cycle < ticks {
        let Some(event) = rx.recv().await else {
            break;
        };
        match event {
            Event::MetricsTick => poller.metrics_cycle(),
            Event::TableTick => {
                cycle += 1;
                let table = poller.table_cycle();
                for outcome in &table.outcomes {
                    emit(&OutcomeLine { cycle, outcome })?;
                }
                match table.result {
                    Ok(updates) => {
                        for update in updates {
                            if let Some(view) = poller.view(update.view) {
                                emit(&CycleLine {
                                    cycle,
                                    view: view.filter().slug(),
                                    ops: view.last_script(),
                                })?;
                            }
                        }
                    }
                    Err(err) => emit(&ErrorLine {
                        cycle,
                        error: err.to_string(),
                    })?,
                }
            }
            Event::Key(_) | Event::Resize => {}
        }
    }
    drop(ticker);

    let sampler = poller.sampler();
    emit(&SummaryLine {
        cycles: cycle,
        processes: poller.process_count(),
        latest: MetricKind::ALL
            .iter()
            .map(|&kind| (kind, sampler.latest(kind).unwrap_or(0.0)))
            .collect(),
    })
}

fn emit<T: Serialize>(line: &T) -> Result<()> {
    let json = serde_json::to_string(line).wrap_err("failed to encode headless output")?;
    println!("{json}");
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    if let Some(ms) = cli.metrics_interval {
        config.general.metrics_interval_ms = ms;
    }
    if let Some(ms) = cli.table_interval {
        config.general.table_interval_ms = ms;
    }
    if let Some(ref role) = cli.role {
        config.operator.role = OperatorRole::from_str_config(role);
    }
    if let Some(ref support) = cli.color {
        config.general.color_support = support.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = Some(path.clone());
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    config
}

fn validate_intervals(config: &Config) -> Result<Intervals> {
    if config.general.metrics_interval_ms == 0 {
        return Err(eyre!("metrics interval must be greater than 0"));
    }
    if config.general.table_interval_ms == 0 {
        return Err(eyre!("table interval must be greater than 0"));
    }
    Ok(Intervals {
        metrics: Duration::from_millis(config.general.metrics_interval_ms),
        table: Duration::from_millis(config.general.table_interval_ms),
    })
}
