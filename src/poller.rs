use std::sync::Arc;

use crate::reconcile::{ProcessView, ScriptStats, SortMode, ViewFilter};
use crate::system::collector::MetricSource;
use crate::system::history::{MetricKind, MetricSampler};
use crate::system::lifecycle::{CommandOutcome, CompletionReceiver};
use crate::system::process::ProcessRecord;
use crate::system::snapshot::{ProcessSource, SamplingError};

pub const RUNNING_VIEW: usize = 0;
pub const ALL_VIEW: usize = 1;

/// The two tables the front end shows: running processes only, and everything.
pub fn default_views() -> Vec<ProcessView> {
    vec![
        ProcessView::new("Running Processes", ViewFilter::Running),
        ProcessView::new("All Processes", ViewFilter::All),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewUpdate {
    pub view: usize,
    pub stats: ScriptStats,
}

/// Result of one table cycle. Command outcomes are drained first, so a
/// terminate that just finished is reported alongside the capture that
/// (eventually) reflects it.
#[derive(Debug)]
pub struct TableCycle {
    pub outcomes: Vec<CommandOutcome>,
    pub result: Result<Vec<ViewUpdate>, SamplingError>,
}

/// Drives metric sampling and process capture, and feeds every registered view
/// through the reconciler. Each method runs one cycle to completion; the
/// caller owns the cadence (see `schedule::RepeatingTask`).
pub struct Poller {
    metric_source: Box<dyn MetricSource>,
    process_source: Box<dyn ProcessSource>,
    sampler: Arc<MetricSampler>,
    views: Vec<ProcessView>,
    sort: SortMode,
    needle: String,
    last_snapshot: Vec<ProcessRecord>,
    last_error: Option<SamplingError>,
    completions: Option<CompletionReceiver>,
}

impl Poller {
    pub fn new(
        metric_source: Box<dyn MetricSource>,
        process_source: Box<dyn ProcessSource>,
        sampler: Arc<MetricSampler>,
        views: Vec<ProcessView>,
    ) -> Self {
        Poller {
            metric_source,
            process_source,
            sampler,
            views,
            sort: SortMode::default(),
            needle: String::new(),
            last_snapshot: Vec::new(),
            last_error: None,
            completions: None,
        }
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn attach_completions(&mut self, completions: CompletionReceiver) {
        self.completions = Some(completions);
    }

    pub fn sampler(&self) -> &Arc<MetricSampler> {
        &self.sampler
    }

    pub fn views(&self) -> &[ProcessView] {
        &self.views
    }

    pub fn view(&self, index: usize) -> Option<&ProcessView> {
        self.views.get(index)
    }

    pub fn view_mut(&mut self, index: usize) -> Option<&mut ProcessView> {
        self.views.get_mut(index)
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn filter_text(&self) -> &str {
        &self.needle
    }

    pub fn last_error(&self) -> Option<&SamplingError> {
        self.last_error.as_ref()
    }

    pub fn process_count(&self) -> usize {
        self.last_snapshot.len()
    }

    pub fn metrics_cycle(&mut self) {
        let _span = tracing::trace_span!("poller.metrics_cycle").entered();
        self.metric_source.refresh();
        for kind in MetricKind::ALL {
            let value = self.metric_source.sample(kind);
            self.sampler.append(kind, value);
        }
    }

    pub fn table_cycle(&mut self) -> TableCycle {
        let _span = tracing::debug_span!("poller.table_cycle").entered();
        let outcomes = self.drain_completions();

        let result = match self.process_source.capture() {
            Ok(snapshot) => {
                if self.last_error.take().is_some() {
                    tracing::info!("process enumeration recovered");
                }
                self.last_snapshot = snapshot;
                Ok(self.reconcile_views())
            }
            Err(err) => {
                // Keep the last-known rows so a transient failure does not
                // blank the tables.
                if self.last_error.as_ref() != Some(&err) {
                    tracing::warn!(error = %err, "process enumeration failed");
                }
                self.last_error = Some(err.clone());
                Err(err)
            }
        };

        TableCycle { outcomes, result }
    }

    /// Re-sorts the views against the last captured snapshot without a new
    /// capture.
    pub fn set_sort(&mut self, sort: SortMode) -> Vec<ViewUpdate> {
        self.sort = sort;
        self.reconcile_views()
    }

    pub fn set_filter_text(&mut self, text: &str) -> Vec<ViewUpdate> {
        self.needle = text.to_lowercase();
        self.reconcile_views()
    }

    fn reconcile_views(&mut self) -> Vec<ViewUpdate> {
        let sort = self.sort;
        let snapshot = &self.last_snapshot;
        let needle = self.needle.as_str();
        self.views
            .iter_mut()
            .enumerate()
            .map(|(index, view)| {
                let stats = ScriptStats::of(view.reconcile(snapshot, sort, needle));
                tracing::debug!(
                    view = view.title(),
                    rows = view.rows().len(),
                    deletes = stats.deletes,
                    updates = stats.updates,
                    moves = stats.moves,
                    inserts = stats.inserts,
                    "view reconciled"
                );
                ViewUpdate { view: index, stats }
            })
            .collect()
    }

    fn drain_completions(&mut self) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::new();
        if let Some(rx) = self.completions.as_mut() {
            while let Ok(outcome) = rx.try_recv() {
                tracing::info!(
                    target: "audit",
                    operator = %outcome.operator,
                    role = outcome.role.label(),
                    action = %outcome.command,
                    pid = outcome.pid,
                    success = outcome.ok,
                    details = %outcome.error,
                    "lifecycle command completed"
                );
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}
