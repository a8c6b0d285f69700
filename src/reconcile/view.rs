use super::algorithm::{EditScript, reconcile};
use super::order::{SortMode, ViewFilter, text_matches};
use super::row::RenderedRow;
use crate::system::process::ProcessRecord;

/// One rendered table: its rows, the last script that produced them, and a
/// pid-keyed selection. Views never share row state, even when they are fed
/// the same snapshot.
#[derive(Debug, Clone)]
pub struct ProcessView {
    title: &'static str,
    filter: ViewFilter,
    rows: Vec<RenderedRow>,
    last_script: EditScript,
    selected: Option<u32>,
}

impl ProcessView {
    pub fn new(title: &'static str, filter: ViewFilter) -> Self {
        ProcessView {
            title,
            filter,
            rows: Vec::new(),
            last_script: Vec::new(),
            selected: None,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn last_script(&self) -> &EditScript {
        &self.last_script
    }

    /// Reconciles against `snapshot` and returns the edit script. `needle` is
    /// a lowercased text filter, empty for none.
    pub fn reconcile(
        &mut self,
        snapshot: &[ProcessRecord],
        sort: SortMode,
        needle: &str,
    ) -> &EditScript {
        let previous_ordinal = self.selected_ordinal();
        let filter = self.filter;

        let result = reconcile(
            &self.rows,
            snapshot,
            |r| sort.key(r),
            |r| filter.matches(r) && text_matches(r, needle),
        );
        self.rows = result.rows;
        self.last_script = result.script;

        // A selected process that vanished hands the selection to whatever
        // now sits at its old position.
        if let Some(pid) = self.selected
            && !self.rows.iter().any(|r| r.pid == pid)
        {
            self.selected = previous_ordinal
                .and_then(|ord| self.rows.get(ord.min(self.rows.len().saturating_sub(1))))
                .map(|r| r.pid);
        }

        &self.last_script
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected
    }

    pub fn selected_ordinal(&self) -> Option<usize> {
        let pid = self.selected?;
        self.rows.iter().position(|r| r.pid == pid)
    }

    pub fn selected_row(&self) -> Option<&RenderedRow> {
        self.selected_ordinal().map(|ord| &self.rows[ord])
    }

    pub fn select_pid(&mut self, pid: u32) -> bool {
        if self.rows.iter().any(|r| r.pid == pid) {
            self.selected = Some(pid);
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) {
        let next = match self.selected_ordinal() {
            Some(ord) => (ord + 1).min(self.rows.len().saturating_sub(1)),
            None => 0,
        };
        self.selected = self.rows.get(next).map(|r| r.pid);
    }

    pub fn select_previous(&mut self) {
        let prev = match self.selected_ordinal() {
            Some(ord) => ord.saturating_sub(1),
            None => 0,
        };
        self.selected = self.rows.get(prev).map(|r| r.pid);
    }
}
