use std::collections::HashSet;

use serde::Serialize;

use super::row::RenderedRow;
use crate::system::process::ProcessRecord;

/// One row mutation. A script lists every `Delete` first (in previous display
/// order), then `Update`/`Move`/`Insert` in final ordinal order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Delete { pid: u32 },
    /// Refreshes the display fields of a row that persists; `row.ordinal` is
    /// its final position.
    Update { pid: u32, row: RenderedRow },
    /// Takes the row out of its current position and reinserts it at `to`.
    ///
    /// Only emitted when the row is out of place in the partially applied
    /// list. Ordinal shifts caused by earlier deletes, inserts and moves are
    /// implied and get an `Update` alone.
    Move { pid: u32, to: usize },
    Insert { ordinal: usize, row: RenderedRow },
}

impl EditOp {
    pub fn pid(&self) -> u32 {
        match self {
            EditOp::Delete { pid } | EditOp::Update { pid, .. } | EditOp::Move { pid, .. } => *pid,
            EditOp::Insert { row, .. } => row.pid,
        }
    }
}

pub type EditScript = Vec<EditOp>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptStats {
    pub deletes: usize,
    pub updates: usize,
    pub moves: usize,
    pub inserts: usize,
}

impl ScriptStats {
    pub fn of(script: &[EditOp]) -> Self {
        let mut stats = ScriptStats::default();
        for op in script {
            match op {
                EditOp::Delete { .. } => stats.deletes += 1,
                EditOp::Update { .. } => stats.updates += 1,
                EditOp::Move { .. } => stats.moves += 1,
                EditOp::Insert { .. } => stats.inserts += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<RenderedRow>,
    pub script: EditScript,
}

/// Diffs the rendered rows against a fresh snapshot.
///
/// `previous` must be in display order (index == ordinal). Records passing
/// `filter` are sorted by `order_key`, which should be a total order (end the
/// key with the pid). Rows whose pid survives are updated and, when needed,
/// moved rather than deleted and re-inserted, so anything the UI keys by pid
/// (selection, scroll anchor) survives the tick.
///
/// Snapshots must not contain duplicate pids.
pub fn reconcile<K, O, F>(
    previous: &[RenderedRow],
    next: &[ProcessRecord],
    order_key: O,
    filter: F,
) -> Reconciliation
where
    K: Ord,
    O: Fn(&ProcessRecord) -> K,
    F: Fn(&ProcessRecord) -> bool,
{
    debug_assert!(has_unique_pids(next), "snapshot contains duplicate pids");

    let mut target: Vec<(K, &ProcessRecord)> = next
        .iter()
        .filter(|record| filter(record))
        .map(|record| (order_key(record), record))
        .collect();
    target.sort_by(|a, b| a.0.cmp(&b.0));

    let target_pids: HashSet<u32> = target.iter().map(|(_, r)| r.pid).collect();
    let mut script = Vec::with_capacity(previous.len() + target.len());

    // Surviving rows in their current relative order, i.e. the row list as it
    // looks once the deletes are applied.
    let mut survivors = Vec::with_capacity(previous.len());
    for row in previous {
        if target_pids.contains(&row.pid) {
            survivors.push(row.pid);
        } else {
            script.push(EditOp::Delete { pid: row.pid });
        }
    }
    let surviving: HashSet<u32> = survivors.iter().copied().collect();

    // Positions below `ordinal` are final while walking; the unplaced
    // survivors keep their relative order after them. A survivor is already
    // at `ordinal` exactly when it is the first unplaced one.
    let mut placed: HashSet<u32> = HashSet::with_capacity(survivors.len());
    let mut cursor = 0;
    let mut rows = Vec::with_capacity(target.len());

    for (ordinal, (_, record)) in target.iter().enumerate() {
        let row = RenderedRow::from_record(record, ordinal);
        if surviving.contains(&record.pid) {
            while cursor < survivors.len() && placed.contains(&survivors[cursor]) {
                cursor += 1;
            }
            let in_place = survivors.get(cursor) == Some(&record.pid);
            if in_place {
                cursor += 1;
            }
            placed.insert(record.pid);

            script.push(EditOp::Update {
                pid: record.pid,
                row: row.clone(),
            });
            if !in_place {
                script.push(EditOp::Move {
                    pid: record.pid,
                    to: ordinal,
                });
            }
        } else {
            script.push(EditOp::Insert {
                ordinal,
                row: row.clone(),
            });
        }
        rows.push(row);
    }

    Reconciliation { rows, script }
}

/// Applies a script op by op, the way an incremental consumer would.
/// Applying `reconcile(previous, ..).script` to `previous` yields its `rows`.
pub fn apply(rows: &mut Vec<RenderedRow>, script: &[EditOp]) {
    fn position(rows: &[RenderedRow], pid: u32) -> Option<usize> {
        rows.iter().position(|r| r.pid == pid)
    }

    for op in script {
        match op {
            EditOp::Delete { pid } => {
                if let Some(pos) = position(rows, *pid) {
                    rows.remove(pos);
                }
            }
            EditOp::Update { pid, row } => {
                if let Some(pos) = position(rows, *pid) {
                    rows[pos] = row.clone();
                }
            }
            EditOp::Move { pid, to } => {
                if let Some(pos) = position(rows, *pid) {
                    let row = rows.remove(pos);
                    let to = (*to).min(rows.len());
                    rows.insert(to, row);
                }
            }
            EditOp::Insert { ordinal, row } => {
                let at = (*ordinal).min(rows.len());
                rows.insert(at, row.clone());
            }
        }
    }

    for (ordinal, row) in rows.iter_mut().enumerate() {
        row.set_ordinal(ordinal);
    }
}

pub fn has_unique_pids(records: &[ProcessRecord]) -> bool {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().all(|r| seen.insert(r.pid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::order::name_key;
    use crate::reconcile::row::{Parity, Severity};
    use crate::system::process::ProcessStatus;

    fn all(_: &ProcessRecord) -> bool {
        true
    }

    fn rows_for(records: &[ProcessRecord]) -> Vec<RenderedRow> {
        reconcile(&[], records, name_key, all).rows
    }

    #[test]
    fn first_tick_inserts_everything_in_order() {
        let next = vec![ProcessRecord::new(2, "zsh"), ProcessRecord::new(1, "Alpha")];
        let result = reconcile(&[], &next, name_key, all);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].pid, 1);
        assert!(matches!(result.script[0], EditOp::Insert { ordinal: 0, .. }));
        assert!(matches!(result.script[1], EditOp::Insert { ordinal: 1, .. }));
    }

    #[test]
    fn delete_update_insert_scenario() {
        let previous = rows_for(&[ProcessRecord::new(1, "bob"), ProcessRecord::new(2, "amy")]);
        assert_eq!(previous[0].name, "amy");

        let next = vec![ProcessRecord::new(2, "amy"), ProcessRecord::new(3, "cam")];
        let result = reconcile(&previous, &next, name_key, all);

        assert_eq!(result.script.len(), 3);
        assert_eq!(result.script[0], EditOp::Delete { pid: 1 });
        assert!(matches!(&result.script[1], EditOp::Update { pid: 2, row } if row.ordinal == 0));
        assert!(matches!(&result.script[2], EditOp::Insert { ordinal: 1, row } if row.pid == 3));

        let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["amy", "cam"]);
    }

    #[test]
    fn rename_moves_row_without_recreating_it() {
        let previous = rows_for(&[
            ProcessRecord::new(1, "a"),
            ProcessRecord::new(2, "b"),
            ProcessRecord::new(3, "c"),
        ]);
        let next = vec![
            ProcessRecord::new(1, "z"),
            ProcessRecord::new(2, "b"),
            ProcessRecord::new(3, "c"),
        ];
        let result = reconcile(&previous, &next, name_key, all);

        assert!(!result.script.iter().any(|op| matches!(op, EditOp::Delete { .. } | EditOp::Insert { .. })));
        // Rows are pulled forward into place; pid 1 ends up last untouched.
        assert!(result.script.contains(&EditOp::Move { pid: 2, to: 0 }));
        assert!(result.script.contains(&EditOp::Move { pid: 3, to: 1 }));
        assert!(!result.script.iter().any(|op| matches!(op, EditOp::Move { pid: 1, .. })));
        let pids: Vec<u32> = result.rows.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![2, 3, 1]);

        let mut applied = previous.clone();
        apply(&mut applied, &result.script);
        assert_eq!(applied, result.rows);
    }

    #[test]
    fn parity_is_recomputed_after_delete() {
        let previous = rows_for(&[
            ProcessRecord::new(1, "a"),
            ProcessRecord::new(2, "b"),
            ProcessRecord::new(3, "c"),
        ]);
        let next = vec![ProcessRecord::new(2, "b"), ProcessRecord::new(3, "c")];
        let result = reconcile(&previous, &next, name_key, all);
        assert_eq!(result.rows[0].parity, Parity::Even);
        assert_eq!(result.rows[1].parity, Parity::Odd);
        // Surviving rows slide up without explicit moves.
        assert!(!result.script.iter().any(|op| matches!(op, EditOp::Move { .. })));
    }

    #[test]
    fn insert_ahead_shifts_rows_without_moves() {
        let previous = rows_for(&[ProcessRecord::new(2, "b"), ProcessRecord::new(3, "c")]);
        let next = vec![
            ProcessRecord::new(1, "a"),
            ProcessRecord::new(2, "b"),
            ProcessRecord::new(3, "c"),
        ];
        let result = reconcile(&previous, &next, name_key, all);

        assert!(matches!(&result.script[0], EditOp::Insert { ordinal: 0, row } if row.pid == 1));
        assert!(matches!(&result.script[1], EditOp::Update { pid: 2, row } if row.ordinal == 1));
        assert!(matches!(&result.script[2], EditOp::Update { pid: 3, row } if row.ordinal == 2));
        assert_eq!(result.script.len(), 3);

        let mut applied = previous.clone();
        apply(&mut applied, &result.script);
        assert_eq!(applied, result.rows);
    }

    #[test]
    fn update_refreshes_severity() {
        let previous = rows_for(&[ProcessRecord::new(1, "a").with_cpu(5.0)]);
        let next = vec![ProcessRecord::new(1, "a").with_cpu(75.0)];
        let result = reconcile(&previous, &next, name_key, all);
        assert_eq!(result.rows[0].severity, Severity::High);
        assert!(matches!(&result.script[0], EditOp::Update { row, .. } if row.severity == Severity::High));
    }

    #[test]
    fn filter_drops_rows_that_stop_matching() {
        let running = |r: &ProcessRecord| r.status == ProcessStatus::Running;
        let first = vec![
            ProcessRecord::new(1, "a").with_status(ProcessStatus::Running),
            ProcessRecord::new(2, "b").with_status(ProcessStatus::Running),
        ];
        let previous = reconcile(&[], &first, name_key, running).rows;
        let second = vec![
            ProcessRecord::new(1, "a").with_status(ProcessStatus::Sleeping),
            ProcessRecord::new(2, "b").with_status(ProcessStatus::Running),
        ];
        let result = reconcile(&previous, &second, name_key, running);
        assert_eq!(result.script[0], EditOp::Delete { pid: 1 });
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].ordinal, 0);
    }

    #[test]
    fn apply_reproduces_rows() {
        let previous = rows_for(&[
            ProcessRecord::new(1, "d"),
            ProcessRecord::new(2, "c"),
            ProcessRecord::new(3, "b"),
            ProcessRecord::new(4, "a"),
        ]);
        let next = vec![
            ProcessRecord::new(4, "e"),
            ProcessRecord::new(2, "c"),
            ProcessRecord::new(5, "a"),
            ProcessRecord::new(1, "b"),
        ];
        let result = reconcile(&previous, &next, name_key, all);
        let mut applied = previous.clone();
        apply(&mut applied, &result.script);
        assert_eq!(applied, result.rows);
    }

    #[test]
    fn empty_snapshot_deletes_everything() {
        let previous = rows_for(&[ProcessRecord::new(1, "a"), ProcessRecord::new(2, "b")]);
        let result = reconcile(&previous, &[], name_key, all);
        assert!(result.rows.is_empty());
        assert_eq!(
            result.script,
            vec![EditOp::Delete { pid: 1 }, EditOp::Delete { pid: 2 }]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "duplicate pids")]
    fn duplicate_pids_are_rejected() {
        let next = vec![ProcessRecord::new(1, "a"), ProcessRecord::new(1, "b")];
        let _ = reconcile(&[], &next, name_key, all);
    }

    #[test]
    fn stats_count_ops() {
        let previous = rows_for(&[ProcessRecord::new(1, "bob"), ProcessRecord::new(2, "amy")]);
        let next = vec![ProcessRecord::new(2, "amy"), ProcessRecord::new(3, "cam")];
        let stats = ScriptStats::of(&reconcile(&previous, &next, name_key, all).script);
        assert_eq!(
            stats,
            ScriptStats {
                deletes: 1,
                updates: 1,
                moves: 0,
                inserts: 1
            }
        );
    }
}
