use serde::Serialize;

use crate::system::process::{ProcessRecord, ProcessStatus};

pub const HIGH_CPU_THRESHOLD: f32 = 50.0;
pub const MEDIUM_CPU_THRESHOLD: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// `> 50` is high, `> 20` is medium, everything else (including NaN) low.
    pub fn from_cpu(cpu_percent: f32) -> Self {
        if cpu_percent > HIGH_CPU_THRESHOLD {
            Severity::High
        } else if cpu_percent > MEDIUM_CPU_THRESHOLD {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(ordinal: usize) -> Self {
        if ordinal.is_multiple_of(2) {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub pid: u32,
    pub ordinal: usize,
    pub name: String,
    pub owner: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub status: ProcessStatus,
    pub parity: Parity,
    pub severity: Severity,
}

impl RenderedRow {
    pub fn from_record(record: &ProcessRecord, ordinal: usize) -> Self {
        RenderedRow {
            pid: record.pid,
            ordinal,
            name: record.name.clone(),
            owner: record.owner_or_empty().to_string(),
            cpu_percent: record.cpu_percent,
            memory_percent: record.memory_percent,
            status: record.status,
            parity: Parity::of(ordinal),
            severity: Severity::from_cpu(record.cpu_percent),
        }
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: usize) {
        self.ordinal = ordinal;
        self.parity = Parity::of(ordinal);
    }
}
