use std::cmp::{Ordering, Reverse};

use crate::system::process::{ProcessRecord, ProcessStatus};

/// `f32` with a total order (`f32::total_cmp`), usable inside sort keys.
#[derive(Debug, Clone, Copy)]
pub struct OrdF32(pub f32);

impl PartialEq for OrdF32 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdF32 {}

impl PartialOrd for OrdF32 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF32 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sort key for a table. Every variant ends in the pid, so the order is total
/// and stable across ticks even when names or readings collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Name(String, u32),
    Cpu(Reverse<OrdF32>, u32),
    Memory(Reverse<OrdF32>, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Name,
    Cpu,
    Memory,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Name => SortMode::Cpu,
            SortMode::Cpu => SortMode::Memory,
            SortMode::Memory => SortMode::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Name => "A-Z",
            SortMode::Cpu => "CPU",
            SortMode::Memory => "Memory",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cpu" => SortMode::Cpu,
            "memory" | "mem" => SortMode::Memory,
            _ => SortMode::Name,
        }
    }

    pub fn key(self, record: &ProcessRecord) -> OrderKey {
        match self {
            SortMode::Name => OrderKey::Name(record.name.to_lowercase(), record.pid),
            SortMode::Cpu => OrderKey::Cpu(Reverse(OrdF32(record.cpu_percent)), record.pid),
            SortMode::Memory => {
                OrderKey::Memory(Reverse(OrdF32(record.memory_percent)), record.pid)
            }
        }
    }
}

/// Case-insensitive name order with pid as tie-breaker.
pub fn name_key(record: &ProcessRecord) -> (String, u32) {
    (record.name.to_lowercase(), record.pid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFilter {
    Running,
    All,
}

impl ViewFilter {
    pub fn matches(self, record: &ProcessRecord) -> bool {
        match self {
            ViewFilter::Running => record.status == ProcessStatus::Running,
            ViewFilter::All => true,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ViewFilter::Running => "running",
            ViewFilter::All => "all",
        }
    }
}

/// Case-insensitive substring match on name or owner. `needle` must already be
/// lowercased; an empty needle matches everything.
pub fn text_matches(record: &ProcessRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.name.to_lowercase().contains(needle)
        || record.owner_or_empty().to_lowercase().contains(needle)
}
