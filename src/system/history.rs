use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

pub const DEFAULT_CAPACITY: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Gpu,
    GpuMemory,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Cpu,
        MetricKind::Memory,
        MetricKind::Disk,
        MetricKind::Gpu,
        MetricKind::GpuMemory,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Cpu => "CPU",
            MetricKind::Memory => "Memory",
            MetricKind::Disk => "Disk",
            MetricKind::Gpu => "GPU",
            MetricKind::GpuMemory => "GPU Mem",
        }
    }

    pub fn is_gpu(self) -> bool {
        matches!(self, MetricKind::Gpu | MetricKind::GpuMemory)
    }

    fn index(self) -> usize {
        match self {
            MetricKind::Cpu => 0,
            MetricKind::Memory => 1,
            MetricKind::Disk => 2,
            MetricKind::Gpu => 3,
            MetricKind::GpuMemory => 4,
        }
    }
}

/// Fixed-capacity FIFO of recent samples, oldest first.
#[derive(Debug, Clone)]
pub struct MetricWindow {
    kind: MetricKind,
    samples: VecDeque<f32>,
    capacity: usize,
}

impl MetricWindow {
    pub fn new(kind: MetricKind, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            kind,
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(clamp_sample(value));
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }
}

/// Negative and NaN readings become 0. No upper bound: per-core CPU can exceed 100.
fn clamp_sample(value: f32) -> f32 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Immutable copy of one window, taken for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub kind: MetricKind,
    pub samples: Vec<f32>,
}

impl WindowSnapshot {
    pub fn latest(&self) -> Option<f32> {
        self.samples.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub windows: Vec<WindowSnapshot>,
}

impl MetricsSnapshot {
    pub fn get(&self, kind: MetricKind) -> Option<&WindowSnapshot> {
        self.windows.iter().find(|w| w.kind == kind)
    }
}

/// One rolling window per metric, each behind its own lock so readers copying
/// one window never hold up appends to another.
#[derive(Debug)]
pub struct MetricSampler {
    windows: [Mutex<MetricWindow>; 5],
    capacity: usize,
}

impl MetricSampler {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            windows: MetricKind::ALL.map(|kind| Mutex::new(MetricWindow::new(kind, capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&self, kind: MetricKind, value: f32) {
        self.windows[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    pub fn latest(&self, kind: MetricKind) -> Option<f32> {
        self.windows[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest()
    }

    pub fn window(&self, kind: MetricKind) -> WindowSnapshot {
        let samples = self.windows[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec();
        WindowSnapshot { kind, samples }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            windows: MetricKind::ALL.iter().map(|&k| self.window(k)).collect(),
        }
    }
}

impl Default for MetricSampler {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_three_keeps_newest() {
        let sampler = MetricSampler::new(3);
        for v in [10.0, 20.0, 30.0, 40.0] {
            sampler.append(MetricKind::Cpu, v);
        }
        assert_eq!(sampler.window(MetricKind::Cpu).samples, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn capacity_plus_one_evicts_oldest() {
        let mut window = MetricWindow::new(MetricKind::Memory, 60);
        for i in 0..=60 {
            window.push(i as f32);
        }
        assert_eq!(window.len(), 60);
        let samples = window.to_vec();
        assert!(!samples.contains(&0.0));
        assert_eq!(samples.last(), Some(&60.0));
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        let sampler = MetricSampler::new(4);
        sampler.append(MetricKind::Disk, -5.0);
        sampler.append(MetricKind::Disk, f32::NAN);
        sampler.append(MetricKind::Disk, 250.0);
        assert_eq!(sampler.window(MetricKind::Disk).samples, vec![0.0, 0.0, 250.0]);
    }

    #[test]
    fn windows_are_independent() {
        let sampler = MetricSampler::new(2);
        sampler.append(MetricKind::Cpu, 1.0);
        sampler.append(MetricKind::Gpu, 2.0);
        let snapshot = sampler.snapshot();
        assert_eq!(snapshot.get(MetricKind::Cpu).unwrap().samples, vec![1.0]);
        assert_eq!(snapshot.get(MetricKind::Gpu).unwrap().samples, vec![2.0]);
        assert!(snapshot.get(MetricKind::Memory).unwrap().samples.is_empty());
        assert_eq!(snapshot.windows.len(), 5);
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let sampler = MetricSampler::new(5);
        sampler.append(MetricKind::Cpu, 1.0);
        let before = sampler.snapshot();
        sampler.append(MetricKind::Cpu, 2.0);
        assert_eq!(before.get(MetricKind::Cpu).unwrap().samples, vec![1.0]);
        assert_eq!(sampler.latest(MetricKind::Cpu), Some(2.0));
    }

    #[test]
    fn concurrent_appends_and_snapshots() {
        let sampler = std::sync::Arc::new(MetricSampler::new(60));
        let writer = {
            let sampler = sampler.clone();
            std::thread::spawn(move || {
                for i in 0..1000 {
                    sampler.append(MetricKind::Cpu, i as f32);
                }
            })
        };
        for _ in 0..100 {
            assert!(sampler.snapshot().get(MetricKind::Cpu).unwrap().samples.len() <= 60);
        }
        writer.join().unwrap();
        assert_eq!(sampler.latest(MetricKind::Cpu), Some(999.0));
    }
}
