use std::path::Path;

use sysinfo::{Disks, ProcessRefreshKind, ProcessesToUpdate, System, Uid, UpdateKind, Users};

use super::capability::Capability;
use super::history::MetricKind;
use super::process::ProcessRecord;
use super::snapshot::{ProcessSource, SamplingError};

/// Host-level scalar metrics, each reported as a percentage.
pub trait MetricSource: Send {
    /// Called once per metrics tick before the individual samples are read.
    fn refresh(&mut self) {}

    fn sample(&mut self, kind: MetricKind) -> f32;
}

pub struct SysinfoMetricSource {
    sys: System,
    disks: Disks,
    host: Capability,
    gpu: Capability,
}

impl SysinfoMetricSource {
    pub fn new(host: Capability, gpu: Capability) -> Self {
        let mut sys = System::new();
        if host.is_available() {
            sys.refresh_memory();
            sys.refresh_cpu_usage();
        }
        let disks = Disks::new_with_refreshed_list();
        SysinfoMetricSource {
            sys,
            disks,
            host,
            gpu,
        }
    }

    pub fn gpu_capability(&self) -> &Capability {
        &self.gpu
    }

    fn memory_percent(&self) -> f32 {
        let total = self.sys.total_memory();
        if total == 0 {
            return 0.0;
        }
        (self.sys.used_memory() as f64 / total as f64 * 100.0) as f32
    }

    /// Usage of the root filesystem, or of all disks combined when no disk is
    /// mounted at `/`.
    fn disk_percent(&self) -> f32 {
        let list = self.disks.list();
        let root = list.iter().find(|d| d.mount_point() == Path::new("/"));
        let (used, total) = match root {
            Some(disk) => (
                disk.total_space().saturating_sub(disk.available_space()) as u128,
                disk.total_space() as u128,
            ),
            None => list.iter().fold((0u128, 0u128), |(used, total), disk| {
                let space = disk.total_space() as u128;
                let available = disk.available_space() as u128;
                (used + space.saturating_sub(available), total + space)
            }),
        };
        if total == 0 {
            return 0.0;
        }
        (used as f64 / total as f64 * 100.0) as f32
    }
}

impl MetricSource for SysinfoMetricSource {
    fn refresh(&mut self) {
        let _span = tracing::trace_span!("collector.metrics_refresh").entered();
        if !self.host.is_available() {
            return;
        }
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.disks.refresh(true);
    }

    fn sample(&mut self, kind: MetricKind) -> f32 {
        // No GPU backend is wired in, so both GPU windows read a permanent 0
        // and the UI shows the capability note instead.
        if kind.is_gpu() || !self.host.is_available() {
            return 0.0;
        }
        match kind {
            MetricKind::Cpu => self.sys.global_cpu_usage(),
            MetricKind::Memory => self.memory_percent(),
            MetricKind::Disk => self.disk_percent(),
            MetricKind::Gpu | MetricKind::GpuMemory => 0.0,
        }
    }
}

pub struct SysinfoProcessSource {
    sys: System,
    users: Users,
    capability: Capability,
}

impl SysinfoProcessSource {
    pub fn new(capability: Capability) -> Self {
        let mut sys = System::new();
        if capability.is_available() {
            sys.refresh_memory();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::everything(),
            );
        }
        SysinfoProcessSource {
            sys,
            users: Users::new_with_refreshed_list(),
            capability,
        }
    }

    /// Reloads the account list when a process belongs to a uid it has not
    /// seen, so users created after startup resolve by name.
    fn refresh_users_on_miss(&mut self) {
        let users = &self.users;
        let missing = self
            .sys
            .processes()
            .values()
            .filter_map(|process| process.user_id())
            .any(|uid| users.get_user_by_id(uid).is_none());
        if missing {
            tracing::debug!("unknown uid seen, reloading user list");
            self.users.refresh();
        }
    }
}

fn owner_name(users: &Users, process: &sysinfo::Process) -> Option<String> {
    let uid = process.user_id()?;
    Some(match users.get_user_by_id(uid) {
        Some(user) => user.name().to_string(),
        None => uid_label(uid),
    })
}

/// Bare numeric uid (a SID string on Windows).
fn uid_label(uid: &Uid) -> String {
    (**uid).to_string()
}

impl ProcessSource for SysinfoProcessSource {
    fn capture(&mut self) -> Result<Vec<ProcessRecord>, SamplingError> {
        let _span = tracing::debug_span!("collector.capture").entered();

        if let Capability::Unavailable(reason) = &self.capability {
            return Err(SamplingError::Unavailable(reason.clone()));
        }

        self.sys.refresh_memory();
        // Exited processes are dropped by the refresh itself; processes we
        // cannot read simply come back with default fields.
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_cpu()
                .with_user(UpdateKind::OnlyIfNotSet),
        );

        self.refresh_users_on_miss();

        let total_memory = self.sys.total_memory();
        let users = &self.users;
        let records: Vec<ProcessRecord> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let memory_percent = if total_memory > 0 {
                    (process.memory() as f64 / total_memory as f64 * 100.0) as f32
                } else {
                    0.0
                };
                ProcessRecord {
                    pid: pid.as_u32(),
                    name: process.name().to_string_lossy().to_string(),
                    owner: owner_name(users, process),
                    cpu_percent: process.cpu_usage().max(0.0),
                    memory_percent: memory_percent.clamp(0.0, 100.0),
                    status: process.status().into(),
                }
            })
            .collect();

        if records.is_empty() {
            return Err(SamplingError::EmptyEnumeration);
        }
        tracing::trace!(count = records.len(), "captured process table");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_capability_is_a_systemic_error() {
        let mut source = SysinfoProcessSource::new(Capability::Unavailable("nope".into()));
        assert_eq!(
            source.capture(),
            Err(SamplingError::Unavailable("nope".into()))
        );
    }

    #[test]
    fn gpu_without_sensor_reads_zero() {
        let mut source = SysinfoMetricSource::new(
            Capability::Available,
            Capability::Unavailable("no sensor".into()),
        );
        source.refresh();
        assert_eq!(source.sample(MetricKind::Gpu), 0.0);
        assert_eq!(source.sample(MetricKind::GpuMemory), 0.0);
        assert_eq!(source.gpu_capability().note(), Some("no sensor"));
    }

    #[test]
    fn host_samples_are_non_negative() {
        let mut source =
            SysinfoMetricSource::new(Capability::Available, Capability::Unavailable("x".into()));
        source.refresh();
        for kind in MetricKind::ALL {
            assert!(source.sample(kind) >= 0.0, "{kind:?} went negative");
        }
    }

    #[cfg(unix)]
    #[test]
    fn unknown_uid_renders_as_bare_number() {
        let uid = Uid::try_from(4_000_123usize).expect("valid uid");
        assert_eq!(uid_label(&uid), "4000123");
    }

    #[cfg(unix)]
    #[test]
    fn owners_never_use_debug_formatting() {
        let mut source = SysinfoProcessSource::new(Capability::Available);
        let records = source.capture().expect("capture failed");
        for owner in records.iter().filter_map(|r| r.owner.as_deref()) {
            assert!(!owner.starts_with("Uid("), "debug-formatted owner {owner}");
        }
    }

    #[test]
    fn capture_contains_current_process() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let mut source = SysinfoProcessSource::new(Capability::Available);
        let records = source.capture().expect("capture failed");
        let me = std::process::id();
        assert!(records.iter().any(|r| r.pid == me));
        let mut pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        pids.sort_unstable();
        pids.dedup();
        assert_eq!(pids.len(), records.len());
    }
}
