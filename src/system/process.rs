use serde::Serialize;

/// Coarse scheduler state of a process as shown in the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Stopped,
    Zombie,
    #[default]
    Other,
}

impl ProcessStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Other => "other",
        }
    }
}

impl From<sysinfo::ProcessStatus> for ProcessStatus {
    fn from(status: sysinfo::ProcessStatus) -> Self {
        match status {
            sysinfo::ProcessStatus::Run => ProcessStatus::Running,
            sysinfo::ProcessStatus::Sleep => ProcessStatus::Sleeping,
            sysinfo::ProcessStatus::Stop => ProcessStatus::Stopped,
            sysinfo::ProcessStatus::Zombie => ProcessStatus::Zombie,
            _ => ProcessStatus::Other,
        }
    }
}

/// One entry of a process table snapshot. `pid` is unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Empty when the name could not be read.
    pub name: String,
    pub owner: Option<String>,
    /// Percent of a single core; exceeds 100 on multi-core hosts.
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub status: ProcessStatus,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        ProcessRecord {
            pid,
            name: name.into(),
            owner: None,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            status: ProcessStatus::Other,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_cpu(mut self, cpu_percent: f32) -> Self {
        self.cpu_percent = cpu_percent;
        self
    }

    pub fn with_memory(mut self, memory_percent: f32) -> Self {
        self.memory_percent = memory_percent;
        self
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    pub fn owner_or_empty(&self) -> &str {
        self.owner.as_deref().unwrap_or("")
    }
}
