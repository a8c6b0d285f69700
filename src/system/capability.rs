//! Sensor availability, negotiated once at startup and handed to the sources
//! that depend on it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable(String),
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }

    /// Display note for an unavailable sensor.
    pub fn note(&self) -> Option<&str> {
        match self {
            Capability::Available => None,
            Capability::Unavailable(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub processes: Capability,
    pub host_metrics: Capability,
    pub gpu: Capability,
}

pub fn probe() -> Capabilities {
    let os = if sysinfo::IS_SUPPORTED_SYSTEM {
        Capability::Available
    } else {
        Capability::Unavailable(format!(
            "process enumeration is not supported on {}",
            std::env::consts::OS
        ))
    };

    let capabilities = Capabilities {
        processes: os.clone(),
        host_metrics: os,
        // No vendor GPU library is linked; GPU windows stay at 0.
        gpu: Capability::Unavailable("GPU monitoring requires a vendor sensor library".into()),
    };
    tracing::info!(?capabilities, "capabilities negotiated");
    capabilities
}
