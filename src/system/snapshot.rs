use thiserror::Error;

use super::process::ProcessRecord;

/// Failure of the enumeration facility as a whole. Individual processes that
/// vanish or deny access are never reported this way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("process enumeration unavailable: {0}")]
    Unavailable(String),
    #[error("process enumeration returned no processes")]
    EmptyEnumeration,
}

/// Produces complete process table snapshots on demand. Implementations keep
/// no incremental state that callers can observe; order is unspecified.
pub trait ProcessSource: Send {
    fn capture(&mut self) -> Result<Vec<ProcessRecord>, SamplingError>;
}

impl<F> ProcessSource for F
where
    F: FnMut() -> Result<Vec<ProcessRecord>, SamplingError> + Send,
{
    fn capture(&mut self) -> Result<Vec<ProcessRecord>, SamplingError> {
        self()
    }
}
