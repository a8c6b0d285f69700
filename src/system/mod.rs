pub mod capability;
pub mod collector;
pub mod history;
pub mod lifecycle;
pub mod process;
pub mod signal;
pub mod snapshot;
