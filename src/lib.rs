//! Live process and host-metric monitor.
//!
//! The engine samples host metrics into rolling windows, captures full
//! process snapshots and reconciles them into per-view edit scripts, and runs
//! terminate/pause requests off the sampling path. The terminal front end and
//! the headless JSON mode both sit on top of [`poller::Poller`].

pub mod action;
pub mod app;
pub mod config;
pub mod event;
pub mod format;
pub mod logging;
pub mod poller;
pub mod reconcile;
pub mod schedule;
pub mod system;
pub mod ui;
