// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod feedback;
pub mod goal;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod summary;
pub mod time_series;
pub mod timer;
pub mod ui;
pub mod util;

/// Scheduler period; every tick adds this much to the running timer
pub const TICK_RATE_MS: u64 = 100;
