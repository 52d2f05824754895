// src/lib.rs

//! Frame-rate, CPU and memory snapshots on top of an external performance reporter.
//!
//! A [`PerformanceTracker`] registers as the listener of a [`ReportSource`],
//! keeps the latest report plus a rolling window of frame rates, and turns them
//! into [`PerformanceSnapshot`]s that can be exported as a delimited text file.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod overlay;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use overlay::{DebugOverlay, OverlayMonitor};
pub use report::{MemoryUsage, PerformanceReport, ReportListener, ReportSource};
pub use snapshot::{FpsLayout, FrameRate, Metadata, PerformanceSnapshot};
pub use source::ManualSource;
pub use tracker::PerformanceTracker;
