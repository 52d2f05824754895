// src/report.rs

use serde::{Deserialize, Serialize};
use std::sync::Weak;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Memory figures as delivered by the source, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
}

impl MemoryUsage {
    pub fn new(used: u64, total: u64) -> Self {
        MemoryUsage { used, total }
    }

    pub fn used_mb(&self) -> u64 {
        self.used / BYTES_PER_MB
    }

    pub fn total_mb(&self) -> u64 {
        self.total / BYTES_PER_MB
    }
}

/// One periodic delivery from the sampling source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub fps: i64,
    /// Percentage in 0-100.
    pub cpu_usage: f64,
    pub memory: MemoryUsage,
}

impl PerformanceReport {
    pub fn new(fps: i64, cpu_usage: f64, memory: MemoryUsage) -> Self {
        PerformanceReport {
            fps,
            cpu_usage,
            memory,
        }
    }
}

/// Receives reports pushed by a [`ReportSource`].
pub trait ReportListener: Send + Sync {
    fn on_report(&self, report: PerformanceReport);
}

/// Controls of the underlying frame-rate/CPU/memory reporter.
///
/// The reporter decides its own schedule and pushes reports to the registered
/// listener. Failures inside the reporter are not surfaced.
pub trait ReportSource: Send {
    /// Register the listener that receives every report. Replaces any previous one.
    fn set_listener(&mut self, listener: Weak<dyn ReportListener>);

    /// Begin or resume reporting.
    fn start(&mut self);

    fn pause(&mut self);

    /// Hide the reporter's on-screen display.
    fn hide(&mut self);

    fn show(&mut self);
}
