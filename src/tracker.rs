// src/tracker.rs

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Weak};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::export;
use crate::report::{PerformanceReport, ReportListener, ReportSource};
use crate::snapshot::{FrameRate, Metadata, PerformanceSnapshot};

struct TrackerState {
    monitoring: bool,
    monitoring_since: Option<DateTime<Local>>,
    last_report: Option<PerformanceReport>,
    /// Frame rates reported while monitoring, since the last snapshot.
    samples: VecDeque<i64>,
    snapshots: Vec<PerformanceSnapshot>,
}

/// Listens to a [`ReportSource`] and turns its reports into stored snapshots.
///
/// Shared state sits behind a mutex, so reports may arrive on any thread while
/// the host takes snapshots from another.
pub struct PerformanceTracker {
    source: Mutex<Box<dyn ReportSource>>,
    state: Mutex<TrackerState>,
    config: TrackerConfig,
}

impl PerformanceTracker {
    /// Take ownership of `source` and register the tracker as its listener.
    pub fn attach<S: ReportSource + 'static>(mut source: S, config: TrackerConfig) -> Arc<Self> {
        if config.monitor.hide_overlay {
            source.hide();
        }

        Arc::new_cyclic(|weak: &Weak<PerformanceTracker>| {
            let listener: Weak<dyn ReportListener> = weak.clone();
            source.set_listener(listener);

            PerformanceTracker {
                source: Mutex::new(Box::new(source)),
                state: Mutex::new(TrackerState {
                    monitoring: false,
                    monitoring_since: None,
                    last_report: None,
                    samples: VecDeque::new(),
                    snapshots: Vec::new(),
                }),
                config,
            }
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Resume the source and open a fresh sampling window. No-op while monitoring.
    pub fn start_monitoring(&self) {
        {
            let mut state = self.state.lock();
            if state.monitoring {
                return;
            }
            state.monitoring = true;
            state.samples.clear();
            state.monitoring_since = Some(Local::now());
        }

        self.source.lock().start();
        log::info!("Performance monitoring started");
    }

    /// Pause the source. No-op while stopped.
    pub fn stop_monitoring(&self) {
        {
            let mut state = self.state.lock();
            if !state.monitoring {
                return;
            }
            state.monitoring = false;
            state.monitoring_since = None;
        }

        self.source.lock().pause();
        log::info!("Performance monitoring stopped");
    }

    pub fn is_monitoring(&self) -> bool {
        self.state.lock().monitoring
    }

    /// When the current monitoring session began.
    pub fn monitoring_since(&self) -> Option<DateTime<Local>> {
        self.state.lock().monitoring_since
    }

    pub fn last_report(&self) -> Option<PerformanceReport> {
        self.state.lock().last_report
    }

    pub fn buffered_samples(&self) -> Vec<i64> {
        self.state.lock().samples.iter().copied().collect()
    }

    /// Capture a snapshot, logging and returning `None` if no report has arrived yet.
    pub fn take_snapshot(&self, metadata: Metadata) -> Option<PerformanceSnapshot> {
        match self.try_take_snapshot(metadata) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Snapshot skipped: {}", e);
                None
            }
        }
    }

    /// Capture a snapshot from the last report and the buffered frame rates,
    /// store it, and reset the sampling window.
    pub fn try_take_snapshot(&self, metadata: Metadata) -> Result<PerformanceSnapshot> {
        let mut state = self.state.lock();
        let report = state.last_report.ok_or(TrackerError::NoReport)?;

        let samples: Vec<i64> = state.samples.drain(..).collect();
        let snapshot = PerformanceSnapshot::new(
            FrameRate::from_window(report.fps, &samples),
            report.cpu_usage,
            report.memory.used_mb(),
            report.memory.total_mb(),
            metadata,
        );

        state.snapshots.push(snapshot.clone());
        log::debug!(
            "Snapshot #{} captured: {}",
            state.snapshots.len(),
            snapshot.to_line(&self.config.export.line_time_format)
        );
        Ok(snapshot)
    }

    /// Stored snapshots rendered as single lines with `export.line_time_format`.
    pub fn snapshot_lines(&self) -> Vec<String> {
        let line_format = &self.config.export.line_time_format;
        self.state
            .lock()
            .snapshots
            .iter()
            .map(|snapshot| snapshot.to_line(line_format))
            .collect()
    }

    pub fn snapshots(&self) -> Vec<PerformanceSnapshot> {
        self.state.lock().snapshots.clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.state.lock().snapshots.len()
    }

    pub fn clear_snapshots(&self) {
        self.state.lock().snapshots.clear();
    }

    /// Export every stored snapshot to `path`. Returns false, after logging, on failure.
    pub fn write_snapshots_to_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_write_snapshots_to_file(path) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write snapshots to {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn try_write_snapshots_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        // Render under the lock, write outside it.
        let (document, count) = {
            let state = self.state.lock();
            let document = export::render_document(&state.snapshots, &self.config.export)
                .ok_or(TrackerError::EmptyStore)?;
            (document, state.snapshots.len())
        };

        export::write_atomic(path, &document)?;
        log::info!("Wrote {} snapshots to {}", count, path.display());
        Ok(())
    }

    /// Export to `export.default_path` from the configuration.
    pub fn write_snapshots_to_default(&self) -> Result<()> {
        let path = self
            .config
            .export
            .default_path
            .as_ref()
            .ok_or(TrackerError::MissingExportPath)?;
        self.try_write_snapshots_to_file(path)
    }
}

impl ReportListener for PerformanceTracker {
    fn on_report(&self, report: PerformanceReport) {
        let mut state = self.state.lock();
        state.last_report = Some(report);

        if state.monitoring {
            state.samples.push_back(report.fps);
            while state.samples.len() > self.config.monitor.max_buffered_samples {
                state.samples.pop_front();
            }
        }

        log::debug!(
            "Report: fps={} cpu={:.1}% mem={}/{}MB",
            report.fps,
            report.cpu_usage,
            report.memory.used_mb(),
            report.memory.total_mb()
        );
    }
}
