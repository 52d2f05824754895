// src/overlay.rs

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::report::BYTES_PER_MB;

/// Controls of a debug overlay library that renders its own stats on screen.
pub trait DebugOverlay: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn set_visible(&mut self, visible: bool);
    /// Memory still available to the process, in bytes, if the platform reports it.
    fn available_memory(&self) -> Option<u64>;
}

/// Accumulated timing of one named event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTiming {
    pub count: u32,
    pub total: Duration,
    pub last: Duration,
}

impl EventTiming {
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count
        }
    }
}

type TimingTable = Arc<Mutex<BTreeMap<String, EventTiming>>>;

/// Times one event from creation until [`finish`](Self::finish) or drop.
pub struct TrackedEvent {
    name: String,
    started: Instant,
    timings: TimingTable,
    finished: bool,
}

impl TrackedEvent {
    pub fn finish(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        self.finished = true;

        let mut timings = self.timings.lock();
        let entry = timings.entry(self.name.clone()).or_default();
        entry.count += 1;
        entry.total += elapsed;
        entry.last = elapsed;

        log::debug!("Event '{}' took {:.2}ms", self.name, elapsed.as_secs_f64() * 1000.0);
        elapsed
    }
}

impl Drop for TrackedEvent {
    fn drop(&mut self) {
        if !self.finished {
            self.record();
        }
    }
}

/// Overlay-based monitoring variant: start/stop, visibility and event timing.
pub struct OverlayMonitor<O: DebugOverlay> {
    overlay: O,
    monitoring: bool,
    visible: bool,
    timings: TimingTable,
}

impl<O: DebugOverlay> OverlayMonitor<O> {
    pub fn new(overlay: O, visible: bool) -> Self {
        let mut monitor = OverlayMonitor {
            overlay,
            monitoring: false,
            visible,
            timings: Arc::new(Mutex::new(BTreeMap::new())),
        };
        monitor.overlay.set_visible(visible);
        monitor
    }

    pub fn start_monitoring(&mut self) {
        if self.monitoring {
            return;
        }
        self.overlay.start();
        self.monitoring = true;
        log::info!("Overlay monitoring started");
    }

    pub fn stop_monitoring(&mut self) {
        if !self.monitoring {
            return;
        }
        self.overlay.stop();
        self.monitoring = false;
        log::info!("Overlay monitoring stopped");
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn toggle(&mut self) {
        self.set_visible(!self.visible);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.overlay.set_visible(visible);
    }

    /// Start timing `name`; the duration is recorded when the guard finishes or drops.
    pub fn track_event(&self, name: impl Into<String>) -> TrackedEvent {
        TrackedEvent {
            name: name.into(),
            started: Instant::now(),
            timings: Arc::clone(&self.timings),
            finished: false,
        }
    }

    pub fn event_timing(&self, name: &str) -> Option<EventTiming> {
        self.timings.lock().get(name).copied()
    }

    pub fn event_timings(&self) -> BTreeMap<String, EventTiming> {
        self.timings.lock().clone()
    }

    pub fn available_memory_mb(&self) -> Option<u64> {
        self.overlay.available_memory().map(|bytes| bytes / BYTES_PER_MB)
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }
}
