// src/source.rs

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::report::{PerformanceReport, ReportListener, ReportSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlCounts {
    pub start: u32,
    pub pause: u32,
    pub hide: u32,
    pub show: u32,
}

#[derive(Default)]
struct SourceState {
    listener: Option<Weak<dyn ReportListener>>,
    running: bool,
    visible: bool,
    counts: ControlCounts,
}

/// Host-driven report source.
///
/// Clones share one state, so a host can hand one handle to the tracker and
/// keep another to push reports from its own sampling code.
#[derive(Clone)]
pub struct ManualSource {
    state: Arc<Mutex<SourceState>>,
}

impl ManualSource {
    pub fn new() -> Self {
        ManualSource {
            state: Arc::new(Mutex::new(SourceState {
                visible: true,
                ..SourceState::default()
            })),
        }
    }

    /// Deliver a report to the registered listener.
    ///
    /// Returns false when no listener is registered or it has been dropped.
    pub fn emit(&self, report: PerformanceReport) -> bool {
        let listener = self.state.lock().listener.clone();
        match listener.and_then(|weak| weak.upgrade()) {
            Some(listener) => {
                listener.on_report(report);
                true
            }
            None => {
                log::debug!("Report dropped: no listener registered");
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn control_counts(&self) -> ControlCounts {
        self.state.lock().counts
    }
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSource for ManualSource {
    fn set_listener(&mut self, listener: Weak<dyn ReportListener>) {
        self.state.lock().listener = Some(listener);
    }

    fn start(&mut self) {
        let mut state = self.state.lock();
        state.running = true;
        state.counts.start += 1;
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.counts.pause += 1;
    }

    fn hide(&mut self) {
        let mut state = self.state.lock();
        state.visible = false;
        state.counts.hide += 1;
    }

    fn show(&mut self) {
        let mut state = self.state.lock();
        state.visible = true;
        state.counts.show += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryUsage;

    struct Collect(Mutex<Vec<i64>>);

    impl ReportListener for Collect {
        fn on_report(&self, report: PerformanceReport) {
            self.0.lock().push(report.fps);
        }
    }

    fn report(fps: i64) -> PerformanceReport {
        PerformanceReport::new(fps, 10.0, MemoryUsage::new(0, 0))
    }

    #[test]
    fn emits_to_registered_listener() {
        let collect = Arc::new(Collect(Mutex::new(Vec::new())));
        let mut source = ManualSource::new();
        let weak: Weak<dyn ReportListener> = Arc::downgrade(&collect) as Weak<dyn ReportListener>;
        source.set_listener(weak);

        assert!(source.emit(report(60)));
        assert!(source.emit(report(30)));
        assert_eq!(*collect.0.lock(), vec![60, 30]);
    }

    #[test]
    fn emit_without_listener_is_dropped() {
        let source = ManualSource::new();
        assert!(!source.emit(report(60)));
    }

    #[test]
    fn clones_share_controls() {
        let mut source = ManualSource::new();
        let handle = source.clone();
        source.start();
        source.hide();
        assert!(handle.is_running());
        assert!(!handle.is_visible());
        source.pause();
        assert!(!handle.is_running());
        assert_eq!(
            handle.control_counts(),
            ControlCounts {
                start: 1,
                pause: 1,
                hide: 1,
                show: 0
            }
        );
    }
}
