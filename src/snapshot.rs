// src/snapshot.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_LINE_TIME_FORMAT: &str = "%H:%M:%S";

pub type Metadata = BTreeMap<String, String>;

/// Frame-rate columns of an exported file. One layout applies to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsLayout {
    Single,
    Window,
}

impl FpsLayout {
    fn columns(&self) -> &'static [&'static str] {
        match self {
            FpsLayout::Single => &["FPS"],
            FpsLayout::Window => &["FPS", "FPS Min", "FPS Max", "FPS Avg"],
        }
    }
}

/// Frame-rate statistic carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameRate {
    /// A single reading, used when no samples were buffered since the last capture.
    Instant(i64),
    /// Aggregate over the sampling window, the current reading included.
    Window {
        current: i64,
        min: i64,
        max: i64,
        avg: i64,
    },
}

impl FrameRate {
    /// Aggregate `samples` together with `current`.
    ///
    /// `current` counts once more on top of the buffered samples, even when the
    /// buffer already ends with it. The average truncates toward zero.
    pub fn from_window(current: i64, samples: &[i64]) -> Self {
        if samples.is_empty() {
            return FrameRate::Instant(current);
        }

        let min = samples.iter().copied().fold(current, i64::min);
        let max = samples.iter().copied().fold(current, i64::max);
        // Summed in i128 so i64 samples cannot overflow; the mean lies in min..=max.
        let sum: i128 = samples.iter().map(|&fps| i128::from(fps)).sum::<i128>()
            + i128::from(current);
        let avg = (sum / (samples.len() as i128 + 1)) as i64;

        FrameRate::Window {
            current,
            min,
            max,
            avg,
        }
    }

    pub fn current(&self) -> i64 {
        match *self {
            FrameRate::Instant(fps) => fps,
            FrameRate::Window { current, .. } => current,
        }
    }

    pub fn layout(&self) -> FpsLayout {
        match self {
            FrameRate::Instant(_) => FpsLayout::Single,
            FrameRate::Window { .. } => FpsLayout::Window,
        }
    }

    /// Fields for `layout`. An instant fills every window column with its value,
    /// a window reduced to one column keeps `current`.
    fn row_fields(&self, layout: FpsLayout) -> Vec<String> {
        let (current, min, max, avg) = match *self {
            FrameRate::Instant(fps) => (fps, fps, fps, fps),
            FrameRate::Window {
                current,
                min,
                max,
                avg,
            } => (current, min, max, avg),
        };

        match layout {
            FpsLayout::Single => vec![current.to_string()],
            FpsLayout::Window => vec![
                current.to_string(),
                min.to_string(),
                max.to_string(),
                avg.to_string(),
            ],
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FrameRate::Instant(fps) => write!(f, "{}", fps),
            FrameRate::Window { min, max, avg, .. } => write!(f, "{}/{}/{}", min, max, avg),
        }
    }
}

/// One timestamped performance reading plus caller metadata. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    timestamp: DateTime<Local>,
    frame_rate: FrameRate,
    cpu_usage: f64,
    memory_used: u64,
    memory_total: u64,
    metadata: Metadata,
}

impl PerformanceSnapshot {
    /// Create a snapshot stamped with the current local time.
    pub fn new(
        frame_rate: FrameRate,
        cpu_usage: f64,
        memory_used: u64,
        memory_total: u64,
        metadata: Metadata,
    ) -> Self {
        PerformanceSnapshot {
            timestamp: Local::now(),
            frame_rate,
            cpu_usage,
            memory_used,
            memory_total,
            metadata,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Percentage in 0-100.
    pub fn cpu_usage(&self) -> f64 {
        self.cpu_usage
    }

    /// Megabytes.
    pub fn memory_used(&self) -> u64 {
        self.memory_used
    }

    /// Megabytes.
    pub fn memory_total(&self) -> u64 {
        self.memory_total
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `[HH:mm:ss] FPS: .., CPU: X.X%, Mem: used/totalMB (key:value, ..)`
    pub fn to_line(&self, time_format: &str) -> String {
        let mut line = format!(
            "[{}] FPS: {}, CPU: {:.1}%, Mem: {}/{}MB",
            format_time(&self.timestamp, time_format, DEFAULT_LINE_TIME_FORMAT),
            self.frame_rate,
            self.cpu_usage,
            self.memory_used,
            self.memory_total
        );

        if !self.metadata.is_empty() {
            let pairs: Vec<String> = self
                .metadata
                .iter()
                .map(|(key, value)| format!("{}:{}", key, value.replace('\n', " ")))
                .collect();
            line.push_str(&format!(" ({})", pairs.join(", ")));
        }

        line
    }

    /// Comma-separated row: fixed metric columns, then `key:"value"` per metadata entry.
    pub fn to_row(&self, timestamp_format: &str) -> String {
        self.to_row_with_layout(timestamp_format, self.frame_rate.layout())
    }

    /// Row with the frame-rate columns forced to `layout`, so rows of
    /// differently shaped snapshots line up under one header.
    pub fn to_row_with_layout(&self, timestamp_format: &str, layout: FpsLayout) -> String {
        let mut fields = vec![format_time(
            &self.timestamp,
            timestamp_format,
            DEFAULT_TIMESTAMP_FORMAT,
        )];
        fields.extend(self.frame_rate.row_fields(layout));
        fields.push(self.cpu_usage.to_string());
        fields.push(self.memory_used.to_string());
        fields.push(self.memory_total.to_string());

        for (key, value) in &self.metadata {
            fields.push(format!("{}:\"{}\"", key, escape_value(value)));
        }

        fields.join(",")
    }

    /// Header matching [`to_row`](Self::to_row) for this snapshot's shape and metadata keys.
    pub fn header(&self) -> String {
        let mut columns = vec!["Timestamp".to_string()];
        columns.extend(self.frame_rate.layout().columns().iter().map(|c| c.to_string()));
        columns.push("CPU Usage (%)".to_string());
        columns.push("Memory Used (MB)".to_string());
        columns.push("Memory Total (MB)".to_string());
        columns.extend(self.metadata.keys().cloned());
        columns.join(",")
    }
}

impl fmt::Display for PerformanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line(DEFAULT_LINE_TIME_FORMAT))
    }
}

/// Double every quote so the value can sit inside a quoted field.
pub fn escape_value(value: &str) -> String {
    value.replace('"', "\"\"")
}

// An unparseable user format falls back to the default instead of panicking in `to_string`.
fn format_time(timestamp: &DateTime<Local>, format: &str, fallback: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(format)).is_ok() {
        return out;
    }
    log::warn!("Invalid time format {:?}, using {:?}", format, fallback);
    timestamp.format(fallback).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 5, 10, 0, 0).unwrap()
    }

    fn kitchen() -> PerformanceSnapshot {
        let mut metadata = Metadata::new();
        metadata.insert("scene".to_string(), "kitchen".to_string());
        PerformanceSnapshot::new(FrameRate::Instant(58), 23.4, 512, 4096, metadata)
            .with_timestamp(fixed_time())
    }

    #[test]
    fn row_matches_reference_layout() {
        assert_eq!(
            kitchen().to_row(DEFAULT_TIMESTAMP_FORMAT),
            "2025-07-05 10:00:00,58,23.4,512,4096,scene:\"kitchen\""
        );
    }

    #[test]
    fn header_lists_fixed_columns_then_keys() {
        assert_eq!(
            kitchen().header(),
            "Timestamp,FPS,CPU Usage (%),Memory Used (MB),Memory Total (MB),scene"
        );
    }

    #[test]
    fn window_header_and_row_carry_four_fps_columns() {
        let snapshot = PerformanceSnapshot::new(
            FrameRate::from_window(58, &[50, 60]),
            10.0,
            1,
            2,
            Metadata::new(),
        )
        .with_timestamp(fixed_time());

        assert_eq!(
            snapshot.header(),
            "Timestamp,FPS,FPS Min,FPS Max,FPS Avg,CPU Usage (%),Memory Used (MB),Memory Total (MB)"
        );
        assert_eq!(
            snapshot.to_row(DEFAULT_TIMESTAMP_FORMAT),
            "2025-07-05 10:00:00,58,50,60,56,10,1,2"
        );
    }

    #[test]
    fn line_rendering() {
        assert_eq!(
            kitchen().to_string(),
            "[10:00:00] FPS: 58, CPU: 23.4%, Mem: 512/4096MB (scene:kitchen)"
        );
    }

    #[test]
    fn line_without_metadata_has_no_parentheses() {
        let snapshot = PerformanceSnapshot::new(
            FrameRate::from_window(30, &[20, 40]),
            5.04,
            100,
            200,
            Metadata::new(),
        )
        .with_timestamp(fixed_time());
        assert_eq!(
            snapshot.to_string(),
            "[10:00:00] FPS: 20/40/30, CPU: 5.0%, Mem: 100/200MB"
        );
    }

    #[test]
    fn line_flattens_newlines_and_row_doubles_quotes() {
        let mut metadata = Metadata::new();
        metadata.insert("note".to_string(), "say \"hi\"\nthere".to_string());
        let snapshot = PerformanceSnapshot::new(FrameRate::Instant(60), 1.0, 0, 0, metadata)
            .with_timestamp(fixed_time());

        assert!(snapshot.to_string().ends_with("(note:say \"hi\" there)"));
        assert!(snapshot
            .to_row(DEFAULT_TIMESTAMP_FORMAT)
            .ends_with("note:\"say \"\"hi\"\"\nthere\""));
    }

    #[test]
    fn line_and_row_agree_on_values() {
        let snapshot = kitchen();
        let line = snapshot.to_string();
        let row = snapshot.to_row(DEFAULT_TIMESTAMP_FORMAT);

        assert!(row.starts_with("2025-07-05 10:00:00,"));
        assert!(line.starts_with("[10:00:00]"));
        for value in ["58", "23.4", "512", "4096", "kitchen"] {
            assert!(line.contains(value), "line missing {}", value);
            assert!(row.contains(value), "row missing {}", value);
        }
    }

    #[test]
    fn window_includes_current_in_every_statistic() {
        assert_eq!(
            FrameRate::from_window(10, &[50, 60, 55]),
            FrameRate::Window {
                current: 10,
                min: 10,
                max: 60,
                avg: 43,
            }
        );
        assert_eq!(FrameRate::from_window(42, &[]), FrameRate::Instant(42));
    }

    #[test]
    fn window_average_does_not_overflow() {
        assert_eq!(
            FrameRate::from_window(i64::MAX, &[i64::MAX, i64::MAX]),
            FrameRate::Window {
                current: i64::MAX,
                min: i64::MAX,
                max: i64::MAX,
                avg: i64::MAX,
            }
        );
        assert_eq!(
            FrameRate::from_window(i64::MIN, &[i64::MAX]),
            FrameRate::Window {
                current: i64::MIN,
                min: i64::MIN,
                max: i64::MAX,
                avg: 0,
            }
        );
    }

    #[test]
    fn instant_fills_window_layout() {
        let snapshot =
            PerformanceSnapshot::new(FrameRate::Instant(58), 23.4, 512, 4096, Metadata::new())
                .with_timestamp(fixed_time());
        assert_eq!(
            snapshot.to_row_with_layout(DEFAULT_TIMESTAMP_FORMAT, FpsLayout::Window),
            "2025-07-05 10:00:00,58,58,58,58,23.4,512,4096"
        );

        let window = PerformanceSnapshot::new(
            FrameRate::from_window(58, &[50, 60]),
            23.4,
            512,
            4096,
            Metadata::new(),
        )
        .with_timestamp(fixed_time());
        assert_eq!(
            window.to_row_with_layout(DEFAULT_TIMESTAMP_FORMAT, FpsLayout::Single),
            "2025-07-05 10:00:00,58,23.4,512,4096"
        );
    }

    #[test]
    fn custom_line_time_format() {
        assert!(kitchen().to_line("%H:%M").starts_with("[10:00] FPS: 58"));
    }

    #[test]
    fn escape_doubles_quotes_only() {
        assert_eq!(escape_value(r#"a "b" c"#), r#"a ""b"" c"#);
        assert_eq!(escape_value("plain"), "plain");
    }
}
