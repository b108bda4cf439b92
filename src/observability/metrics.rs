//! Metric names recorded by the cleaning pipeline and the analytics view
//!
//! Recording goes through the `metrics` facade. Nothing is exported unless a recorder
//! has been installed by the embedding process.

use std::fmt;
use std::time::Instant;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Cleaning pipeline
    RowsLoaded,
    DuplicatesRemoved,
    ValuesCoerced,
    ColumnsDropped,
    RowsWritten,
    CleanDuration,

    // Analytics view
    ViewComputations,
    ViewRowsSelected,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsLoaded => "streamboard_rows_loaded_total",
            MetricName::DuplicatesRemoved => "streamboard_duplicates_removed_total",
            MetricName::ValuesCoerced => "streamboard_values_coerced_total",
            MetricName::ColumnsDropped => "streamboard_columns_dropped_total",
            MetricName::RowsWritten => "streamboard_rows_written_total",
            MetricName::CleanDuration => "streamboard_clean_duration_seconds",
            MetricName::ViewComputations => "streamboard_view_computations_total",
            MetricName::ViewRowsSelected => "streamboard_view_rows_selected",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            RowsLoaded,
            DuplicatesRemoved,
            ValuesCoerced,
            ColumnsDropped,
            RowsWritten,
            CleanDuration,
            ViewComputations,
            ViewRowsSelected,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn increment(name: MetricName, by: u64) {
    ::metrics::counter!(name.as_str()).increment(by);
}

pub fn record(name: MetricName, value: f64) {
    ::metrics::histogram!(name.as_str()).record(value);
}

/// Records elapsed seconds to a histogram when dropped
pub struct TimingGuard {
    start: Instant,
    name: MetricName,
}

impl TimingGuard {
    pub fn new(name: MetricName) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        record(self.name, self.start.elapsed().as_secs_f64());
    }
}

/// Recorder counting metric registrations, for asserting what code records
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CountingRecorder {
    registrations: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl CountingRecorder {
    pub(crate) fn registrations(&self) -> usize {
        self.registrations.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn bump(&self) {
        self.registrations.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl ::metrics::Recorder for CountingRecorder {
    fn describe_counter(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
    fn describe_gauge(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
    fn describe_histogram(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}

    fn register_counter(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Counter {
        self.bump();
        ::metrics::Counter::noop()
    }

    fn register_gauge(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Gauge {
        self.bump();
        ::metrics::Gauge::noop()
    }

    fn register_histogram(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Histogram {
        self.bump();
        ::metrics::Histogram::noop()
    }
}
