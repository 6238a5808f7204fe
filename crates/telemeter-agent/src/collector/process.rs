//! Process statistics collector.
//!
//! Memory, thread and descriptor figures come from `/proc/self` and are only
//! available on Linux; elsewhere those gauges stay at zero and only the
//! uptime moves.

use std::time::Instant;

use parking_lot::Mutex;

use telemeter_core::{Collector, DescriptionSink, Gauge, MetricSink, Timer, NO_LABELS};

pub struct ProcessCollector {
    started: Instant,
    resident: Gauge,
    virtual_mem: Gauge,
    threads: Gauge,
    open_fds: Gauge,
    uptime: Gauge,
    read_stats: Timer,
    // One read-and-publish at a time so concurrent gathers see consistent sets.
    refresh: Mutex<()>,
}

#[derive(Debug, Default, PartialEq)]
struct ProcStatus {
    resident_bytes: Option<f64>,
    virtual_bytes: Option<f64>,
    threads: Option<f64>,
}

impl ProcessCollector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            resident: Gauge::new(
                "process_resident_memory_bytes",
                "Resident memory size in bytes",
                NO_LABELS,
            ),
            virtual_mem: Gauge::new(
                "process_virtual_memory_bytes",
                "Virtual memory size in bytes",
                NO_LABELS,
            ),
            threads: Gauge::new("process_threads", "Number of OS threads", NO_LABELS),
            open_fds: Gauge::new(
                "process_open_fds",
                "Number of open file descriptors",
                NO_LABELS,
            ),
            uptime: Gauge::new(
                "process_uptime_seconds",
                "Seconds since the collector was created",
                NO_LABELS,
            ),
            read_stats: Timer::new(
                "process_stats_read_seconds",
                "Time spent reading process statistics",
                NO_LABELS,
            ),
            refresh: Mutex::new(()),
        }
    }

    fn gauges(&self) -> [&Gauge; 5] {
        [
            &self.resident,
            &self.virtual_mem,
            &self.threads,
            &self.open_fds,
            &self.uptime,
        ]
    }

    fn refresh(&self) {
        let _guard = self.refresh.lock();
        let begin = Instant::now();

        match std::fs::read_to_string("/proc/self/status") {
            Ok(raw) => {
                let status = parse_status(&raw);
                if let Some(v) = status.resident_bytes {
                    self.resident.set(v);
                }
                if let Some(v) = status.virtual_bytes {
                    self.virtual_mem.set(v);
                }
                if let Some(v) = status.threads {
                    self.threads.set(v);
                }
            }
            Err(e) => tracing::trace!(error = %e, "process status unavailable"),
        }

        if let Ok(entries) = std::fs::read_dir("/proc/self/fd") {
            self.open_fds.set(entries.count() as f64);
        }
        self.uptime.set(self.started.elapsed().as_secs_f64());

        self.read_stats.update_since(begin);
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        for g in self.gauges() {
            g.describe(sink);
        }
        self.read_stats.describe(sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.refresh();
        for g in self.gauges() {
            g.collect(sink);
        }
        self.read_stats.collect(sink);
    }
}

fn parse_status(raw: &str) -> ProcStatus {
    let mut status = ProcStatus::default();
    for line in raw.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let Some(value) = parts.next().and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        let scale = match parts.next() {
            Some("kB") => 1024.0,
            _ => 1.0,
        };
        match key {
            "VmRSS" => status.resident_bytes = Some(value * scale),
            "VmSize" => status.virtual_bytes = Some(value * scale),
            "Threads" => status.threads = Some(value),
            _ => {}
        }
    }
    status
}
