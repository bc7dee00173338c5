use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-wide counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub skill_scans: Arc<AtomicUsize>,
    pub skills_discovered: Arc<AtomicU64>,
    pub parse_failures: Arc<AtomicU64>,
    pub files_written: Arc<AtomicU64>,
    pub files_deleted: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            skill_scans: Arc::new(AtomicUsize::new(0)),
            skills_discovered: Arc::new(AtomicU64::new(0)),
            parse_failures: Arc::new(AtomicU64::new(0)),
            files_written: Arc::new(AtomicU64::new(0)),
            files_deleted: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record_scan(&self, discovered: u64, failures: u64) {
        self.skill_scans.fetch_add(1, Ordering::Relaxed);
        self.skills_discovered.fetch_add(discovered, Ordering::Relaxed);
        self.parse_failures.fetch_add(failures, Ordering::Relaxed);
    }

    pub fn add_parse_failures(&self, count: u64) {
        self.parse_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_files_written(&self) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_files_deleted(&self) {
        self.files_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            skill_scans: self.skill_scans.load(Ordering::Relaxed),
            skills_discovered: self.skills_discovered.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            files_written: self.files_written.load(Ordering::Relaxed),
            files_deleted: self.files_deleted.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub skill_scans: usize,
    pub skills_discovered: u64,
    pub parse_failures: u64,
    pub files_written: u64,
    pub files_deleted: u64,
    pub uptime_seconds: u64,
}
