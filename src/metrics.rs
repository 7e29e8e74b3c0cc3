//! Process-local tick counters. Logged as a summary on shutdown.
use std::sync::atomic::{AtomicU64, Ordering};

static TICKS: AtomicU64 = AtomicU64::new(0);
static NO_CANDIDATE: AtomicU64 = AtomicU64::new(0);
static SUPPRESSED: AtomicU64 = AtomicU64::new(0);
static DEFERRED: AtomicU64 = AtomicU64::new(0);
static SENT: AtomicU64 = AtomicU64::new(0);
static FAILED: AtomicU64 = AtomicU64::new(0);

pub fn inc_ticks() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_no_candidate() {
    NO_CANDIDATE.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_suppressed() {
    SUPPRESSED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_deferred() {
    DEFERRED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_sent() {
    SENT.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_failed() {
    FAILED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub ticks: u64,
    pub no_candidate: u64,
    pub suppressed: u64,
    pub deferred: u64,
    pub sent: u64,
    pub failed: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        ticks: TICKS.load(Ordering::Relaxed),
        no_candidate: NO_CANDIDATE.load(Ordering::Relaxed),
        suppressed: SUPPRESSED.load(Ordering::Relaxed),
        deferred: DEFERRED.load(Ordering::Relaxed),
        sent: SENT.load(Ordering::Relaxed),
        failed: FAILED.load(Ordering::Relaxed),
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ticks={} sent={} deferred={} suppressed={} no_candidate={} failed={}",
            self.ticks, self.sent, self.deferred, self.suppressed, self.no_candidate, self.failed
        )
    }
}
