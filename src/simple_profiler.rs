//! Simple profiling guards using thread-local counters
//!
//! Lightweight timing without changing function signatures.
//! Enable with environment variable: TAIL_CHASER_PROFILE=1

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

const SLOTS: usize = 5;
/// Categories tracked by the profiler, in report order
const CATEGORIES: [&str; SLOTS] = ["search", "search_node", "regions", "field_build", "field_update"];

thread_local! {
    static TIMES: RefCell<[u64; SLOTS]> = const { RefCell::new([0; SLOTS]) };
    static COUNTS: RefCell<[usize; SLOTS]> = const { RefCell::new([0; SLOTS]) };
}

// Global aggregators
static GLOBAL_TIMES: [AtomicU64; SLOTS] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_COUNTS: [AtomicUsize; SLOTS] = [
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
];

static ENABLED: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn is_profiling_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("TAIL_CHASER_PROFILE").is_ok())
}

fn category_index(category: &str) -> Option<usize> {
    CATEGORIES.iter().position(|&c| c == category)
}

pub struct ProfileGuard {
    start: Instant,
    slot: usize,
}

impl ProfileGuard {
    /// Starts timing `category`; `None` when profiling is off or the
    /// category is unknown
    pub fn new(category: &'static str) -> Option<Self> {
        if !is_profiling_enabled() {
            return None;
        }
        category_index(category).map(|slot| ProfileGuard {
            start: Instant::now(),
            slot,
        })
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        TIMES.with(|t| t.borrow_mut()[self.slot] += elapsed_ns);
        COUNTS.with(|c| c.borrow_mut()[self.slot] += 1);
    }
}

/// Folds this thread's counters into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    TIMES.with(|t| {
        for (slot, value) in t.borrow_mut().iter_mut().enumerate() {
            GLOBAL_TIMES[slot].fetch_add(*value, Ordering::Relaxed);
            *value = 0;
        }
    });
    COUNTS.with(|c| {
        for (slot, value) in c.borrow_mut().iter_mut().enumerate() {
            GLOBAL_COUNTS[slot].fetch_add(*value, Ordering::Relaxed);
            *value = 0;
        }
    });
}

/// (category, total ns, calls) for every category
pub fn snapshot() -> Vec<(&'static str, u64, usize)> {
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(slot, &name)| {
            (
                name,
                GLOBAL_TIMES[slot].load(Ordering::Relaxed),
                GLOBAL_COUNTS[slot].load(Ordering::Relaxed),
            )
        })
        .collect()
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for (name, time, count) in snapshot() {
        let ms = time as f64 / 1_000_000.0;
        let pct = if total_ns > 0 { 100.0 * time as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = if count > 0 { time as f64 / (count * 1000) as f64 } else { 0.0 };

        eprintln!("{}:", name);
        eprintln!("  Time:     {:.2}ms ({:.1}%)", ms, pct);
        eprintln!("  Calls:    {}", count);
        eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
    }

    eprintln!("═══════════════════════════════════════════════════════════\n");
}
