//! Labeled metric series backed by `DashMap` and atomics.
//!
//! Label *names* are fixed when a family is constructed; call sites pass
//! label values only, in declared order. That keeps unknown label keys a
//! registration-time impossibility and keeps every mutation a single atomic
//! op, so the registry never serializes metrics traffic behind one lock.

use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

/// Escape a label value per the Prometheus exposition rules.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render `k="v",...` from declared names and a stored value vector.
fn label_pairs(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values.iter())
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn owned_key(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Lock-free `f64` accumulation over atomic bits.
fn add_f64(cell: &AtomicU64, v: f64) {
    let mut cur = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(cur) + v).to_bits();
        match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => cur = actual,
        }
    }
}

/// `{}` on f64 prints `1` for 1.0 and `0.005` for 0.005, which matches the
/// exposition convention for bucket bounds and sums.
fn fmt_f64(v: f64) -> String {
    format!("{}", v)
}

// --------------------
// CounterVec
// --------------------

/// Monotonic counter family with a fixed label-name set.
pub struct CounterVec {
    names: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            map: DashMap::new(),
        }
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) {
        self.add(values, 1);
    }

    /// Increment by an arbitrary value. Never decrements.
    pub fn add(&self, values: &[&str], v: u64) {
        debug_assert_eq!(values.len(), self.names.len(), "counter label arity");
        if values.len() != self.names.len() {
            return;
        }
        let cell = self
            .map
            .entry(owned_key(values))
            .or_insert_with(|| AtomicU64::new(0));
        cell.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label combination (0 when never incremented).
    pub fn get(&self, values: &[&str]) -> u64 {
        self.map
            .get(&owned_key(values))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub(crate) fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "counter");
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, label_pairs(self.names, &key), val);
        }
    }
}

// --------------------
// Gauge
// --------------------

/// Unlabeled gauge. The active-request gauge never goes negative because the
/// tracker pairs every increment with exactly one decrement via a drop guard.
#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub(crate) fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "gauge");
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}

// --------------------
// HistogramVec
// --------------------

struct HistogramCell {
    count: AtomicU64,
    sum_bits: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl HistogramCell {
    fn new(n_buckets: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n_buckets).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Histogram family. Bucket upper bounds are fixed at construction and
/// shared by every label combination.
pub struct HistogramVec {
    names: &'static [&'static str],
    bounds: &'static [f64],
    map: DashMap<Vec<String>, HistogramCell>,
}

impl HistogramVec {
    pub fn new(names: &'static [&'static str], bounds: &'static [f64]) -> Self {
        Self {
            names,
            bounds,
            map: DashMap::new(),
        }
    }

    /// Record one sample into cumulative buckets.
    pub fn observe(&self, values: &[&str], v: f64) {
        debug_assert_eq!(values.len(), self.names.len(), "histogram label arity");
        if values.len() != self.names.len() {
            return;
        }
        let cell = self
            .map
            .entry(owned_key(values))
            .or_insert_with(|| HistogramCell::new(self.bounds.len()));
        cell.count.fetch_add(1, Ordering::Relaxed);
        add_f64(&cell.sum_bits, v);
        for (bucket, bound) in cell.buckets.iter().zip(self.bounds.iter()) {
            if v <= *bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Total sample count for one label combination.
    pub fn count(&self, values: &[&str]) -> u64 {
        self.map
            .get(&owned_key(values))
            .map(|c| c.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of samples for one label combination.
    pub fn sum(&self, values: &[&str]) -> f64 {
        self.map
            .get(&owned_key(values))
            .map(|c| f64::from_bits(c.sum_bits.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    pub(crate) fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");
        let mut keys: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        for key in keys {
            let Some(cell) = self.map.get(&key) else { continue };
            let labels = label_pairs(self.names, &key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };
            for (bucket, bound) in cell.buckets.iter().zip(self.bounds.iter()) {
                let _ = writeln!(
                    out,
                    "{}_bucket{{{}le=\"{}\"}} {}",
                    name,
                    prefix,
                    fmt_f64(*bound),
                    bucket.load(Ordering::Relaxed)
                );
            }
            let count = cell.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let sum = f64::from_bits(cell.sum_bits.load(Ordering::Relaxed));
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, fmt_f64(sum));
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

// --------------------
// InfoRecord
// --------------------

/// Single key/value info record. `record` replaces the mapping wholesale,
/// last write wins; renders as one `name{...} 1` line.
#[derive(Default)]
pub struct InfoRecord {
    pairs: Mutex<Vec<(String, String)>>,
}

impl InfoRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, pairs: &[(&str, &str)]) {
        let mut guard = match self.pairs.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
    }

    /// Snapshot of the current mapping (for tests and debugging).
    pub fn snapshot(&self) -> Vec<(String, String)> {
        match self.pairs.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn render(&self, name: &str, help: &str, out: &mut String) {
        let pairs = self.snapshot();
        if pairs.is_empty() {
            return;
        }
        write_header(out, name, help, "gauge");
        let labels = pairs
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}{{{}}} 1", name, labels);
    }
}
