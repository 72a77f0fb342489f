//! Per-backend usage accounting.
//!
//! Counters are lock-free atomics so recording an outcome never
//! blocks routing. Snapshots are taken counter-by-counter and may be
//! momentarily inconsistent under concurrent updates, which is fine
//! for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

/// Usage counters for a single backend.
#[derive(Debug, Default)]
pub struct BackendStats {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    fallbacks: AtomicU64,
    total_latency_ms: AtomicU64,
}

impl BackendStats {
    /// Record that a request was dispatched to this backend.
    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful reply and its latency.
    pub fn record_success(&self, latency: Duration) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record that this backend failed and the router moved on.
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn total_latency_ms(&self) -> u64 {
        self.total_latency_ms.load(Ordering::Relaxed)
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.attempted.store(0, Ordering::Relaxed);
        self.succeeded.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.total_latency_ms.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of one backend's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatsSnapshot {
    pub backend: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub fallbacks: u64,
    pub total_latency_ms: u64,
}

impl BackendStatsSnapshot {
    /// Mean latency over successful replies, if any.
    pub fn average_latency_ms(&self) -> Option<u64> {
        if self.succeeded == 0 {
            None
        } else {
            Some(self.total_latency_ms / self.succeeded)
        }
    }
}

/// Registry of counters, one entry per backend name.
///
/// Registration happens once at router construction; lookups after
/// that are read-only, so a plain Vec is enough.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    entries: Vec<(String, Arc<BackendStats>)>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, returning its counters. Registering the
    /// same name twice returns the existing counters.
    pub fn register(&mut self, name: &str) -> Arc<BackendStats> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let stats = Arc::new(BackendStats::default());
        self.entries.push((name.to_string(), Arc::clone(&stats)));
        stats
    }

    /// Counters for a backend, if registered.
    pub fn get(&self, name: &str) -> Option<Arc<BackendStats>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| Arc::clone(s))
    }

    /// Snapshot every backend's counters.
    pub fn snapshot(&self) -> Vec<BackendStatsSnapshot> {
        self.entries
            .iter()
            .map(|(name, stats)| BackendStatsSnapshot {
                backend: name.clone(),
                attempted: stats.attempted(),
                succeeded: stats.succeeded(),
                fallbacks: stats.fallbacks(),
                total_latency_ms: stats.total_latency_ms(),
            })
            .collect()
    }

    /// Zero every backend's counters.
    pub fn reset_all(&self) {
        for (_, stats) in &self.entries {
            stats.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read() {
        let stats = BackendStats::default();
        stats.record_attempt();
        stats.record_attempt();
        stats.record_success(Duration::from_millis(40));
        stats.record_fallback();

        assert_eq!(stats.attempted(), 2);
        assert_eq!(stats.succeeded(), 1);
        assert_eq!(stats.fallbacks(), 1);
        assert_eq!(stats.total_latency_ms(), 40);
    }

    #[test]
    fn test_reset() {
        let stats = BackendStats::default();
        stats.record_attempt();
        stats.record_success(Duration::from_millis(10));
        stats.reset();

        assert_eq!(stats.attempted(), 0);
        assert_eq!(stats.succeeded(), 0);
        assert_eq!(stats.total_latency_ms(), 0);
    }

    #[test]
    fn test_registry_register_is_idempotent() {
        let mut registry = StatsRegistry::new();
        let a = registry.register("local");
        let b = registry.register("local");
        a.record_attempt();
        assert_eq!(b.attempted(), 1);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_snapshot_and_average() {
        let mut registry = StatsRegistry::new();
        let stats = registry.register("cloud");
        stats.record_attempt();
        stats.record_success(Duration::from_millis(30));
        stats.record_attempt();
        stats.record_success(Duration::from_millis(50));

        let snapshot = &registry.snapshot()[0];
        assert_eq!(snapshot.backend, "cloud");
        assert_eq!(snapshot.attempted, 2);
        assert_eq!(snapshot.average_latency_ms(), Some(40));
    }

    #[test]
    fn test_average_latency_empty() {
        let snapshot = BackendStatsSnapshot {
            backend: "local".to_string(),
            attempted: 3,
            succeeded: 0,
            fallbacks: 3,
            total_latency_ms: 0,
        };
        assert_eq!(snapshot.average_latency_ms(), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = BackendStatsSnapshot {
            backend: "local".to_string(),
            attempted: 1,
            succeeded: 1,
            fallbacks: 0,
            total_latency_ms: 12,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"backend\":\"local\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_increments() {
        let stats = Arc::new(BackendStats::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    stats.record_attempt();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(stats.attempted(), 800);
    }
}
