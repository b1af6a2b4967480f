use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Default)]
struct Running {
    next_id: AtomicU64,
    jobs: Mutex<HashMap<u64, (&'static str, CancellationToken)>>,
}

/// Tokens of the jobs currently running, so an operator can stop them.
#[derive(Clone, Default)]
pub struct JobRegistry {
    running: Arc<Running>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job. It stays registered until the guard is dropped.
    pub fn start(&self, name: &'static str) -> JobGuard {
        let id = self.running.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();
        self.running.jobs.lock().insert(id, (name, token.clone()));
        info!(job_id = id, job = name, "job started");

        JobGuard {
            id,
            name,
            token,
            running: Arc::clone(&self.running),
        }
    }

    pub fn running(&self) -> usize {
        self.running.jobs.lock().len()
    }

    /// Cancel every running job; returns how many were not cancelled yet.
    pub fn cancel_all(&self) -> usize {
        let jobs = self.running.jobs.lock();
        let mut cancelled = 0;
        for (id, (name, token)) in jobs.iter() {
            if !token.is_cancelled() {
                token.cancel();
                cancelled += 1;
                info!(job_id = id, job = name, "job cancellation requested");
            }
        }
        cancelled
    }
}

pub struct JobGuard {
    id: u64,
    name: &'static str,
    token: CancellationToken,
    running: Arc<Running>,
}

impl JobGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.running.jobs.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_unregister_on_drop() {
        let registry = JobRegistry::new();
        let a = registry.start("bulk");
        let b = registry.start("stream");
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.running(), 2);

        drop(a);
        assert_eq!(registry.running(), 1);
        assert_eq!(b.name(), "stream");
    }

    #[test]
    fn cancel_counts_each_job_once() {
        let registry = JobRegistry::new();
        let job = registry.start("bulk");

        assert_eq!(registry.cancel_all(), 1);
        assert!(job.token().is_cancelled());
        assert_eq!(registry.cancel_all(), 0);
    }
}
