use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type JobHandler = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// One scheduled job: a name, a fixed cadence, and a handler. Overlap
/// is never allowed — a re-entry guard skips a tick already in flight
/// and logs a warning, per spec.md §4.6/§5.
struct Job {
    name: &'static str,
    cadence: Duration,
    handler: JobHandler,
    running: Arc<AtomicBool>,
}

/// Explicit job table generalized from the teacher's self-looping
/// `tokio::spawn { loop { ...; sleep(...).await } }` pattern in
/// `workers/event_monitor.rs::start_monitoring`, turned into a
/// registered table of named jobs rather than one ad-hoc loop.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Job>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, name: &'static str, cadence: Duration, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.jobs.push(Job {
            name,
            cadence,
            handler: Arc::new(move || Box::pin(handler())),
            running: Arc::new(AtomicBool::new(false)),
        });
    }

    /// Runs every registered job forever, one `tokio::spawn` loop per
    /// job. Returns a `JoinHandle` per job so `main` can hold them open
    /// for the process lifetime.
    pub fn run(self) -> Vec<tokio::task::JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|job| {
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(job.cadence);
                    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                    loop {
                        ticker.tick().await;
                        if job.running.swap(true, Ordering::SeqCst) {
                            warn!(job = job.name, "skipping tick: previous cycle still running");
                            continue;
                        }
                        let running = job.running.clone();
                        let handler = job.handler.clone();
                        let name = job.name;
                        info!(job = name, "tick");
                        (handler)().await;
                        running.store(false, Ordering::SeqCst);
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn runs_registered_job_on_cadence() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let c = counter.clone();
        scheduler.register("test-job", Duration::from_millis(10), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        let handles = scheduler.run();
        tokio::time::advance(Duration::from_millis(35)).await;
        tokio::task::yield_now().await;
        assert!(counter.load(Ordering::SeqCst) >= 2);
        for h in handles {
            h.abort();
        }
    }
}
