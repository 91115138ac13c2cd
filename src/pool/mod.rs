//! Module for the generic worker pool decoupling block production from
//! asynchronous block execution.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::domain::Block;
use crate::engine::BlockSubscriber;
use crate::error::{Error, config_error};


type Job = dyn Fn(&Block) + Send + Sync;

/// Throughput counters of a single worker thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerMetrics {
    pub blocks: usize,
    pub statements: usize,
}

/// Per-worker metrics slot. Written only by the owning worker thread;
/// read as a snapshot for reporting.
#[derive(Default)]
struct MetricsSlot {
    blocks: AtomicUsize,
    statements: AtomicUsize,
}

impl MetricsSlot {
    fn record(&self, block: &Block) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.statements.fetch_add(block.len(), Ordering::Relaxed);
    }

    fn snapshot(&self) -> WorkerMetrics {
        WorkerMetrics {
            blocks: self.blocks.load(Ordering::Relaxed),
            statements: self.statements.load(Ordering::Relaxed),
        }
    }
}

#[derive(Default)]
struct Queue {
    blocks: Vec<Block>,
    stopped: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

/// A bounded set of worker threads running one job against queued blocks.
///
/// Submission never blocks and the queue is unbounded; shutdown is a drain,
/// not a cancel: every block submitted before [`WorkerPool::stop`] is
/// executed exactly once before [`WorkerPool::join`] returns.
pub struct WorkerPool {
    shared: Arc<Shared>,
    slots: Vec<Arc<MetricsSlot>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `threads` workers immediately, each running `job` against the
    /// blocks it drains from the shared queue.
    pub fn new(
        name: &str,
        threads: usize,
        job: impl Fn(&Block) + Send + Sync + 'static,
    ) -> Result<Self, Error> {
        if threads == 0 {
            return Err(config_error("worker pool needs at least one thread"));
        }

        let job: Arc<Job> = Arc::new(job);
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            available: Condvar::new(),
        });

        let mut slots = Vec::with_capacity(threads);
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let slot = Arc::new(MetricsSlot::default());
            let handle = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn({
                    let shared = Arc::clone(&shared);
                    let job = Arc::clone(&job);
                    let slot = Arc::clone(&slot);
                    move || worker_loop(&shared, job.as_ref(), &slot)
                })?;
            slots.push(slot);
            handles.push(handle);
        }

        Ok(Self {
            shared,
            slots,
            handles: Mutex::new(handles),
        })
    }

    /// Enqueues a block and wakes a worker. Never blocks the caller.
    pub fn submit(&self, block: Block) {
        {
            let mut queue = self.shared.queue.lock().expect("pool queue lock poisoned");
            queue.blocks.push(block);
        }
        self.shared.available.notify_one();
    }

    /// Closes the pool for new work and wakes every worker. Idempotent.
    pub fn stop(&self) {
        {
            let mut queue = self.shared.queue.lock().expect("pool queue lock poisoned");
            queue.stopped = true;
        }
        self.shared.available.notify_all();
    }

    /// Waits until every worker thread has exited. Only returns once the
    /// queue has been fully drained after [`WorkerPool::stop`].
    pub fn join(&self) {
        let handles = mem::take(&mut *self.handles.lock().expect("pool handle lock poisoned"));
        for handle in handles {
            handle.join().expect("worker thread does not panic");
        }
    }

    /// Snapshot of each worker's counters, indexed by worker number.
    pub fn worker_metrics(&self) -> Vec<WorkerMetrics> {
        self.slots.iter().map(|slot| slot.snapshot()).collect()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl BlockSubscriber for WorkerPool {
    fn on_block(&self, block: &Block) {
        self.submit(block.clone());
    }
}

/// Waits for work or stop, then swaps the whole queue out and runs the batch
/// outside the lock, in enqueue order. The batched drain keeps lock traffic
/// low; ordering across batches won by different workers is deliberately not
/// guaranteed.
fn worker_loop(shared: &Shared, job: &Job, slot: &MetricsSlot) {
    loop {
        let mut queue = shared.queue.lock().expect("pool queue lock poisoned");
        while queue.blocks.is_empty() && !queue.stopped {
            queue = shared
                .available
                .wait(queue)
                .expect("pool queue lock poisoned");
        }
        let stopped = queue.stopped;
        let batch = mem::take(&mut queue.blocks);
        drop(queue);

        for block in &batch {
            job(block);
            slot.record(block);
        }

        // a stopped pool exits only once a wake-up finds the queue empty,
        // so blocks queued before stop() are never dropped
        if stopped && batch.is_empty() {
            break;
        }
    }
}
