//! A fixed-size OS-thread worker pool (§5): every task is enqueued by a
//! single producer before [`Workers::begin`] is called, then a fixed set of
//! threads drain a shared queue in batches until it runs dry. There is no
//! cancellation and no task arrives after `begin()` — the pool exists to
//! parallelize one bounded unit of work (one bake), not to serve as a
//! general-purpose executor.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// One unit of work a [`Workers`] pool executes. `Toolbox` carries whatever
/// per-worker, non-`Sync` state (e.g. an RNG) a task needs but that the pool
/// itself has no reason to own.
pub trait Task: Send + 'static {
    /// Per-worker context handed to every task this worker executes.
    type Toolbox;

    /// Executes the task against the worker's toolbox, storing its result
    /// on `self`.
    fn perform(&mut self, toolbox: &mut Self::Toolbox);
}

/// How many tasks a worker pops from the shared queue per lock acquisition.
/// Larger batches cut lock contention at the cost of coarser load balance
/// near the end of the run.
const DEFAULT_BATCH_SIZE: usize = 16;

struct StartGate {
    mutex: Mutex<bool>,
    condvar: Condvar,
}

/// A fixed pool of OS threads draining a single-producer task queue.
pub struct Workers<T: Task> {
    todo: Arc<Mutex<Vec<T>>>,
    completed: Arc<Mutex<Vec<T>>>,
    gate: Arc<StartGate>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Task> Workers<T> {
    /// Spawns `num_workers` threads, each holding the `Toolbox` produced by
    /// `make_toolbox(worker_index)`. Threads park on the start gate until
    /// [`Workers::begin`] is called.
    pub fn new<F>(num_workers: usize, make_toolbox: F) -> Self
    where
        F: Fn(usize) -> T::Toolbox + Send + Sync + 'static,
        T::Toolbox: 'static,
    {
        let todo: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::new()));
        let completed: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(StartGate {
            mutex: Mutex::new(false),
            condvar: Condvar::new(),
        });
        let make_toolbox = Arc::new(make_toolbox);

        let mut handles = Vec::with_capacity(num_workers);
        for worker_index in 0..num_workers {
            let todo = Arc::clone(&todo);
            let completed = Arc::clone(&completed);
            let gate = Arc::clone(&gate);
            let make_toolbox = Arc::clone(&make_toolbox);

            handles.push(thread::spawn(move || {
                {
                    let mut started = gate.mutex.lock().unwrap();
                    while !*started {
                        started = gate.condvar.wait(started).unwrap();
                    }
                }

                let mut toolbox = make_toolbox(worker_index);
                loop {
                    let batch = {
                        let mut queue = todo.lock().unwrap();
                        let take = queue.len().min(DEFAULT_BATCH_SIZE);
                        queue.split_off(queue.len() - take)
                    };
                    if batch.is_empty() {
                        break;
                    }
                    let mut finished = Vec::with_capacity(batch.len());
                    for mut task in batch {
                        task.perform(&mut toolbox);
                        finished.push(task);
                    }
                    completed.lock().unwrap().extend(finished);
                }
            }));
        }

        Workers {
            todo,
            completed,
            gate,
            handles,
        }
    }

    /// Adds a task to the work queue. Must be called before [`Workers::begin`];
    /// tasks enqueued after workers have started may never be picked up.
    pub fn enqueue(&self, task: T) {
        self.todo.lock().unwrap().push(task);
    }

    /// Releases every parked worker to start draining the queue.
    pub fn begin(&self) {
        *self.gate.mutex.lock().unwrap() = true;
        self.gate.condvar.notify_all();
    }

    /// Joins every worker thread and returns every completed task, in
    /// whatever order they finished.
    pub fn join(self) -> Vec<T> {
        for handle in self.handles {
            handle.join().expect("worker thread panicked");
        }
        Arc::try_unwrap(self.completed)
            .unwrap_or_else(|_| panic!("worker pool outlived its last thread"))
            .into_inner()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AddOne {
        value: usize,
        result: usize,
    }

    impl Task for AddOne {
        type Toolbox = usize;

        fn perform(&mut self, toolbox: &mut Self::Toolbox) {
            *toolbox += 1;
            self.result = self.value + 1;
        }
    }

    #[test]
    fn every_task_runs_exactly_once() {
        let pool: Workers<AddOne> = Workers::new(4, |_| 0usize);
        for i in 0..100 {
            pool.enqueue(AddOne { value: i, result: 0 });
        }
        pool.begin();
        let mut results = pool.join();
        results.sort_by_key(|t| t.value);
        for (i, task) in results.iter().enumerate() {
            assert_eq!(task.result, i + 1);
        }
        assert_eq!(results.len(), 100);
    }

    #[test]
    fn toolbox_is_built_once_per_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let pool: Workers<AddOne> = Workers::new(3, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            0usize
        });
        pool.enqueue(AddOne { value: 1, result: 0 });
        pool.begin();
        let _ = pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn empty_queue_completes_immediately() {
        let pool: Workers<AddOne> = Workers::new(2, |_| 0usize);
        pool.begin();
        let results = pool.join();
        assert!(results.is_empty());
    }
}
