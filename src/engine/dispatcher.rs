// ABOUTME: Dispatcher combining the priority queue, the executor, and a concurrency gate
// ABOUTME: Enforces the max_concurrent cap the executor itself only advertises

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use super::executor::{ExecuteOptions, TaskExecutor};
use super::queue::{PriorityQueue, QueuedTask, TaskDefinition};
use super::result::TaskExecutionResult;

/// Point-in-time view of dispatcher capacity.
#[derive(Debug, Clone)]
pub struct DispatcherStats {
    pub max_concurrent: usize,
    pub available_permits: usize,
    pub active_tasks: usize,
    pub queued_tasks: usize,
}

impl DispatcherStats {
    pub fn utilization_percentage(&self) -> f64 {
        if self.max_concurrent == 0 {
            0.0
        } else {
            (self.active_tasks as f64 / self.max_concurrent as f64) * 100.0
        }
    }
}

/// Drains queued work into the executor, at most `max_concurrent` executions
/// at a time. The executor stays usable directly for immediate work; only
/// queued work goes through the permit gate.
pub struct Dispatcher {
    queue: Arc<PriorityQueue>,
    executor: Arc<TaskExecutor>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl Dispatcher {
    pub fn new(executor: Arc<TaskExecutor>) -> Self {
        let config = executor.config();
        Self {
            queue: Arc::new(PriorityQueue::new(config.queue_size)),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            max_concurrent: config.max_concurrent,
            executor,
        }
    }

    pub fn queue(&self) -> &PriorityQueue {
        &self.queue
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    /// Queue a definition for later execution. False when the queue is full.
    pub fn enqueue(&self, definition: TaskDefinition) -> bool {
        let accepted = self.queue.add(definition);
        if !accepted {
            debug!("queue full, task rejected");
        }
        accepted
    }

    fn options_for(queued: &QueuedTask) -> ExecuteOptions {
        ExecuteOptions {
            priority: Some(queued.definition.priority),
            timeout: queued.definition.timeout,
            retries: queued.definition.max_retries,
        }
    }

    /// Dequeue and run the head entry, waiting for a permit first.
    pub async fn run_next(&self) -> Option<TaskExecutionResult> {
        let queued = self.queue.next()?;
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("dispatcher semaphore closed");
        let options = Self::options_for(&queued);
        Some(
            self.executor
                .execute_task(&queued.definition.task_type, queued.definition.input, options)
                .await,
        )
    }

    /// Drain everything currently queued, permit-gated, one tokio task per
    /// entry. Results come back in completion order.
    pub async fn drain(&self) -> Vec<TaskExecutionResult> {
        let mut handles = Vec::new();
        while let Some(queued) = self.queue.next() {
            let semaphore = Arc::clone(&self.semaphore);
            let executor = Arc::clone(&self.executor);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("dispatcher semaphore closed");
                let options = Self::options_for(&queued);
                executor
                    .execute_task(&queued.definition.task_type, queued.definition.input, options)
                    .await
            }));
        }

        if handles.is_empty() {
            return Vec::new();
        }
        info!(count = handles.len(), "draining queued tasks");

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => error!("task join error: {e}"),
            }
        }
        results
    }

    pub fn stats(&self) -> DispatcherStats {
        let available_permits = self.semaphore.available_permits();
        DispatcherStats {
            max_concurrent: self.max_concurrent,
            available_permits,
            active_tasks: self.max_concurrent - available_permits,
            queued_tasks: self.queue.len(),
        }
    }
}
