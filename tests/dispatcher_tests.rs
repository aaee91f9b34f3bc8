// ABOUTME: Integration tests for queued execution through the dispatcher
// ABOUTME: Covers priority-ordered draining, queue overflow, and history round-trips

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use helmsman::{
    Dispatcher, ExecutorConfig, TaskDefinition, TaskExecutor, TaskPriority, TaskRegistry,
    TaskStatus,
};

mod common;

fn dispatcher_with_queue_size(queue_size: usize) -> Dispatcher {
    let config = ExecutorConfig {
        queue_size,
        backoff_base: Duration::from_millis(1),
        ..ExecutorConfig::default()
    };
    let executor = Arc::new(TaskExecutor::with_registry(
        config,
        TaskRegistry::with_builtins(),
    ));
    Dispatcher::new(executor)
}

fn echo(id: &str, priority: TaskPriority) -> TaskDefinition {
    TaskDefinition::new("echo", id, json!({"id": id}))
        .with_id(id)
        .with_priority(priority)
}

#[tokio::test]
async fn test_queue_overflow_rejects_new_work() {
    let dispatcher = dispatcher_with_queue_size(2);
    assert!(dispatcher.enqueue(echo("a", TaskPriority::Normal)));
    assert!(dispatcher.enqueue(echo("b", TaskPriority::Normal)));
    assert!(!dispatcher.enqueue(echo("c", TaskPriority::Critical)));
    assert_eq!(dispatcher.queue().len(), 2);
}

#[tokio::test]
async fn test_queued_execution_lands_in_history() {
    let dispatcher = dispatcher_with_queue_size(10);
    dispatcher.enqueue(echo("a", TaskPriority::Normal));
    dispatcher.enqueue(echo("b", TaskPriority::High));

    let results = dispatcher.drain().await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == TaskStatus::Completed));
    // The queued priority travels through to the recorded result.
    assert!(results.iter().all(|r| r.metadata.contains_key("priority")));

    let stats = dispatcher.executor().stats().await;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.success_rate, 1.0);
}

#[tokio::test]
async fn test_run_next_dequeues_in_priority_order() {
    let dispatcher = dispatcher_with_queue_size(10);
    dispatcher.enqueue(echo("normal-1", TaskPriority::Normal));
    dispatcher.enqueue(echo("normal-2", TaskPriority::Normal));
    dispatcher.enqueue(echo("urgent", TaskPriority::Critical));

    let order: Vec<String> = [
        dispatcher.run_next().await.unwrap(),
        dispatcher.run_next().await.unwrap(),
        dispatcher.run_next().await.unwrap(),
    ]
    .iter()
    .map(|r| r.output.as_ref().unwrap()["id"].as_str().unwrap().to_string())
    .collect();

    assert_eq!(order, vec!["urgent", "normal-1", "normal-2"]);
    assert!(dispatcher.run_next().await.is_none());
}

#[tokio::test]
async fn test_queued_definition_overrides_apply() {
    let dispatcher = dispatcher_with_queue_size(10);

    // Definition-level retries=0 means one attempt only.
    let (task, calls) = common::FlakyTask::new(u32::MAX);
    dispatcher.executor().register_task(Arc::new(task)).await;
    dispatcher.enqueue(
        TaskDefinition::new("flaky", "once", json!({}))
            .with_id("once")
            .with_max_retries(0),
    );

    let results = dispatcher.drain().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TaskStatus::Failed);
    assert_eq!(results[0].retry_count, 0);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_removed_entry_never_runs() {
    let dispatcher = dispatcher_with_queue_size(10);
    dispatcher.enqueue(echo("keep", TaskPriority::Normal));
    dispatcher.enqueue(echo("drop", TaskPriority::Normal));

    assert!(dispatcher.queue().remove("drop"));
    let results = dispatcher.drain().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].output.as_ref().unwrap()["id"], "keep");
}
