// ABOUTME: Priority queue holding pending task definitions in strict priority order
// ABOUTME: Entries stay sorted by non-increasing weight with FIFO ties and a fixed capacity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    High,
    Critical,
    // Unrecognized labels deserialize to Normal, matching from_label.
    // Last variant because #[serde(other)] must be on the final variant.
    #[default]
    #[serde(other)]
    Normal,
}

impl TaskPriority {
    /// Numeric weight used for queue ordering.
    pub fn weight(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Normal => 2,
            TaskPriority::High => 3,
            TaskPriority::Critical => 4,
        }
    }

    /// Parse a priority label; unrecognized labels map to `Normal`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "low" => TaskPriority::Low,
            "normal" => TaskPriority::Normal,
            "high" => TaskPriority::High,
            "critical" => TaskPriority::Critical,
            _ => TaskPriority::Normal,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Normal => write!(f, "normal"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Critical => write!(f, "critical"),
        }
    }
}

/// Description of a unit of queued work. Immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TaskDefinition {
    pub fn new(
        task_type: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_type: task_type.into(),
            name: name.into(),
            description: String::new(),
            input,
            priority: TaskPriority::Normal,
            timeout: None,
            max_retries: None,
            depends_on: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// A task definition while it sits in the queue. Owned by the queue until
/// dequeued or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedTask {
    pub definition: TaskDefinition,
    pub weight: u8,
    pub enqueued_at: DateTime<Utc>,
}

/// Bounded pending-work list ordered by non-increasing priority weight.
///
/// Equal-priority entries form a FIFO run: a new entry is inserted
/// immediately before the first existing entry with a strictly lower weight.
/// An ordered Vec rather than a heap, so ties stay stable and snapshots come
/// out in queue order. Interior mutex so concurrent producers are safe.
pub struct PriorityQueue {
    entries: Mutex<Vec<QueuedTask>>,
    capacity: usize,
}

impl PriorityQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a task at its priority position. Returns false (and leaves the
    /// queue untouched) when the queue is full. Duplicate ids are allowed.
    pub fn add(&self, definition: TaskDefinition) -> bool {
        let mut entries = self.entries.lock().expect("queue mutex poisoned");
        if entries.len() >= self.capacity {
            return false;
        }

        let queued = QueuedTask {
            weight: definition.priority.weight(),
            definition,
            enqueued_at: Utc::now(),
        };
        let position = entries
            .iter()
            .position(|entry| entry.weight < queued.weight)
            .unwrap_or(entries.len());
        entries.insert(position, queued);
        true
    }

    /// Remove and return the head: highest priority, earliest among ties.
    pub fn next(&self) -> Option<QueuedTask> {
        let mut entries = self.entries.lock().expect("queue mutex poisoned");
        if entries.is_empty() {
            None
        } else {
            Some(entries.remove(0))
        }
    }

    /// Return the head without removing it.
    pub fn peek(&self) -> Option<QueuedTask> {
        let entries = self.entries.lock().expect("queue mutex poisoned");
        entries.first().cloned()
    }

    /// Remove the first entry with a matching id.
    pub fn remove(&self, task_id: &str) -> bool {
        let mut entries = self.entries.lock().expect("queue mutex poisoned");
        match entries.iter().position(|entry| entry.definition.id == task_id) {
            Some(position) => {
                entries.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn clear(&self) {
        self.entries.lock().expect("queue mutex poisoned").clear();
    }

    /// Snapshot of the queue contents in queue order.
    pub fn all(&self) -> Vec<QueuedTask> {
        self.entries.lock().expect("queue mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(id: &str, priority: TaskPriority) -> TaskDefinition {
        TaskDefinition::new("echo", id, json!({}))
            .with_id(id)
            .with_priority(priority)
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(TaskPriority::Low.weight(), 1);
        assert_eq!(TaskPriority::Normal.weight(), 2);
        assert_eq!(TaskPriority::High.weight(), 3);
        assert_eq!(TaskPriority::Critical.weight(), 4);
    }

    #[test]
    fn test_unrecognized_label_defaults_to_normal() {
        assert_eq!(TaskPriority::from_label("high"), TaskPriority::High);
        assert_eq!(TaskPriority::from_label("urgent"), TaskPriority::Normal);
        assert_eq!(TaskPriority::from_label(""), TaskPriority::Normal);
    }

    #[test]
    fn test_unrecognized_label_deserializes_to_normal() {
        let definition: TaskDefinition = serde_json::from_value(json!({
            "id": "t1",
            "type": "echo",
            "name": "t1",
            "priority": "urgent",
        }))
        .unwrap();
        assert_eq!(definition.priority, TaskPriority::Normal);

        let definition: TaskDefinition = serde_json::from_value(json!({
            "id": "t2",
            "type": "echo",
            "name": "t2",
            "priority": "critical",
        }))
        .unwrap();
        assert_eq!(definition.priority, TaskPriority::Critical);
    }

    #[test]
    fn test_ordering_by_weight() {
        let queue = PriorityQueue::new(10);
        assert!(queue.add(definition("low", TaskPriority::Low)));
        assert!(queue.add(definition("critical", TaskPriority::Critical)));
        assert!(queue.add(definition("normal", TaskPriority::Normal)));
        assert!(queue.add(definition("high", TaskPriority::High)));

        let ids: Vec<String> = queue
            .all()
            .into_iter()
            .map(|entry| entry.definition.id)
            .collect();
        assert_eq!(ids, vec!["critical", "high", "normal", "low"]);
    }

    #[test]
    fn test_equal_priority_is_fifo() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("a", TaskPriority::Normal));
        queue.add(definition("b", TaskPriority::Normal));
        queue.add(definition("c", TaskPriority::Normal));

        assert_eq!(queue.next().unwrap().definition.id, "a");
        assert_eq!(queue.next().unwrap().definition.id, "b");
        assert_eq!(queue.next().unwrap().definition.id, "c");
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_add_on_full_queue_returns_false() {
        let queue = PriorityQueue::new(2);
        assert!(queue.add(definition("a", TaskPriority::Normal)));
        assert!(queue.add(definition("b", TaskPriority::Normal)));
        assert!(queue.is_full());

        assert!(!queue.add(definition("c", TaskPriority::Critical)));
        assert_eq!(queue.len(), 2);
        let ids: Vec<String> = queue
            .all()
            .into_iter()
            .map(|entry| entry.definition.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_next_matches_peek() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("a", TaskPriority::Normal));
        queue.add(definition("b", TaskPriority::High));

        let peeked = queue.peek().unwrap();
        let next = queue.next().unwrap();
        assert_eq!(peeked.definition.id, next.definition.id);
        assert_eq!(next.definition.id, "b");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_peek_empty_queue() {
        let queue = PriorityQueue::new(4);
        assert!(queue.peek().is_none());
        assert!(queue.next().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("a", TaskPriority::Normal));
        queue.add(definition("b", TaskPriority::Normal));

        assert!(queue.remove("a"));
        assert!(!queue.remove("a"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().unwrap().definition.id, "b");
    }

    #[test]
    fn test_duplicate_ids_are_not_deduplicated() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("dup", TaskPriority::Normal));
        queue.add(definition("dup", TaskPriority::Normal));
        assert_eq!(queue.len(), 2);

        // remove drops only the first match
        assert!(queue.remove("dup"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_clear() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("a", TaskPriority::Normal));
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_full());
    }

    #[test]
    fn test_high_priority_inserts_before_lower_fifo_run() {
        let queue = PriorityQueue::new(10);
        queue.add(definition("n1", TaskPriority::Normal));
        queue.add(definition("n2", TaskPriority::Normal));
        queue.add(definition("h1", TaskPriority::High));
        queue.add(definition("h2", TaskPriority::High));

        let ids: Vec<String> = queue
            .all()
            .into_iter()
            .map(|entry| entry.definition.id)
            .collect();
        assert_eq!(ids, vec!["h1", "h2", "n1", "n2"]);
    }
}
