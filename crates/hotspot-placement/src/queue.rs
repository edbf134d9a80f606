//! Placement task queue.
//!
//! Append-only list of [`PlacementTask`]s shared between the window
//! dispatcher (writer) and the scheduler factory (reader). A single
//! `std::sync::Mutex` guards both operations; readers always take a full
//! copy under the lock and never iterate the live list.
//!
//! Tasks are never removed. Expired tasks stay in the list and simply stop
//! being admissible.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use hotspot_core::PlacementTask;

#[derive(Debug, Default)]
pub struct PlacementTaskQueue {
    tasks: Mutex<Vec<PlacementTask>>,
}

impl PlacementTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task. Returns its position in the queue.
    pub fn push(&self, task: PlacementTask) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = tasks.last()
            && task.start_time < last.start_time
        {
            warn!(
                start = task.start_time,
                previous_start = last.start_time,
                "placement task appended out of window order"
            );
        }
        info!(
            regions = ?task.region_ids,
            stores = ?task.store_ids,
            start = task.start_time,
            end = task.end_time,
            "placement task queued"
        );
        tasks.push(task);
        tasks.len() - 1
    }

    /// Copy of every task, in insertion order.
    pub fn snapshot(&self) -> Vec<PlacementTask> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(region: u64, start_time: i64) -> PlacementTask {
        PlacementTask {
            region_ids: vec![region],
            store_ids: vec![1],
            start_time,
            end_time: start_time + 60,
        }
    }

    #[test]
    fn starts_empty() {
        let queue = PlacementTaskQueue::new();
        assert!(queue.is_empty());
        assert!(queue.snapshot().is_empty());
    }

    #[test]
    fn push_returns_position_and_keeps_order() {
        let queue = PlacementTaskQueue::new();
        assert_eq!(queue.push(task(5, 100)), 0);
        assert_eq!(queue.push(task(7, 200)), 1);

        let snap = queue.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].region_ids, vec![5]);
        assert_eq!(snap[1].region_ids, vec![7]);
    }

    #[test]
    fn snapshot_is_detached_from_later_pushes() {
        let queue = PlacementTaskQueue::new();
        queue.push(task(1, 100));
        let snap = queue.snapshot();
        queue.push(task(2, 200));
        assert_eq!(snap.len(), 1);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        use std::sync::Arc;
        use std::thread;

        let queue = Arc::new(PlacementTaskQueue::new());
        let mut handles = vec![];
        for t in 0..4 {
            let queue = queue.clone();
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    queue.push(task(t * 100 + i, 0));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(queue.len(), 100);
    }
}
