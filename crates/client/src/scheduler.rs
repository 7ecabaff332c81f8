//! Delayed bot replies, tracked per conversation so they can be cancelled

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// Live tasks: abort handles keyed by conversation for cancellation, join
/// handles kept apart so `settle` can await them without hiding any task
/// from `cancel`.
#[derive(Debug, Default)]
struct Tasks {
    by_conversation: HashMap<i64, Vec<AbortHandle>>,
    joins: Vec<JoinHandle<()>>,
}

impl Tasks {
    fn prune(&mut self) {
        self.by_conversation.retain(|_, handles| {
            handles.retain(|h| !h.is_finished());
            !handles.is_empty()
        });
        self.joins.retain(|h| !h.is_finished());
    }
}

/// Spawns delayed tasks and keeps their handles keyed by conversation id.
#[derive(Debug, Clone, Default)]
pub struct ReplyScheduler {
    tasks: Arc<Mutex<Tasks>>,
}

impl ReplyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `task` after `delay` unless the conversation is cancelled first.
    pub fn schedule<F>(&self, conversation_id: i64, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut tasks = self.tasks();
        tasks.prune();
        tasks
            .by_conversation
            .entry(conversation_id)
            .or_default()
            .push(handle.abort_handle());
        tasks.joins.push(handle);
    }

    /// Abort every pending task for a conversation; returns how many were live.
    pub fn cancel(&self, conversation_id: i64) -> usize {
        let handles = self
            .tasks()
            .by_conversation
            .remove(&conversation_id)
            .unwrap_or_default();

        let mut cancelled = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            tracing::debug!(conversation_id, cancelled, "Cancelled pending bot replies");
        }
        cancelled
    }

    /// Number of tasks for a conversation that have not finished yet
    pub fn pending(&self, conversation_id: i64) -> usize {
        self.tasks()
            .by_conversation
            .get(&conversation_id)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Wait until every scheduled task has finished or been cancelled.
    ///
    /// Tasks stay cancellable while this waits.
    pub async fn settle(&self) {
        loop {
            let joins: Vec<JoinHandle<()>> = std::mem::take(&mut self.tasks().joins);

            if joins.is_empty() {
                self.tasks().prune();
                return;
            }

            for handle in joins {
                if let Err(e) = handle.await {
                    if !e.is_cancelled() {
                        tracing::error!(error = %e, "Bot reply task panicked");
                    }
                }
            }
        }
    }
}
