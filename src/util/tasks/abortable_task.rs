use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::util::tasks::waitable_task::{Slot, SharedSlot, TaskFinisher, WaitableTask};
use crate::AbortResult;

/// Handle to a running job that can be asked to stop.
///
/// `token` is the cancellation token handed to the worker: it becomes ready
/// when `abort` is called. The worker reports its result through the finisher;
/// a result reported after an abort request is recorded as `Aborted`.
pub struct AbortableTask<T> {
    result: SharedSlot<AbortResult<T, T>>,
    token: SharedSlot<()>,
}

impl<T> Clone for AbortableTask<T> {
    fn clone(&self) -> Self {
        AbortableTask {
            result: Arc::clone(&self.result),
            token: Arc::clone(&self.token),
        }
    }
}

impl<T: Clone> Future for AbortableTask<T> {
    type Output = AbortResult<T, T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.result.lock().unwrap().poll_value(cx)
    }
}

impl<T> AbortableTask<T> {
    pub fn new() -> (Self, AbortableTaskFinisher<T>) {
        let task = AbortableTask {
            result: Slot::shared(),
            token: Slot::shared(),
        };
        (task.clone(), AbortableTaskFinisher(task))
    }

    /// Becomes ready once an abort has been requested
    pub fn get_abort_waiter(&self) -> WaitableTask<()> {
        WaitableTask(Arc::clone(&self.token))
    }

    pub fn get_waitable_task(&self) -> WaitableTask<AbortResult<T, T>> {
        WaitableTask(Arc::clone(&self.result))
    }

    pub fn is_finished(&self) -> bool {
        self.result.lock().unwrap().is_filled()
    }
}

/// Used to abort a running task
pub trait TaskAborter<T> {
    /// Requests the abort and returns a waiter for the final result
    fn abort(&self) -> WaitableTask<AbortResult<T, T>>;
}

impl<T> TaskAborter<T> for AbortableTask<T> {
    fn abort(&self) -> WaitableTask<AbortResult<T, T>> {
        // lock order is result then token, same as the finisher
        let result = self.result.lock().unwrap();
        let mut token = self.token.lock().unwrap();
        if !result.is_filled() && !token.is_filled() {
            token.fill(());
        }
        self.get_waitable_task()
    }
}

pub struct AbortableTaskFinisher<T>(AbortableTask<T>);

impl<T> TaskFinisher<T> for AbortableTaskFinisher<T> {
    fn finish(self, result: T) {
        let mut slot = self.0.result.lock().unwrap();
        let aborted = self.0.token.lock().unwrap().is_filled();
        slot.fill(if aborted {
            AbortResult::Aborted(result)
        } else {
            AbortResult::Completed(result)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finish_without_abort_is_completed() {
        let (task, finisher) = AbortableTask::<u8>::new();
        assert!(!task.is_finished());
        finisher.finish(3);
        assert!(task.is_finished());
        assert_eq!(task.await, AbortResult::Completed(3));
    }

    #[tokio::test]
    async fn test_finish_after_abort_is_aborted() {
        let (task, finisher) = AbortableTask::<u8>::new();
        let token = task.get_abort_waiter();
        assert!(!token.is_ready());

        let result = task.abort();
        assert!(token.is_ready());
        assert!(!result.is_ready());

        // aborting twice is harmless
        task.abort();

        finisher.finish(4);
        assert_eq!(result.await, AbortResult::Aborted(4));
    }

    #[tokio::test]
    async fn test_abort_after_finish_keeps_result() {
        let (task, finisher) = AbortableTask::<u8>::new();
        finisher.finish(5);
        assert_eq!(task.abort().await, AbortResult::Completed(5));
        assert!(!task.get_abort_waiter().is_ready());
    }
}
