use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// Write-once cell shared between a producer and any number of waiters
pub(in crate::util::tasks) struct Slot<T> {
    value: Option<T>,
    wakers: Vec<Waker>,
}

pub(in crate::util::tasks) type SharedSlot<T> = Arc<Mutex<Slot<T>>>;

impl<T> Slot<T> {
    pub(in crate::util::tasks) fn shared() -> SharedSlot<T> {
        Arc::new(Mutex::new(Slot {
            value: None,
            wakers: Vec::new(),
        }))
    }

    pub(in crate::util::tasks) fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    /// Stores the value and wakes everyone waiting on it. Filling twice is a bug.
    pub(in crate::util::tasks) fn fill(&mut self, value: T) {
        assert!(self.value.is_none(), "Task finished twice");
        self.value = Some(value);
        mem::take(&mut self.wakers)
            .into_iter()
            .for_each(Waker::wake);
    }
}

impl<T: Clone> Slot<T> {
    pub(in crate::util::tasks) fn poll_value(&mut self, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(value) = &self.value {
            return Poll::Ready(value.clone());
        }
        if !self.wakers.iter().any(|w| cx.waker().will_wake(w)) {
            self.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

/// A value that becomes available once, to any number of waiters.
/// Awaiting it yields a clone of the value; `is_ready` checks without blocking.
pub struct WaitableTask<T>(pub(in crate::util::tasks) SharedSlot<T>);

/// The producing half of a [`WaitableTask`]
pub struct WaitableTaskFinisher<T>(SharedSlot<T>);

impl<T> Clone for WaitableTask<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> WaitableTask<T> {
    pub fn new() -> (Self, WaitableTaskFinisher<T>) {
        let slot = Slot::shared();
        (Self(Arc::clone(&slot)), WaitableTaskFinisher(slot))
    }

    pub fn is_ready(&self) -> bool {
        self.0.lock().unwrap().is_filled()
    }
}

impl<T: Clone> Future for WaitableTask<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.lock().unwrap().poll_value(cx)
    }
}

pub trait TaskFinisher<T> {
    fn finish(self, result: T);
}

impl<T> TaskFinisher<T> for WaitableTaskFinisher<T> {
    fn finish(self, result: T) {
        self.0.lock().unwrap().fill(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_waiters_see_finished_value() {
        let (task, finisher) = WaitableTask::new();
        assert!(!task.is_ready());

        let waiter = tokio::spawn(task.clone());
        tokio::time::sleep(Duration::from_millis(5)).await;
        finisher.finish(7u32);

        assert_eq!(waiter.await.unwrap(), 7);
        assert!(task.is_ready());
        assert_eq!(task.clone().await, 7);
    }

    #[test]
    #[should_panic(expected = "Task finished twice")]
    fn test_fill_twice_panics() {
        let slot = Slot::shared();
        slot.lock().unwrap().fill(1u8);
        slot.lock().unwrap().fill(2u8);
    }
}
