use std::future::Future;

use tokio::task;
use tracing::{error, info};

use super::worker::{Halt, MotionWorker, StepResult};
use super::Mount;
use crate::util::*;

/// Resolves once the job's worker has exited.
/// `Aborted` when the job was stopped, `Completed` when it ran to the end or failed.
pub type JobHandle = WaitableTask<AbortResult<MountResult<()>, MountResult<()>>>;

pub(in crate::telescope_control) struct ActiveJob {
    task: AbortableTask<MountResult<()>>,
}

pub(in crate::telescope_control) fn is_busy(slot: &Option<ActiveJob>) -> bool {
    slot.as_ref().map_or(false, |job| !job.task.is_finished())
}

impl Mount {
    /// Cancels the running job, if any, and waits for its worker to exit
    pub(in crate::telescope_control) async fn cancel_active(
        &self,
        slot: &mut Option<ActiveJob>,
    ) -> Option<AbortResult<MountResult<()>, MountResult<()>>> {
        let job = slot.take()?;
        if job.task.is_finished() {
            return None;
        }

        let waiter = job.task.abort();
        *self.state.write().await = MotionState::Stopping;
        let result = waiter.await;
        *self.state.write().await = MotionState::Idle;
        Some(result)
    }

    /// Spawns a worker running `job` once any previous job has exited
    pub(in crate::telescope_control) async fn run_job<F, Fut>(
        &self,
        name: &'static str,
        initial: MotionState,
        job: F,
    ) -> MountResult<JobHandle>
    where
        F: FnOnce(MotionWorker) -> Fut + Send + 'static,
        Fut: Future<Output = StepResult<()>> + Send + 'static,
    {
        let mut slot = self.job.lock().await;
        self.cancel_active(&mut slot).await;

        let (abortable, finisher) = AbortableTask::new();
        let worker = MotionWorker::new(
            self.link().await,
            self.config().await,
            self.source.clone(),
            self.state.clone(),
            abortable.get_abort_waiter(),
        );
        let link = worker.link.clone();
        let state = self.state.clone();

        *state.write().await = initial;
        *slot = Some(ActiveJob {
            task: abortable.clone(),
        });
        info!("Starting {}", name);

        // the worker runs in its own task so a panic in it still reaches the finisher
        let worker_task = task::spawn(job(worker));
        task::spawn(async move {
            let outcome = worker_task.await.unwrap_or_else(|join_error| {
                Err(Halt::Failed(MountError::WorkerLost(join_error.to_string())))
            });
            let result = match outcome {
                Ok(()) => {
                    info!("Finished {}", name);
                    Ok(())
                }
                Err(Halt::Cancelled) => {
                    info!("Stopped {}", name);
                    link.stop_all().map_err(|e| {
                        error!("Error stopping mount after {}: {}", name, e);
                        e
                    })
                }
                Err(Halt::Failed(e)) => {
                    error!("Aborted {}: {}", name, e);
                    if let Err(stop_error) = link.stop_all() {
                        error!("Error stopping mount after {}: {}", name, stop_error);
                    }
                    Err(e)
                }
            };
            *state.write().await = MotionState::Idle;
            finisher.finish(result);
        });

        Ok(abortable.get_waitable_task())
    }

    /// Stops the mount.
    /// Once this returns the previous job's worker has exited and will send nothing more.
    pub async fn stop(&self) -> MountResult<()> {
        let mut slot = self.job.lock().await;
        match self.cancel_active(&mut slot).await {
            Some(AbortResult::Aborted(result)) => result,
            Some(AbortResult::Completed(_)) => Ok(()),
            None => self.link().await.stop_all(),
        }
    }

    /// True while a job is running
    pub async fn is_busy(&self) -> bool {
        is_busy(&*self.job.lock().await)
    }
}
