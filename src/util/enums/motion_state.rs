use serde::{Deserialize, Serialize};

/// What the mount is doing on behalf of the active job.
/// Only one of `Slewing`, `Tracking` and `Scanning` can hold at a time;
/// `Stopping` lasts until the previous job's worker has exited.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Idle,
    Slewing,
    Tracking,
    Scanning,
    Stopping,
}
