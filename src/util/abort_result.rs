/// Outcome of a job that can be stopped before it finishes.
/// `Aborted` is a normal ending (someone called stop), not a failure.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AbortResult<T, U> {
    Completed(T),
    Aborted(U),
}

impl<T, U> AbortResult<T, U> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

impl<T> AbortResult<T, T> {
    /// The inner value, however the job ended
    pub fn into_inner(self) -> T {
        match self {
            Self::Completed(v) => v,
            Self::Aborted(v) => v,
        }
    }
}
