//! Progress observer trait and implementations.

use std::marker::PhantomData;

/// Observer invoked on every progress tick of a transfer.
///
/// Type parameter `T` is the progress payload, so uploads and any future
/// transfer kinds share the same callback shape. Callbacks run inline on the
/// task driving the transfer; they must not block.
pub trait ProgressCallback<T>: Send + Sync {
    /// Called once per progress event.
    ///
    /// # Arguments
    /// * `progress` - Progress data for the current transfer
    fn on_progress(&self, progress: &T);
}

/// A progress callback that ignores every event.
pub struct NoOpProgress;

impl<T> ProgressCallback<T> for NoOpProgress {
    fn on_progress(&self, _progress: &T) {}
}

/// A progress callback that wraps a closure.
pub struct FnProgress<F, T> {
    callback: F,
    _marker: PhantomData<fn(&T)>,
}

impl<F, T> FnProgress<F, T>
where
    F: Fn(&T) + Send + Sync,
{
    /// Create a new closure-based progress callback.
    ///
    /// # Arguments
    /// * `callback` - Closure that receives each progress event
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }
}

impl<F, T> ProgressCallback<T> for FnProgress<F, T>
where
    F: Fn(&T) + Send + Sync,
{
    fn on_progress(&self, progress: &T) {
        (self.callback)(progress)
    }
}

/// Create a progress callback from a closure.
///
/// # Arguments
/// * `f` - Closure that receives each progress event
pub fn progress_fn<F, T>(f: F) -> FnProgress<F, T>
where
    F: Fn(&T) + Send + Sync,
{
    FnProgress::new(f)
}
