use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::Future;
use tokio::select;

use super::task::Task;

/// Whatever the autosave timer saves when it fires.
pub trait SaveTarget: Send + Sync + 'static {
    fn autosave(&self) -> impl Future<Output = ()> + Send;
}

/// A debounced save: every notification restarts one timer, and only a timer that
/// runs out saves.
#[derive(Debug)]
pub struct Autosave<T> {
    target: Arc<T>,
    delay: Duration,
    pending: Mutex<Option<Task>>,
}

impl<T: SaveTarget> Autosave<T> {
    pub fn new(target: Arc<T>, delay: Duration) -> Self {
        Self {
            target,
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the timer.
    pub fn notify_mutation(&self) {
        let target = self.target.clone();
        let delay = self.delay;

        let task = Task::spawn(move |mut quit| async move {
            select! {
                _ = tokio::time::sleep(delay) => {
                    tracing::debug!("autosave timer fired");
                    target.autosave().await;
                },
                _ = &mut quit => {},
            }
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);

        if let Some(previous) = previous {
            previous.quit();
        }
    }

    /// Stop a pending timer without saving.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            tracing::debug!("autosave cancelled");
            previous.quit();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}
