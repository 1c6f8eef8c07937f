use futures::Future;

pub(crate) type QuitSignal = tokio::sync::oneshot::Receiver<Quit>;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Quit;

/// Handle to a background task that can be asked to stop.
///
/// Dropping the handle also stops the task: the quit channel closes and the task
/// sees that as a quit signal at its next `select!`.
#[derive(Debug)]
pub struct Task {
    tx: tokio::sync::oneshot::Sender<Quit>,
    handle: tokio::task::JoinHandle<()>,
}

impl Task {
    pub(crate) fn spawn<F>(f: impl FnOnce(QuitSignal) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = tokio::task::spawn(f(rx));
        Self { tx, handle }
    }

    /// Ask the task to stop without waiting for it.
    pub fn quit(self) {
        let _ = self.tx.send(Quit);
    }

    /// Ask the task to stop and wait until it has.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Quit);
        let _ = self.handle.await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
