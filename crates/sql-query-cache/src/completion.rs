//! Completion-callback adapter for executors that do not return futures

use futures::FutureExt;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::store::QueryFuture;

/// One-shot completion handed to a callback-style executor
///
/// Consuming methods make a second report impossible. Dropping the
/// completion without reporting resolves the query with
/// [`Error::CompletionDropped`].
pub struct Completion<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T, E> std::fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<T, E> Completion<T, E> {
    /// Report the outcome of the execution
    pub fn complete(self, result: Result<T, E>) {
        // Nobody waiting is not an error for the executor.
        let _ = self.sender.send(result);
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: E) {
        self.complete(Err(error));
    }

    /// Whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Turn a callback-style executor into a future
///
/// `run` is invoked immediately with a fresh [`Completion`].
pub fn from_callback<T, E, F>(run: F) -> QueryFuture<T, E>
where
    T: Send + 'static,
    E: From<Error> + Send + 'static,
    F: FnOnce(Completion<T, E>),
{
    let (sender, receiver) = oneshot::channel();
    run(Completion { sender });

    async move {
        receiver
            .await
            .unwrap_or_else(|_| Err(Error::CompletionDropped.into()))
    }
    .boxed()
}
