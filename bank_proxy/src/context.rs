//! Cancellation and deadlines for proxy calls.
//!
//! A [`QueryContext`] is passed to every query and tx operation. The operation's future is raced
//! against the context's deadline and cancel signal; whichever finishes first wins, and the losing
//! future is dropped, which releases any connection it was holding.
use std::{future::Future, time::Duration};

use futures::future::select_all;
use tokio::{sync::watch, time::Instant};

use crate::error::{ContextError, ProxyError};

/// The deadline and cancel signals a call runs under. Cloning shares the signals, and every
/// context derived from another keeps its parent's signals.
#[derive(Clone, Debug, Default)]
pub struct QueryContext {
    deadline: Option<Instant>,
    cancel: Vec<watch::Receiver<bool>>,
}

/// Cancels every [`QueryContext`] derived from [`QueryContext::with_cancel`]. Dropping the handle
/// without calling [`CancelHandle::cancel`] leaves the context live.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels the context this handle was created with, and every context derived from it.
    /// Calling it again does nothing.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl QueryContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        QueryContext::default()
    }

    /// Sets the deadline `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Sets the deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Adds a cancel signal, returning the derived context and the handle that fires it. Signals
    /// already on the context still apply.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        self.cancel.push(receiver);

        (self, CancelHandle { sender })
    }

    /// The earliest deadline set on this context, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, if it is.
    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.iter().any(|c| *c.borrow()) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` to completion unless the context is cancelled or its deadline passes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ProxyError>
    where
        F: Future<Output = Result<T, ProxyError>>,
    {
        if let Some(err) = self.err() {
            return Err(err.into());
        }

        tokio::select! {
            biased;

            _ = cancelled(self.cancel.clone()) => Err(ContextError::Cancelled.into()),
            _ = expired(self.deadline) => Err(ContextError::DeadlineExceeded.into()),
            res = fut => res,
        }
    }
}

/// Resolves once any of `signals` is set.
async fn cancelled(mut signals: Vec<watch::Receiver<bool>>) {
    loop {
        if signals.iter_mut().any(|s| *s.borrow_and_update()) {
            return;
        }
        if signals.is_empty() {
            return std::future::pending().await;
        }

        let closed = {
            let changes = signals.iter_mut().map(|s| Box::pin(s.changed()));
            let (res, index, _) = select_all(changes).await;
            res.err().map(|_| index)
        };
        // a sender dropped without cancelling can never fire
        if let Some(index) = closed {
            signals.swap_remove(index);
        }
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
