use crate::core::fetcher::{Fetched, Fetcher, Transport};
use crate::core::filter::Selector;
use crate::core::snapshot::Snapshot;
use crate::core::table::Table;
use log::{error, info};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/*-------------------------------------------------------------------------------------------------
  Cancellation Token
-------------------------------------------------------------------------------------------------*/

/// A cloneable stop signal for the refresh loop. Cancelling any clone wakes a loop that is
/// waiting for its next tick.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (cancelled, condvar) = &*self.inner;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the token is cancelled or `timeout` elapses. Returns `true` if the token was
    /// cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (cancelled, condvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut guard = cancelled.lock().unwrap_or_else(PoisonError::into_inner);

        // Loop over spurious wakeups until the deadline.
        while !*guard {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            guard = condvar
                .wait_timeout(guard, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *guard
    }
}

/*-------------------------------------------------------------------------------------------------
  Refresher
-------------------------------------------------------------------------------------------------*/

/// Result of a single refresh cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// A new snapshot with `ranges` prefixes was published.
    Updated { ranges: usize },

    /// The remote document is unchanged; the current snapshot was kept.
    Unchanged,

    /// The fetch failed; the current snapshot was kept.
    Failed,
}

/// Keeps a [Table] in sync with the remote AWS IP Ranges document.
///
/// The refresher is the table's only writer. It owns the cache validator (`ETag`) of the last
/// published document and only replaces the validator when a newer document is published or
/// the server reports a new one for an unchanged document.
#[derive(Debug)]
pub struct Refresher<T> {
    fetcher: Fetcher<T>,
    selector: Selector,
    table: Arc<Table>,
    validator: Option<String>,
}

/*--------------------------------------------------------------------------------------
  Refresher Implementation
--------------------------------------------------------------------------------------*/

impl<T: Transport> Refresher<T> {
    pub fn new(fetcher: Fetcher<T>, selector: Selector, table: Arc<Table>) -> Self {
        Self {
            fetcher,
            selector,
            table,
            validator: None,
        }
    }

    /// The cache validator of the last published (or confirmed) document.
    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Run one fetch → build → publish cycle.
    pub fn refresh(&mut self) -> Outcome {
        match self.fetcher.fetch(self.validator.as_deref()) {
            Ok(Fetched::Modified {
                document,
                validator,
            }) => {
                let snapshot = Snapshot::build(&document, &self.selector);
                let ranges = snapshot.len();
                self.table.replace(snapshot);
                self.validator = validator;
                info!(
                    "Published AWS IP Ranges snapshot; syncToken {}, {} blocked prefix(es)",
                    document.sync_token, ranges
                );
                Outcome::Updated { ranges }
            }
            Ok(Fetched::NotModified { validator }) => {
                if let Some(validator) = validator.filter(|validator| !validator.is_empty()) {
                    self.validator = Some(validator);
                }
                Outcome::Unchanged
            }
            Err(error) => {
                error!(
                    "Failed to refresh AWS IP Ranges from {}: {}",
                    self.fetcher.url(),
                    error
                );
                Outcome::Failed
            }
        }
    }

    /// Refresh immediately, then every `interval` until `token` is cancelled. An in-flight
    /// fetch always completes; cancellation prevents the next cycle from starting.
    pub fn run(mut self, token: &CancellationToken, interval: Duration) {
        info!("AWS IP Ranges refresh loop started; interval {:?}", interval);

        while !token.is_cancelled() {
            self.refresh();

            if token.wait_timeout(interval) {
                break;
            }
        }

        info!("AWS IP Ranges refresh loop stopped");
    }
}

/*-------------------------------------------------------------------------------------------------
  Refresh Handle
-------------------------------------------------------------------------------------------------*/

/// Handle to a refresh loop running on a background thread.
#[derive(Debug)]
pub struct RefreshHandle {
    token: CancellationToken,
    thread: thread::JoinHandle<()>,
}

impl RefreshHandle {
    /// Run `refresher` on a new background thread until `token` is cancelled.
    pub fn spawn<T>(
        refresher: Refresher<T>,
        token: CancellationToken,
        interval: Duration,
    ) -> std::io::Result<Self>
    where
        T: Transport + 'static,
    {
        let thread = thread::Builder::new()
            .name("awsipblock-refresh".to_string())
            .spawn({
                let token = token.clone();
                move || refresher.run(&token, interval)
            })?;

        Ok(Self { token, thread })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the refresh loop to exit. The loop exits once its token is cancelled and the
    /// current cycle completes.
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }

    /// Cancel the token and wait for the loop to exit.
    pub fn stop(self) -> thread::Result<()> {
        self.token.cancel();
        self.join()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
