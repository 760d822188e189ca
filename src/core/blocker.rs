use crate::core::config::Config;
use crate::core::fetcher::{Fetcher, Transport};
use crate::core::middleware::BlockMiddleware;
use crate::core::refresh::{CancellationToken, RefreshHandle, Refresher};
use crate::core::table::Table;
use std::net::IpAddr;
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Blocker
-------------------------------------------------------------------------------------------------*/

/// _**Primary library interface**_ that keeps a table of AWS IP Prefixes current and blocks
/// HTTP requests originating from them.
///
/// ```no_run
/// use awsipblock::{Blocker, CancellationToken, ConfigBuilder, Handler};
/// use http::{Request, Response};
/// use std::time::Duration;
///
/// let config = ConfigBuilder::new()
///     .refresh_interval(Duration::from_secs(60))
///     .region("us-east-1")
///     .service("EC2")
///     .build();
/// let blocker = Blocker::new(config);
///
/// // Keep the AWS IP Ranges current in the background
/// let token = CancellationToken::new();
/// let refresh = blocker
///     .start(token.clone(), reqwest::blocking::Client::new())
///     .unwrap();
///
/// // Wrap the application's handler
/// let app = blocker.middleware(|_request: Request<()>| Response::new("index page".to_string()));
/// let response = app.handle(Request::new(()));
///
/// // Shut down
/// token.cancel();
/// refresh.join().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Blocker {
    config: Config,
    table: Arc<Table>,
}

/*--------------------------------------------------------------------------------------
  Blocker Implementation
--------------------------------------------------------------------------------------*/

impl Blocker {
    /// Create a blocker with a new, empty table.
    pub fn new(config: Config) -> Self {
        Self::with_table(config, Arc::new(Table::new()))
    }

    /// Create a blocker that maintains (and reads) an existing table.
    pub fn with_table(config: Config, table: Arc<Table>) -> Self {
        Self { config, table }
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Check whether `ip` falls inside a blocked AWS IP prefix.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.table.lookup(ip)
    }

    /*-------------------------------------------------------------------------
      Refresh
    -------------------------------------------------------------------------*/

    /// Create a [Refresher] that publishes snapshots to this blocker's table. Use it to drive
    /// refresh cycles yourself; [Blocker::start] runs one on a background thread.
    pub fn refresher<T: Transport>(&self, transport: T) -> Refresher<T> {
        Refresher::new(
            Fetcher::new(self.config.url(), transport),
            self.config.selector().clone(),
            Arc::clone(&self.table),
        )
    }

    /// Start the background refresh loop. The loop fetches the AWS IP Ranges immediately and
    /// then on every refresh interval until `token` is cancelled.
    pub fn start<T>(&self, token: CancellationToken, transport: T) -> std::io::Result<RefreshHandle>
    where
        T: Transport + 'static,
    {
        RefreshHandle::spawn(
            self.refresher(transport),
            token,
            self.config.refresh_interval(),
        )
    }

    /*-------------------------------------------------------------------------
      Middleware
    -------------------------------------------------------------------------*/

    /// Wrap `handler` so requests from blocked AWS IP prefixes are rejected with
    /// `403 Forbidden`. Use [BlockMiddleware::with_confirm] to decide per request.
    pub fn middleware<H>(&self, handler: H) -> BlockMiddleware<H> {
        BlockMiddleware::new(Arc::clone(&self.table), handler)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
