//! Block (or flag) HTTP requests that originate from the [AWS IP address
//! ranges](https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html).
//!
//! A [Blocker] keeps an in-memory [Table] of the AWS IP Prefixes selected by region and/or
//! service. A background [Refresher] polls the published AWS IP Ranges document, re-fetching it
//! only when its `ETag` changes, and atomically publishes each new [Snapshot]. The
//! [BlockMiddleware] wraps a request [Handler] and rejects requests whose client IP falls inside
//! a blocked prefix, optionally consulting a [Confirm] hook first.

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::blocker::Blocker;
pub use crate::core::config::{
    Config, ConfigBuilder, DEFAULT_REFRESH_INTERVAL, DEFAULT_URL, MIN_REFRESH_INTERVAL,
};
pub use crate::core::errors::{Error, FetchError, Result};
pub use crate::core::fetcher::{Fetched, Fetcher, Transport, TransportResponse};
pub use crate::core::filter::Selector;
pub use crate::core::json::{Ipv6PrefixEntry, PrefixEntry, RangeDocument};
pub use crate::core::middleware::{
    client_ip, AlwaysBlock, BlockMiddleware, ClientIpFn, Confirm, Handler, ResponseSink,
};
pub use crate::core::refresh::{CancellationToken, Outcome, RefreshHandle, Refresher};
pub use crate::core::snapshot::Snapshot;
pub use crate::core::table::Table;

/*--------------------------------------------------------------------------------------
  Re-exported Crates
--------------------------------------------------------------------------------------*/

pub use ipnetwork;
