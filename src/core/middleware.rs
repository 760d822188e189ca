use crate::core::table::Table;
use http::{Extensions, HeaderMap, Request, Response, StatusCode};
use log::{debug, info, warn};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Handler
-------------------------------------------------------------------------------------------------*/

/// A synchronous HTTP request handler.
///
/// Any `Fn(Request<B>) -> Response<R>` is a handler, and [BlockMiddleware] is itself a handler,
/// so the middleware can be mounted anywhere in a handler chain.
pub trait Handler<ReqBody> {
    type ResBody;

    fn handle(&self, request: Request<ReqBody>) -> Response<Self::ResBody>;
}

impl<F, ReqBody, ResBody> Handler<ReqBody> for F
where
    F: Fn(Request<ReqBody>) -> Response<ResBody>,
{
    type ResBody = ResBody;

    fn handle(&self, request: Request<ReqBody>) -> Response<ResBody> {
        self(request)
    }
}

/*-------------------------------------------------------------------------------------------------
  Confirmation Hook
-------------------------------------------------------------------------------------------------*/

/// Holds the response a [Confirm] hook chooses to send instead of the default
/// `403 Forbidden`.
#[derive(Debug)]
pub struct ResponseSink<R> {
    response: Option<Response<R>>,
}

impl<R> Default for ResponseSink<R> {
    fn default() -> Self {
        Self { response: None }
    }
}

impl<R> ResponseSink<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the response sent to the client if the hook confirms the block. Writing again
    /// replaces the previous response.
    pub fn write(&mut self, response: Response<R>) {
        self.response = Some(response);
    }

    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    pub fn into_response(self) -> Option<Response<R>> {
        self.response
    }
}

/// Decides whether a request whose client IP falls inside a blocked AWS IP prefix is actually
/// blocked.
///
/// Return `true` to block the request: the client receives the response written to the sink,
/// or `403 Forbidden` if nothing was written. Return `false` to pass the request to the
/// downstream handler despite the match; anything written to the sink is discarded.
///
/// Closures with the signature `Fn(&mut ResponseSink<R>, &Request<B>) -> bool` implement this
/// trait. Annotate the closure's parameter types so it is general over their lifetimes.
pub trait Confirm<ReqBody, ResBody> {
    fn confirm(&self, sink: &mut ResponseSink<ResBody>, request: &Request<ReqBody>) -> bool;
}

/// The default hook: block every matching request.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysBlock;

impl<ReqBody, ResBody> Confirm<ReqBody, ResBody> for AlwaysBlock {
    fn confirm(&self, _sink: &mut ResponseSink<ResBody>, _request: &Request<ReqBody>) -> bool {
        true
    }
}

impl<F, ReqBody, ResBody> Confirm<ReqBody, ResBody> for F
where
    F: Fn(&mut ResponseSink<ResBody>, &Request<ReqBody>) -> bool,
{
    fn confirm(&self, sink: &mut ResponseSink<ResBody>, request: &Request<ReqBody>) -> bool {
        self(sink, request)
    }
}

/*-------------------------------------------------------------------------------------------------
  Client IP
-------------------------------------------------------------------------------------------------*/

/// Derives the client IP address from a request's headers and extensions.
pub type ClientIpFn = fn(&HeaderMap, &Extensions) -> Option<IpAddr>;

/// Derive the client's real IP address.
///
/// 1. The first public address listed in `X-Forwarded-For`.
/// 2. The `X-Real-IP` header.
/// 3. The peer address, when the server stores it as a [SocketAddr] request extension.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded_for = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|address| address.trim().parse::<IpAddr>().ok())
        .find(is_public);

    forwarded_for
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
        })
        .or_else(|| {
            extensions
                .get::<SocketAddr>()
                .map(|socket_addr| socket_addr.ip())
        })
}

fn is_public(ip: &IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(ip) => {
            let [a, b, c, _] = ip.octets();
            !(ip.is_private()
                || ip.is_loopback()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast()
                || (a == 100 && (b & 0xc0) == 64) // Shared address space (100.64.0.0/10)
                || (a == 192 && b == 0 && c == 0) // IETF protocol assignments (192.0.0.0/24)
                || (a == 198 && (b & 0xfe) == 18)) // Benchmarking (198.18.0.0/15)
        }
        IpAddr::V6(ip) => {
            let first_segment = ip.segments()[0];
            !(ip.is_loopback()
                || ip.is_unspecified()
                || (first_segment & 0xfe00) == 0xfc00 // Unique local (fc00::/7)
                || (first_segment & 0xffc0) == 0xfe80) // Link local (fe80::/10)
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Block Middleware
-------------------------------------------------------------------------------------------------*/

/// Wraps a [Handler], rejecting requests whose client IP falls inside a blocked AWS IP prefix.
///
/// ```
/// use awsipblock::{Blocker, Config, Handler};
/// use http::{Request, Response, StatusCode};
///
/// let blocker = Blocker::new(Config::default());
/// let app = blocker.middleware(|_request: Request<()>| Response::new("index page".to_string()));
///
/// // Nothing is blocked until the first snapshot is published.
/// let request = Request::builder()
///     .header("x-real-ip", "3.5.140.2")
///     .body(())
///     .unwrap();
/// assert_eq!(app.handle(request).status(), StatusCode::OK);
/// ```
pub struct BlockMiddleware<H, C = AlwaysBlock> {
    table: Arc<Table>,
    inner: H,
    confirm: C,
    client_ip: ClientIpFn,
}

/*--------------------------------------------------------------------------------------
  Block Middleware Implementation
--------------------------------------------------------------------------------------*/

impl<H> BlockMiddleware<H> {
    pub fn new(table: Arc<Table>, inner: H) -> Self {
        Self {
            table,
            inner,
            confirm: AlwaysBlock,
            client_ip,
        }
    }
}

impl<H, C> BlockMiddleware<H, C> {
    /// Consult `confirm` before blocking a matching request.
    pub fn with_confirm<C2>(self, confirm: C2) -> BlockMiddleware<H, C2> {
        BlockMiddleware {
            table: self.table,
            inner: self.inner,
            confirm,
            client_ip: self.client_ip,
        }
    }

    /// Replace the default [client_ip] derivation, e.g. to only trust forwarding headers set
    /// by a known proxy.
    pub fn with_client_ip(mut self, client_ip: ClientIpFn) -> Self {
        self.client_ip = client_ip;
        self
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H, C, ReqBody> Handler<ReqBody> for BlockMiddleware<H, C>
where
    H: Handler<ReqBody>,
    H::ResBody: From<&'static str>,
    C: Confirm<ReqBody, H::ResBody>,
{
    type ResBody = H::ResBody;

    fn handle(&self, request: Request<ReqBody>) -> Response<Self::ResBody> {
        let ip = match (self.client_ip)(request.headers(), request.extensions()) {
            Some(ip) => ip,
            None => {
                debug!("No client IP for {} {}", request.method(), request.uri());
                return self.inner.handle(request);
            }
        };

        if !self.table.lookup(ip) {
            return self.inner.handle(request);
        }

        let mut sink = ResponseSink::new();
        if self.confirm.confirm(&mut sink, &request) {
            info!(
                "Blocked request from AWS IP {}: {} {}",
                ip,
                request.method(),
                request.uri()
            );
            return sink.into_response().unwrap_or_else(forbidden);
        }

        if sink.is_written() {
            warn!("Confirmation hook wrote a response for allowed request from {ip}; discarded");
        }
        debug!("Allowed request from AWS IP {ip}");
        self.inner.handle(request)
    }
}

impl<H, C> fmt::Debug for BlockMiddleware<H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.table.snapshot();
        f.debug_struct("BlockMiddleware")
            .field("sync_token", &snapshot.sync_token())
            .field("ranges", &snapshot.len())
            .finish_non_exhaustive()
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

fn forbidden<R: From<&'static str>>() -> Response<R> {
    let status = StatusCode::FORBIDDEN;
    let mut response = Response::new(R::from(status.canonical_reason().unwrap_or("Forbidden")));
    *response.status_mut() = status;
    response
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
