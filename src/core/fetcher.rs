use crate::core::errors::{FetchError, Result};
use crate::core::json::{self, RangeDocument};
use log::{debug, info};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Transport
-------------------------------------------------------------------------------------------------*/

/// The HTTP client used to retrieve the AWS IP Ranges document.
///
/// [reqwest::blocking::Client] implements this trait; supply your own implementation to route
/// requests through a proxy, add instrumentation, or serve canned documents in tests.
pub trait Transport: Send + Sync {
    /// Issue a `GET` request to `url`, sending `if_none_match` as the `If-None-Match` header
    /// when present.
    fn get(&self, url: &str, if_none_match: Option<&str>) -> Result<TransportResponse>;
}

/// The parts of an HTTP response the fetcher needs.
pub struct TransportResponse {
    pub status: StatusCode,
    pub etag: Option<String>,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("etag", &self.etag)
            .finish_non_exhaustive()
    }
}

/*--------------------------------------------------------------------------------------
  Reqwest Transport
--------------------------------------------------------------------------------------*/

impl Transport for reqwest::blocking::Client {
    fn get(&self, url: &str, if_none_match: Option<&str>) -> Result<TransportResponse> {
        let mut request = reqwest::blocking::Client::get(self, url);
        if let Some(etag) = if_none_match {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send()?;

        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(TransportResponse {
            status,
            etag,
            body: Box::new(response),
        })
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str, if_none_match: Option<&str>) -> Result<TransportResponse> {
        (**self).get(url, if_none_match)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, if_none_match: Option<&str>) -> Result<TransportResponse> {
        (**self).get(url, if_none_match)
    }
}

/*-------------------------------------------------------------------------------------------------
  Fetcher
-------------------------------------------------------------------------------------------------*/

/// Result of a successful conditional fetch.
#[derive(Debug)]
pub enum Fetched {
    /// The document changed (or no validator was sent); `validator` is the new `ETag`, if the
    /// server provided one.
    Modified {
        document: RangeDocument,
        validator: Option<String>,
    },

    /// The server confirmed the previously fetched document is still current.
    NotModified { validator: Option<String> },
}

/// Conditionally retrieves the AWS IP Ranges document, using the `ETag` of the previous
/// response to avoid downloading and parsing an unchanged document.
pub struct Fetcher<T> {
    url: String,
    transport: T,
}

/*--------------------------------------------------------------------------------------
  Fetcher Implementation
--------------------------------------------------------------------------------------*/

impl<T: Transport> Fetcher<T> {
    pub fn new(url: &str, transport: T) -> Self {
        Self {
            url: url.to_string(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the document, sending `validator` as a conditional-request token when it is set
    /// and non-empty.
    pub fn fetch(&self, validator: Option<&str>) -> std::result::Result<Fetched, FetchError> {
        let validator = validator.filter(|validator| !validator.is_empty());
        debug!("GET {} (If-None-Match: {:?})", self.url, validator);

        let response = self
            .transport
            .get(&self.url, validator)
            .map_err(FetchError::Transport)?;

        match response.status {
            StatusCode::NOT_MODIFIED => {
                info!("AWS IP Ranges not modified");
                Ok(Fetched::NotModified {
                    validator: response.etag,
                })
            }
            status if status.is_success() => {
                let document = json::from_reader(response.body)?;
                info!(
                    "Retrieved AWS IP Ranges; syncToken {}, {} prefix(es)",
                    document.sync_token,
                    document.prefixes.len() + document.ipv6_prefixes.len()
                );
                Ok(Fetched::Modified {
                    document,
                    validator: response.etag,
                })
            }
            status => Err(FetchError::Status(status)),
        }
    }
}

impl<T> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher").field("url", &self.url).finish()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
