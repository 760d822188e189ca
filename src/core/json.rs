use crate::core::errors::FetchError;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

/*-------------------------------------------------------------------------------------------------
  Parse JSON
-------------------------------------------------------------------------------------------------*/

pub fn parse(json: &str) -> Result<RangeDocument, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a document directly from a (streamed) response body. The body is buffered;
/// `serde_json` reads its input a byte at a time.
pub fn from_reader<R: Read>(reader: R) -> Result<RangeDocument, FetchError> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Range Document
--------------------------------------------------------------------------------------*/

/// The AWS IP Ranges document as published. Prefix text is kept raw; CIDR validation happens
/// when a snapshot is built so that one malformed entry cannot reject the whole document.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RangeDocument {
    #[serde(rename = "syncToken")]
    pub sync_token: String,

    #[serde(rename = "createDate")]
    pub create_date: String,

    pub prefixes: Vec<PrefixEntry>,

    #[serde(default)]
    pub ipv6_prefixes: Vec<Ipv6PrefixEntry>,
}

/*--------------------------------------------------------------------------------------
  Prefix Entry (IPv4)
--------------------------------------------------------------------------------------*/

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PrefixEntry {
    pub ip_prefix: String,
    pub region: String,
    pub service: String,
}

/*--------------------------------------------------------------------------------------
  IPv6 Prefix Entry
--------------------------------------------------------------------------------------*/

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ipv6PrefixEntry {
    pub ipv6_prefix: String,
    pub region: String,
    pub service: String,
}

/*--------------------------------------------------------------------------------------
  Entry Iteration
--------------------------------------------------------------------------------------*/

impl RangeDocument {
    /// Iterate `(cidr, region, service)` for every entry in document order; IPv4 prefixes
    /// first, then IPv6 prefixes.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.prefixes
            .iter()
            .map(|entry| {
                (
                    entry.ip_prefix.as_str(),
                    entry.region.as_str(),
                    entry.service.as_str(),
                )
            })
            .chain(self.ipv6_prefixes.iter().map(|entry| {
                (
                    entry.ipv6_prefix.as_str(),
                    entry.region.as_str(),
                    entry.service.as_str(),
                )
            }))
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
